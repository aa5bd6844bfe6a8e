use super::ui;
use crate::core::config::AppConfig;
use crate::core::{Currency, CurrencyRateProvider, RateTable};
use crate::providers::{self, retry::RetryingRateProvider};
use anyhow::{Context, Result};
use chrono::Local;
use comfy_table::Cell;

/// Manually refreshes the rate table and prints the supported currencies.
pub async fn run(config: &AppConfig, attempts: Option<u32>) -> Result<()> {
    let attempts = attempts.unwrap_or(config.rates.refresh_attempts);
    let provider = RetryingRateProvider::new(providers::rate_source(config), attempts)
        .with_base_delay(config.rates.backoff());

    let spinner = ui::new_spinner("Refreshing exchange rates...");
    let rates = provider.fetch_rates().await;
    spinner.finish_and_clear();
    let rates = rates.context("Failed to refresh exchange rates")?;

    let updated_at = Local::now().format("%H:%M").to_string();
    println!("{}", display_rates(&rates, &updated_at));
    Ok(())
}

pub fn display_rates(rates: &RateTable, updated_at: &str) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell("Per USD"),
        ui::header_cell("In CNY"),
    ]);

    for currency in Currency::display_order() {
        let per_usd = rates.rate_for(currency);
        let in_cny = rates.cross_rate(currency, Currency::Cny);
        table.add_row(vec![
            Cell::new(currency.code()),
            ui::amount_cell(per_usd.map_or("N/A".to_string(), |r| format!("{r:.4}"))),
            ui::amount_cell(in_cny.map_or("N/A".to_string(), |r| format!("{r:.4}"))),
        ]);
    }

    format!(
        "{}\n\n{}\n{}",
        ui::style_text("Exchange Rates", ui::StyleType::Title),
        table,
        ui::style_text(&format!("Updated at {updated_at}"), ui::StyleType::Subtle)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_rates() {
        let rates = RateTable::new([
            ("USD".to_string(), 1.0),
            ("CNY".to_string(), 7.2),
            ("EUR".to_string(), 0.9),
        ])
        .unwrap();
        let output = display_rates(&rates, "08:15");

        assert!(output.contains("7.2000"));
        assert!(output.contains("0.9000"));
        // 1 EUR buys 8 CNY
        assert!(output.contains("8.0000"));
        assert!(output.contains("N/A"));
        assert!(output.contains("Updated at 08:15"));
        // CNY listed before USD
        assert!(output.find("│ CNY").unwrap() < output.find("│ USD").unwrap());
    }
}
