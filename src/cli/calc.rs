use super::ui;
use crate::core::config::AppConfig;
use crate::core::{
    CalculationResult, Currency, CurrencyRateProvider, PaymentCycle, RateTable,
    SubscriptionInput, calculate,
};
use crate::providers::{self, retry::RetryingRateProvider};
use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, Utc};
use comfy_table::Cell;
use tracing::debug;

/// Arguments of the `calc` command. Unset fields fall back to config or today.
#[derive(Debug, Clone)]
pub struct CalcArgs {
    pub price: f64,
    pub currency: Option<Currency>,
    pub cycle: Option<PaymentCycle>,
    pub today: Option<NaiveDate>,
    pub expiry: Option<NaiveDate>,
}

impl CalcArgs {
    pub fn into_input(self, config: &AppConfig) -> SubscriptionInput {
        SubscriptionInput {
            price: self.price,
            currency: self.currency.unwrap_or(config.currency),
            cycle: self.cycle.unwrap_or(config.cycle),
            current_date: Some(self.today.unwrap_or_else(|| Utc::now().date_naive())),
            expiry_date: self.expiry,
        }
    }
}

pub async fn run(config: &AppConfig, args: CalcArgs) -> Result<()> {
    let input = args.into_input(config);
    // Bad input never costs a network round trip
    input.validate()?;

    let provider =
        RetryingRateProvider::new(providers::rate_source(config), config.rates.max_attempts)
            .with_base_delay(config.rates.backoff());
    let spinner = ui::new_spinner("Fetching exchange rates...");
    let rates = provider.fetch_rates().await;
    spinner.finish_and_clear();
    let rates = rates
        .context("Unable to fetch exchange rates, check the network connection and retry")?;
    debug!("Loaded {} exchange rates", rates.len());

    let result = calculate(&input, Some(&rates))?;
    let updated_at = Local::now().format("%H:%M").to_string();
    println!(
        "{}",
        display_calculation(&input, &result, Some(&rates), &updated_at)
    );
    Ok(())
}

/// Renders a calculation as the summary table, the formula breakdown and the
/// multi-currency table.
pub fn display_calculation(
    input: &SubscriptionInput,
    result: &CalculationResult,
    rates: Option<&RateTable>,
    updated_at: &str,
) -> String {
    let currency = result.currency;
    let daily_cost = currency.format_amount(result.daily_cost);
    let remaining_value = currency.format_amount(result.remaining_value);

    let mut summary = ui::new_styled_table();
    summary.add_row(vec![
        Cell::new("Daily cost"),
        ui::amount_cell(format!("{daily_cost} {currency}")),
    ]);
    summary.add_row(vec![
        Cell::new("Remaining value"),
        ui::amount_cell(format!("{remaining_value} {currency}")),
    ]);
    summary.add_row(vec![
        Cell::new("Remaining days"),
        ui::amount_cell(format!("{} days", result.remaining_days)),
    ]);
    if let Some(rate) = exchange_rate_text(rates, currency) {
        summary.add_row(vec![Cell::new("Exchange rate"), ui::amount_cell(rate)]);
    }

    let mut output = format!(
        "{}\n\n{}\n\n",
        ui::style_text("Remaining Value", ui::StyleType::Title),
        summary
    );

    output.push_str(&ui::style_text("Formula", ui::StyleType::TotalLabel));
    output.push('\n');
    for line in formula_lines(input, result) {
        output.push_str(&format!("  {line}\n"));
    }

    if result.converted.is_empty() {
        output.push_str(&format!(
            "\n{}",
            ui::style_text("Exchange rates unavailable", ui::StyleType::Warning)
        ));
        return output;
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Currency"), ui::header_cell("Value")]);
    for value in &result.converted {
        table.add_row(vec![
            Cell::new(value.currency.code()),
            ui::amount_cell(value.formatted()),
        ]);
    }
    output.push_str(&format!(
        "\n{}\n{}\n{}",
        ui::style_text("Remaining value in other currencies", ui::StyleType::TotalLabel),
        table,
        ui::style_text(&format!("Updated at {updated_at}"), ui::StyleType::Subtle)
    ));
    output
}

/// `1 <currency> = x CNY`, four decimals.
fn exchange_rate_text(rates: Option<&RateTable>, currency: Currency) -> Option<String> {
    let rate = rates?.cross_rate(currency, Currency::Cny)?;
    Some(format!("1 {currency} = {rate:.4} CNY"))
}

fn formula_lines(input: &SubscriptionInput, result: &CalculationResult) -> Vec<String> {
    let currency = result.currency;
    let daily_cost = currency.format_amount(result.daily_cost);
    let current = input
        .current_date
        .map_or_else(String::new, |d| d.to_string());
    let expiry = input
        .expiry_date
        .map_or_else(String::new, |d| d.to_string());
    let cycle_days = result.cycle.days();

    vec![
        format!(
            "Remaining days  = {expiry} - {current} = {} days",
            result.remaining_days
        ),
        format!(
            "Daily cost      = {} {currency} / {cycle_days} days ({}) = {daily_cost} {currency}/day",
            input.price, result.cycle
        ),
        format!(
            "Remaining value = {daily_cost} x {} = {} {currency}",
            result.remaining_days,
            currency.format_amount(result.remaining_value)
        ),
    ]
}
