//! Currency conversion abstractions

use super::error::{RateFetchError, RateTableError, ValidationError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Eur,
    Gbp,
    Cny,
    Jpy,
    Hkd,
    Sgd,
    Aud,
    Cad,
}

impl Currency {
    /// Every supported currency, in declaration order.
    pub const ALL: [Currency; 9] = [
        Currency::Usd,
        Currency::Eur,
        Currency::Gbp,
        Currency::Cny,
        Currency::Jpy,
        Currency::Hkd,
        Currency::Sgd,
        Currency::Aud,
        Currency::Cad,
    ];

    /// Rates are expressed relative to this currency.
    pub const BASE: Currency = Currency::Usd;

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Cny => "CNY",
            Currency::Jpy => "JPY",
            Currency::Hkd => "HKD",
            Currency::Sgd => "SGD",
            Currency::Aud => "AUD",
            Currency::Cad => "CAD",
        }
    }

    /// Order used when listing converted values: CNY first, then the rest.
    pub fn display_order() -> impl Iterator<Item = Currency> {
        std::iter::once(Currency::Cny).chain(Self::ALL.into_iter().filter(|c| *c != Currency::Cny))
    }

    pub fn decimals(&self) -> usize {
        match self {
            Currency::Jpy => 0,
            _ => 2,
        }
    }

    /// Formats a monetary amount with the number of decimals this currency uses.
    pub fn format_amount(&self, amount: f64) -> String {
        format!("{:.*}", self.decimals(), amount)
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|c| c.code() == code)
            .ok_or_else(|| ValidationError::UnsupportedCurrency(s.to_string()))
    }
}

/// Currency code to rate, relative to USD. Built once and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RateTable {
    rates: BTreeMap<String, f64>,
}

impl RateTable {
    /// Builds a table from raw `code -> rate` pairs.
    ///
    /// Entries whose rate is not a positive finite number are dropped, so every
    /// stored rate is `> 0`. The base currency must be present with a rate of 1.0.
    pub fn new<I>(rates: I) -> Result<Self, RateTableError>
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        let rates: BTreeMap<String, f64> = rates
            .into_iter()
            .filter(|(code, rate)| {
                let keep = rate.is_finite() && *rate > 0.0;
                if !keep {
                    debug!("Dropping unusable rate {} for {}", rate, code);
                }
                keep
            })
            .map(|(code, rate)| (code.to_uppercase(), rate))
            .collect();

        match rates.get(Currency::BASE.code()) {
            None => Err(RateTableError::MissingBase),
            Some(base) if *base != 1.0 => Err(RateTableError::BaseNotUnity(*base)),
            Some(_) => Ok(Self { rates }),
        }
    }

    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied()
    }

    pub fn rate_for(&self, currency: Currency) -> Option<f64> {
        self.rate(currency.code())
    }

    /// Converts `amount` from one currency to another through the base currency.
    ///
    /// Returns `None` when either rate is missing from the table.
    pub fn convert(&self, amount: f64, from: Currency, to: Currency) -> Option<f64> {
        if from == to {
            return Some(amount);
        }
        let from_rate = self.rate_for(from)?;
        let to_rate = self.rate_for(to)?;
        Some(amount / from_rate * to_rate)
    }

    /// Units of `to` bought by one unit of `from`.
    pub fn cross_rate(&self, from: Currency, to: Currency) -> Option<f64> {
        self.convert(1.0, from, to)
    }

    pub fn as_map(&self) -> &BTreeMap<String, f64> {
        &self.rates
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

#[async_trait]
pub trait CurrencyRateProvider: Send + Sync {
    /// Fetches a complete rate table. Each call yields a fresh table that
    /// replaces any previously held one.
    async fn fetch_rates(&self) -> Result<RateTable, RateFetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(&str, f64)]) -> Result<RateTable, RateTableError> {
        RateTable::new(entries.iter().map(|(c, r)| (c.to_string(), *r)))
    }

    #[test]
    fn test_currency_parsing() {
        assert_eq!("usd".parse::<Currency>().unwrap(), Currency::Usd);
        assert_eq!(" JPY ".parse::<Currency>().unwrap(), Currency::Jpy);
        assert_eq!(
            "INR".parse::<Currency>().unwrap_err(),
            ValidationError::UnsupportedCurrency("INR".to_string())
        );
    }

    #[test]
    fn test_display_order_puts_cny_first() {
        let order: Vec<Currency> = Currency::display_order().collect();
        assert_eq!(order.len(), Currency::ALL.len());
        assert_eq!(order[0], Currency::Cny);
        assert_eq!(order[1], Currency::Usd);
        assert_eq!(order.iter().filter(|c| **c == Currency::Cny).count(), 1);
    }

    #[test]
    fn test_format_amount_decimals() {
        assert_eq!(Currency::Jpy.format_amount(1234.56), "1235");
        assert_eq!(Currency::Usd.format_amount(60.0), "60.00");
        assert_eq!(Currency::Eur.format_amount(3.14159), "3.14");
        for currency in Currency::ALL {
            let formatted = currency.format_amount(12.3456);
            let decimals = formatted.split('.').nth(1).map_or(0, str::len);
            assert_eq!(decimals, currency.decimals(), "{currency}: {formatted}");
        }
    }

    #[test]
    fn test_rate_table_requires_base() {
        assert_eq!(table(&[("CNY", 7.1)]), Err(RateTableError::MissingBase));
        assert_eq!(
            table(&[("USD", 2.0), ("CNY", 7.1)]),
            Err(RateTableError::BaseNotUnity(2.0))
        );
    }

    #[test]
    fn test_rate_table_drops_unusable_rates() {
        let rates = table(&[("USD", 1.0), ("CNY", 7.1), ("EUR", 0.0), ("GBP", -1.0)]).unwrap();
        assert_eq!(rates.len(), 2);
        assert_eq!(rates.rate_for(Currency::Cny), Some(7.1));
        assert!(rates.rate_for(Currency::Eur).is_none());
        assert!(rates.rate_for(Currency::Gbp).is_none());
    }

    #[test]
    fn test_convert_usd_to_cny() {
        let rates = table(&[("USD", 1.0), ("CNY", 7.1)]).unwrap();
        let converted = rates.convert(100.0, Currency::Usd, Currency::Cny).unwrap();
        assert_eq!(Currency::Cny.format_amount(converted), "710.00");
    }

    #[test]
    fn test_convert_missing_rate() {
        let rates = table(&[("USD", 1.0), ("CNY", 7.1)]).unwrap();
        assert!(rates.convert(100.0, Currency::Usd, Currency::Jpy).is_none());
        assert!(rates.convert(100.0, Currency::Jpy, Currency::Usd).is_none());
        // Same currency never needs a rate
        assert_eq!(rates.convert(42.5, Currency::Jpy, Currency::Jpy), Some(42.5));
    }

    #[test]
    fn test_cross_rate() {
        let rates = table(&[("USD", 1.0), ("CNY", 7.2), ("EUR", 0.9)]).unwrap();
        let eur_in_cny = rates.cross_rate(Currency::Eur, Currency::Cny).unwrap();
        assert!((eur_in_cny - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_rate_table_serializes_as_map() {
        let rates = table(&[("USD", 1.0), ("CNY", 7.1)]).unwrap();
        let json = serde_json::to_value(&rates).unwrap();
        assert_eq!(json, serde_json::json!({"CNY": 7.1, "USD": 1.0}));
    }
}
