//! Error taxonomy for validation, rate tables and rate fetching

use chrono::NaiveDate;
use thiserror::Error;

/// Bad or missing user input. Surfaced immediately, never retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Purchase price must be a positive number")]
    InvalidPrice,
    #[error("Current date is required")]
    MissingCurrentDate,
    #[error("Expiry date is required")]
    MissingExpiryDate,
    #[error("Expiry date {expiry} must be later than current date {current}")]
    ExpiryNotAfterCurrent { current: NaiveDate, expiry: NaiveDate },
    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),
    #[error("Unknown payment cycle: {0}")]
    UnknownPaymentCycle(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RateTableError {
    #[error("Rate table has no entry for base currency USD")]
    MissingBase,
    #[error("Base currency rate must be 1.0, got {0}")]
    BaseNotUnity(f64),
}

#[derive(Debug, Error)]
pub enum RateFetchError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP error: {0}")]
    Status(reqwest::StatusCode),
    #[error("Failed to parse rate response: {0}")]
    Parse(String),
    #[error("Invalid rate table: {0}")]
    InvalidTable(#[from] RateTableError),
    #[error("Failed to fetch rates after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        last: Box<RateFetchError>,
    },
}
