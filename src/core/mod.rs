//! Core business logic abstractions

pub mod cache;
pub mod config;
pub mod currency;
pub mod error;
pub mod log;
pub mod subscription;
pub mod valuation;

// Re-export main types for cleaner imports
pub use currency::{Currency, CurrencyRateProvider, RateTable};
pub use error::{RateFetchError, RateTableError, ValidationError};
pub use subscription::{PaymentCycle, SubscriptionInput};
pub use valuation::{CalculationResult, ConvertedValue, calculate};
