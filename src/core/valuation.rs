//! Remaining-value calculation for a prepaid subscription.
//!
//! Cost is amortised over the nominal billing cycle: the daily cost is the
//! price divided by the cycle's day count, independent of how many days have
//! already been used.
use super::currency::{Currency, RateTable};
use super::error::ValidationError;
use super::subscription::{PaymentCycle, SubscriptionInput};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

const DAY_MS: u64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvertedValue {
    pub currency: Currency,
    pub amount: f64,
}

impl ConvertedValue {
    pub fn formatted(&self) -> String {
        self.currency.format_amount(self.amount)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationResult {
    pub currency: Currency,
    pub cycle: PaymentCycle,
    pub remaining_days: u64,
    pub daily_cost: f64,
    pub remaining_value: f64,
    /// Remaining value in every other supported currency that has a rate.
    pub converted: Vec<ConvertedValue>,
}

/// Whole days between two calendar dates, with any partial day rounded up.
/// Order of the arguments does not matter.
pub fn days_between(a: NaiveDate, b: NaiveDate) -> u64 {
    let diff_ms = (b - a).num_milliseconds().unsigned_abs();
    diff_ms.div_ceil(DAY_MS)
}

/// Converts `amount` between currencies. `None` when no table is loaded or a
/// rate is missing.
pub fn convert_currency(
    rates: Option<&RateTable>,
    amount: f64,
    from: Currency,
    to: Currency,
) -> Option<f64> {
    rates?.convert(amount, from, to)
}

/// Computes daily cost, remaining days and remaining value, then converts the
/// remaining value into each other supported currency.
///
/// Validation happens first and does not depend on `rates`. Without a rate
/// table the `converted` list is empty.
pub fn calculate(
    input: &SubscriptionInput,
    rates: Option<&RateTable>,
) -> Result<CalculationResult, ValidationError> {
    let (current, expiry) = input.validate()?;

    let cycle_days = input.cycle.days();
    let remaining_days = days_between(current, expiry);
    let daily_cost = input.price / f64::from(cycle_days);
    let remaining_value = daily_cost * remaining_days as f64;
    debug!(
        cycle_days,
        remaining_days, daily_cost, remaining_value, "Calculated remaining value"
    );

    let converted = Currency::display_order()
        .filter(|currency| *currency != input.currency)
        .filter_map(|currency| {
            let amount = convert_currency(rates, remaining_value, input.currency, currency);
            if amount.is_none() {
                debug!("No rate available for {}, skipping", currency);
            }
            amount.map(|amount| ConvertedValue { currency, amount })
        })
        .collect();

    Ok(CalculationResult {
        currency: input.currency,
        cycle: input.cycle,
        remaining_days,
        daily_cost,
        remaining_value,
        converted,
    })
}
