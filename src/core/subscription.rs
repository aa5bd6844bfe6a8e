//! Subscription parameters and their validation

use super::currency::Currency;
use super::error::ValidationError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Nominal billing period of a prepaid plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentCycle {
    Monthly,
    Quarterly,
    SemiAnnually,
    Annually,
}

impl PaymentCycle {
    pub const ALL: [PaymentCycle; 4] = [
        PaymentCycle::Monthly,
        PaymentCycle::Quarterly,
        PaymentCycle::SemiAnnually,
        PaymentCycle::Annually,
    ];

    /// Number of days billed per cycle.
    pub fn days(&self) -> u32 {
        match self {
            PaymentCycle::Monthly => 30,
            PaymentCycle::Quarterly => 90,
            PaymentCycle::SemiAnnually => 180,
            PaymentCycle::Annually => 365,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PaymentCycle::Monthly => "monthly",
            PaymentCycle::Quarterly => "quarterly",
            PaymentCycle::SemiAnnually => "semi-annually",
            PaymentCycle::Annually => "annually",
        }
    }
}

impl Display for PaymentCycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for PaymentCycle {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monthly" | "month" => Ok(PaymentCycle::Monthly),
            "quarterly" | "quarter" => Ok(PaymentCycle::Quarterly),
            "semi-annually" | "semiannually" | "half-yearly" => Ok(PaymentCycle::SemiAnnually),
            "annually" | "yearly" => Ok(PaymentCycle::Annually),
            _ => Err(ValidationError::UnknownPaymentCycle(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionInput {
    pub price: f64,
    pub currency: Currency,
    pub cycle: PaymentCycle,
    pub current_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
}

impl SubscriptionInput {
    /// Checks the input in a fixed order and stops at the first problem:
    /// price, current date, expiry date, then expiry strictly after current.
    ///
    /// On success returns the `(current, expiry)` date pair.
    pub fn validate(&self) -> Result<(NaiveDate, NaiveDate), ValidationError> {
        if !(self.price.is_finite() && self.price > 0.0) {
            return Err(ValidationError::InvalidPrice);
        }
        let current = self.current_date.ok_or(ValidationError::MissingCurrentDate)?;
        let expiry = self.expiry_date.ok_or(ValidationError::MissingExpiryDate)?;
        if expiry <= current {
            return Err(ValidationError::ExpiryNotAfterCurrent { current, expiry });
        }
        Ok((current, expiry))
    }
}
