use std::fmt;

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{BillingError, BillingResult};

use super::subscription::Subscription;

/// key: billing-period -> (year, month) evaluated by a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BillingPeriod {
    pub year: i32,
    pub month: u32,
}

impl BillingPeriod {
    pub fn new(year: i32, month: u32) -> BillingResult<Self> {
        let period = Self::unchecked(year, month);
        period.validate()?;
        Ok(period)
    }

    /// Builds a period without calendar validation. Paid-through markers use
    /// `0/0` to mean "never paid".
    pub const fn unchecked(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn current() -> Self {
        let now = Utc::now();
        Self::unchecked(now.year(), now.month())
    }

    pub fn validate(&self) -> BillingResult<()> {
        if (1..=12).contains(&self.month) {
            Ok(())
        } else {
            Err(BillingError::InvalidPeriod {
                year: self.year,
                month: self.month,
            })
        }
    }

    pub fn is_before(&self, other: &BillingPeriod) -> bool {
        (self.year, self.month) < (other.year, other.month)
    }
}

impl fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// key: billing-customer -> optional subscription holder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    #[serde(default)]
    pub subscription: Option<Subscription>,
}

impl Customer {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            subscription: None,
        }
    }

    pub fn with_subscription(mut self, subscription: impl Into<Subscription>) -> Self {
        self.subscription = Some(subscription.into());
        self
    }

    pub fn is_billable(&self) -> bool {
        self.subscription.is_some()
    }
}

impl Default for Customer {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a single charge attempt that reached the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeOutcome {
    Succeeded,
    Declined,
}

impl ChargeOutcome {
    pub fn is_success(self) -> bool {
        matches!(self, ChargeOutcome::Succeeded)
    }
}

impl From<bool> for ChargeOutcome {
    fn from(charged: bool) -> Self {
        if charged {
            ChargeOutcome::Succeeded
        } else {
            ChargeOutcome::Declined
        }
    }
}

/// key: billing-run-report -> per-run counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BillingRunReport {
    pub period: BillingPeriod,
    pub evaluated: usize,
    pub without_subscription: usize,
    pub not_due: usize,
    pub lapsed: usize,
    pub charged: usize,
    pub declined: usize,
    pub errored: usize,
    pub newly_lapsed: Vec<Uuid>,
}

impl BillingRunReport {
    pub fn new(period: BillingPeriod) -> Self {
        Self {
            period,
            evaluated: 0,
            without_subscription: 0,
            not_due: 0,
            lapsed: 0,
            charged: 0,
            declined: 0,
            errored: 0,
            newly_lapsed: Vec::new(),
        }
    }

    /// Number of charge attempts that reached a definite outcome.
    pub fn attempted(&self) -> usize {
        self.charged + self.declined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_outside_calendar_is_rejected() {
        for month in [0, 13, 99] {
            let err = BillingPeriod::new(2011, month).expect_err("month should be rejected");
            assert!(matches!(
                err,
                BillingError::InvalidPeriod { year: 2011, month: m } if m == month
            ));
        }
        assert!(BillingPeriod::new(2011, 1).is_ok());
        assert!(BillingPeriod::new(2011, 12).is_ok());
    }

    #[test]
    fn periods_order_chronologically_across_years() {
        let december = BillingPeriod::unchecked(2011, 12);
        let january = BillingPeriod::unchecked(2012, 1);
        assert!(december.is_before(&january));
        assert!(!january.is_before(&december));
        assert!(!january.is_before(&january));
        assert!(BillingPeriod::unchecked(0, 0).is_before(&december));
    }

    #[test]
    fn period_displays_as_year_month() {
        assert_eq!(BillingPeriod::unchecked(2011, 8).to_string(), "2011-08");
        assert_eq!(BillingPeriod::unchecked(0, 0).to_string(), "0000-00");
    }

    #[test]
    fn customer_without_subscription_is_not_billable() {
        let customer = Customer::new();
        assert!(!customer.is_billable());
        assert_eq!(ChargeOutcome::from(false), ChargeOutcome::Declined);
        assert!(ChargeOutcome::from(true).is_success());
    }
}
