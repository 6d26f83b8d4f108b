use serde::{Deserialize, Serialize};

use super::models::{BillingPeriod, ChargeOutcome};

/// Billing standing derived from the consecutive failure counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Current,
    /// At least one failed charge since the last success, still below the
    /// failure threshold.
    Dunning,
    Lapsed,
}

/// key: billing-subscription -> monthly/annual state machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Subscription {
    Monthly(MonthlySubscription),
    Annual(AnnualSubscription),
}

impl Subscription {
    pub fn is_recurring(&self) -> bool {
        match self {
            Subscription::Monthly(_) => true,
            Subscription::Annual(_) => false,
        }
    }

    pub fn is_current(&self) -> bool {
        self.status() != SubscriptionStatus::Lapsed
    }

    pub fn status(&self) -> SubscriptionStatus {
        match self {
            Subscription::Monthly(monthly) => monthly.status(),
            Subscription::Annual(_) => SubscriptionStatus::Current,
        }
    }

    pub fn needs_billing(&self, period: BillingPeriod) -> bool {
        match self {
            Subscription::Monthly(monthly) => monthly.needs_billing(period),
            Subscription::Annual(annual) => annual.needs_billing(period),
        }
    }

    pub fn record_charge_outcome(&mut self, outcome: ChargeOutcome) {
        match self {
            Subscription::Monthly(monthly) => monthly.record_charge_outcome(outcome),
            Subscription::Annual(_) => {}
        }
    }

    pub fn mark_paid_through(&mut self, period: BillingPeriod) {
        match self {
            Subscription::Monthly(monthly) => monthly.mark_paid_through(period),
            Subscription::Annual(_) => {}
        }
    }
}

impl From<MonthlySubscription> for Subscription {
    fn from(subscription: MonthlySubscription) -> Self {
        Subscription::Monthly(subscription)
    }
}

impl From<AnnualSubscription> for Subscription {
    fn from(subscription: AnnualSubscription) -> Self {
        Subscription::Annual(subscription)
    }
}

fn default_max_failures() -> u32 {
    MonthlySubscription::MAX_FAILURES
}

/// A subscription billed once per calendar month.
///
/// `paid_through_year`/`paid_through_month` mark the last paid period; `0/0`
/// means the subscription has never been paid. Once `consecutive_failures`
/// reaches `max_failures` the subscription is lapsed and stays lapsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySubscription {
    #[serde(default)]
    pub paid_through_year: i32,
    #[serde(default)]
    pub paid_through_month: u32,
    #[serde(default)]
    consecutive_failures: u32,
    #[serde(default = "default_max_failures")]
    max_failures: u32,
}

impl MonthlySubscription {
    pub const MAX_FAILURES: u32 = 3;

    pub fn new() -> Self {
        Self {
            paid_through_year: 0,
            paid_through_month: 0,
            consecutive_failures: 0,
            max_failures: Self::MAX_FAILURES,
        }
    }

    pub fn paid_through(year: i32, month: u32) -> Self {
        Self {
            paid_through_year: year,
            paid_through_month: month,
            ..Self::new()
        }
    }

    /// Thresholds below one are raised to one; a zero threshold would lapse
    /// the subscription before its first charge.
    pub fn with_max_failures(mut self, max_failures: u32) -> Self {
        self.max_failures = max_failures.max(1);
        self
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn max_failures(&self) -> u32 {
        self.max_failures.max(1)
    }

    pub fn paid_through_period(&self) -> BillingPeriod {
        BillingPeriod::unchecked(self.paid_through_year, self.paid_through_month)
    }

    pub fn is_current(&self) -> bool {
        self.consecutive_failures < self.max_failures()
    }

    pub fn status(&self) -> SubscriptionStatus {
        if !self.is_current() {
            SubscriptionStatus::Lapsed
        } else if self.consecutive_failures > 0 {
            SubscriptionStatus::Dunning
        } else {
            SubscriptionStatus::Current
        }
    }

    /// Due when the paid-through period falls strictly before `period`,
    /// compared chronologically so December rolls over into January.
    pub fn needs_billing(&self, period: BillingPeriod) -> bool {
        self.paid_through_period().is_before(&period)
    }

    pub fn record_charge_outcome(&mut self, outcome: ChargeOutcome) {
        if !self.is_current() {
            return;
        }
        match outcome {
            ChargeOutcome::Succeeded => self.consecutive_failures = 0,
            ChargeOutcome::Declined => self.consecutive_failures += 1,
        }
    }

    /// Advances the paid-through marker. Never moves it backwards and leaves
    /// lapsed subscriptions untouched.
    pub fn mark_paid_through(&mut self, period: BillingPeriod) {
        if !self.is_current() || !self.paid_through_period().is_before(&period) {
            return;
        }
        self.paid_through_year = period.year;
        self.paid_through_month = period.month;
    }
}

impl Default for MonthlySubscription {
    fn default() -> Self {
        Self::new()
    }
}

/// Annual plans are settled outside the monthly run: never due, never lapsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnualSubscription {
    #[serde(default)]
    pub paid_through_year: i32,
}

impl AnnualSubscription {
    pub fn new(paid_through_year: i32) -> Self {
        Self { paid_through_year }
    }

    pub fn needs_billing(&self, _period: BillingPeriod) -> bool {
        false
    }
}
