pub mod billing;
pub mod config;
pub mod error;

pub use billing::{
    BillingPeriod, BillingProcessor, BillingRunReport, ChargeOutcome, Customer, CustomerSource,
    MonthlySubscription, PaymentCharger, Subscription, SubscriptionStatus,
};
pub use error::{BillingError, BillingResult, ChargeError, SourceError};
