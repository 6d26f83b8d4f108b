pub mod adapters;
pub mod gateway;
pub mod models;
pub mod processor;
pub mod subscription;

pub use adapters::{
    load_customers, store_customers, CustomerSource, InMemoryCustomerSource, PaymentCharger,
};
pub use gateway::{idempotency_key, HttpPaymentCharger, PaymentGatewayConfig};
pub use models::{BillingPeriod, BillingRunReport, ChargeOutcome, Customer};
pub use processor::BillingProcessor;
pub use subscription::{
    AnnualSubscription, MonthlySubscription, Subscription, SubscriptionStatus,
};
