use reqwest::StatusCode;
use thiserror::Error;
use uuid::Uuid;

/// Errors that abort a billing run before any customer is charged.
#[derive(Debug, Error)]
pub enum BillingError {
    #[error("invalid billing period {year}-{month:02}: month must be within 1..=12")]
    InvalidPeriod { year: i32, month: u32 },
    #[error("customer source error: {0}")]
    Source(#[from] SourceError),
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("customer {0} not found")]
    NotFound(Uuid),
    #[error("customer source unavailable: {0}")]
    Unavailable(String),
}

/// Infrastructure faults raised while talking to the payment gateway. A
/// declined card is not an error; it is reported as `ChargeOutcome::Declined`.
#[derive(Debug, Error)]
pub enum ChargeError {
    #[error("payment gateway unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("payment gateway returned {status}: {body}")]
    Gateway { status: StatusCode, body: String },
    #[error("failed to decode payment gateway response: {0}")]
    Decode(String),
}

pub type BillingResult<T> = Result<T, BillingError>;
