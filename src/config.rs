use once_cell::sync::Lazy;

/// Base URL of the payment gateway that settles charges. Defaults to a local
/// gateway at `http://127.0.0.1:8787`.
pub static PAYMENT_GATEWAY_URL: Lazy<String> = Lazy::new(|| {
    read_optional_env("PAYMENT_GATEWAY_URL")
        .unwrap_or_else(|| "http://127.0.0.1:8787".to_string())
});

/// Optional bearer token presented to the payment gateway.
pub static PAYMENT_GATEWAY_TOKEN: Lazy<Option<String>> =
    Lazy::new(|| read_optional_env("PAYMENT_GATEWAY_TOKEN"));

/// key: billing-config -> per charge request timeout
pub static PAYMENT_GATEWAY_TIMEOUT_SECS: Lazy<u64> = Lazy::new(|| {
    std::env::var("PAYMENT_GATEWAY_TIMEOUT_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(30)
});

/// JSON file holding the customer records for `billing-run`. Defaults to
/// `customers.json` in the working directory.
pub static BILLING_CUSTOMERS_PATH: Lazy<String> = Lazy::new(|| {
    read_optional_env("BILLING_CUSTOMERS_PATH").unwrap_or_else(|| "customers.json".to_string())
});

fn read_optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
