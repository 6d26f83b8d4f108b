use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config;
use crate::error::ChargeError;

use super::adapters::PaymentCharger;
use super::models::{BillingPeriod, ChargeOutcome, Customer};

#[derive(Debug, Clone)]
pub struct PaymentGatewayConfig {
    pub base_url: String,
    pub auth_token: Option<String>,
    pub timeout: Duration,
}

impl PaymentGatewayConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: config::PAYMENT_GATEWAY_URL.clone(),
            auth_token: config::PAYMENT_GATEWAY_TOKEN.clone(),
            timeout: Duration::from_secs(*config::PAYMENT_GATEWAY_TIMEOUT_SECS),
        }
    }
}

/// key: billing-gateway-http -> charge customers over HTTP
#[derive(Clone)]
pub struct HttpPaymentCharger {
    client: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChargeResponse {
    status: String,
}

impl HttpPaymentCharger {
    pub fn new(config: PaymentGatewayConfig) -> Result<Self, ChargeError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url,
            auth_token: config.auth_token,
        })
    }

    pub fn from_env() -> Result<Self, ChargeError> {
        Self::new(PaymentGatewayConfig::from_env())
    }

    fn endpoint(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    fn auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(token) = &self.auth_token {
            request.bearer_auth(token)
        } else {
            request
        }
    }
}

/// Stable per customer and period, so overlapping runs collapse into a
/// single charge at the gateway.
pub fn idempotency_key(customer_id: Uuid, period: BillingPeriod) -> String {
    let digest = Sha256::digest(format!("{customer_id}:{period}").as_bytes());
    hex::encode(digest)
}

#[async_trait]
impl PaymentCharger for HttpPaymentCharger {
    async fn charge(
        &self,
        customer: &Customer,
        period: BillingPeriod,
    ) -> Result<ChargeOutcome, ChargeError> {
        let key = idempotency_key(customer.id, period);
        let payload = json!({
            "customer_id": customer.id,
            "period": period.to_string(),
            "idempotency_key": key,
        });

        let response = self
            .auth(self.client.post(self.endpoint("charges")))
            .header("Idempotency-Key", &key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::PAYMENT_REQUIRED {
            return Ok(ChargeOutcome::Declined);
        }
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(err) => format!("<failed to read response body: {err}>"),
            };
            return Err(ChargeError::Gateway { status, body });
        }

        let parsed: ChargeResponse = response
            .json()
            .await
            .map_err(|err| ChargeError::Decode(err.to_string()))?;
        match parsed.status.as_str() {
            "succeeded" => Ok(ChargeOutcome::Succeeded),
            "declined" => Ok(ChargeOutcome::Declined),
            other => Err(ChargeError::Decode(format!("unknown charge status `{other}`"))),
        }
    }
}
