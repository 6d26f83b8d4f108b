//! Recording fakes for billing collaborators

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use billing_engine::billing::{
    BillingPeriod, BillingProcessor, ChargeOutcome, Customer, CustomerSource,
    InMemoryCustomerSource, PaymentCharger, Subscription,
};
use billing_engine::{ChargeError, SourceError};
use dashmap::DashMap;
use reqwest::StatusCode;
use uuid::Uuid;

/// Scripted charge result handed out by [`RecordingCharger`].
#[derive(Debug, Clone, Copy)]
pub enum Scripted {
    Succeed,
    Decline,
    Fault,
}

/// Charger that records every call and replays scripted results. Once the
/// script runs out it falls back to `default`.
pub struct RecordingCharger {
    default: Scripted,
    script: Mutex<VecDeque<Scripted>>,
    per_customer: DashMap<Uuid, Scripted>,
    calls: DashMap<Uuid, Vec<BillingPeriod>>,
}

impl RecordingCharger {
    pub fn new(default: Scripted) -> Self {
        Self {
            default,
            script: Mutex::new(VecDeque::new()),
            per_customer: DashMap::new(),
            calls: DashMap::new(),
        }
    }

    pub fn succeeding() -> Self {
        Self::new(Scripted::Succeed)
    }

    pub fn declining() -> Self {
        Self::new(Scripted::Decline)
    }

    #[allow(dead_code)]
    pub fn with_script(self, script: impl IntoIterator<Item = Scripted>) -> Self {
        self.script.lock().unwrap().extend(script);
        self
    }

    /// Pins the result for one customer, ahead of the shared script.
    #[allow(dead_code)]
    pub fn with_outcome_for(self, customer_id: Uuid, outcome: Scripted) -> Self {
        self.per_customer.insert(customer_id, outcome);
        self
    }

    pub fn calls_for(&self, customer_id: Uuid) -> usize {
        self.calls.get(&customer_id).map(|c| c.len()).unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.iter().map(|c| c.value().len()).sum()
    }
}

#[async_trait]
impl PaymentCharger for RecordingCharger {
    async fn charge(
        &self,
        customer: &Customer,
        period: BillingPeriod,
    ) -> Result<ChargeOutcome, ChargeError> {
        self.calls.entry(customer.id).or_default().push(period);
        let next = match self.per_customer.get(&customer.id) {
            Some(pinned) => *pinned,
            None => self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(self.default),
        };
        match next {
            Scripted::Succeed => Ok(ChargeOutcome::Succeeded),
            Scripted::Decline => Ok(ChargeOutcome::Declined),
            Scripted::Fault => Err(ChargeError::Gateway {
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: "gateway down".to_string(),
            }),
        }
    }
}

/// Source whose reads always fail.
#[allow(dead_code)]
pub struct UnavailableSource;

#[async_trait]
impl CustomerSource for UnavailableSource {
    async fn customers(&self) -> Result<Vec<Customer>, SourceError> {
        Err(SourceError::Unavailable("store offline".to_string()))
    }

    async fn save_subscription(
        &self,
        _customer_id: Uuid,
        _subscription: &Subscription,
    ) -> Result<(), SourceError> {
        Err(SourceError::Unavailable("store offline".to_string()))
    }
}

/// Source that serves its customers but refuses every write for the ids in
/// `reject`.
#[allow(dead_code)]
pub struct ReadOnlySource {
    inner: InMemoryCustomerSource,
    reject: Vec<Uuid>,
}

#[allow(dead_code)]
impl ReadOnlySource {
    pub fn new(customers: impl IntoIterator<Item = Customer>, reject: Vec<Uuid>) -> Self {
        Self {
            inner: customers.into_iter().collect(),
            reject,
        }
    }

    pub fn inner(&self) -> &InMemoryCustomerSource {
        &self.inner
    }
}

#[async_trait]
impl CustomerSource for ReadOnlySource {
    async fn customers(&self) -> Result<Vec<Customer>, SourceError> {
        self.inner.customers().await
    }

    async fn save_subscription(
        &self,
        customer_id: Uuid,
        subscription: &Subscription,
    ) -> Result<(), SourceError> {
        if self.reject.contains(&customer_id) {
            return Err(SourceError::Unavailable("write rejected".to_string()));
        }
        self.inner.save_subscription(customer_id, subscription).await
    }
}

pub type TestableProcessor =
    BillingProcessor<Arc<InMemoryCustomerSource>, Arc<RecordingCharger>>;

/// Wires a processor over the given customers, keeping handles to the fakes.
pub fn testable_processor(
    charger: RecordingCharger,
    customers: impl IntoIterator<Item = Customer>,
) -> (TestableProcessor, Arc<InMemoryCustomerSource>, Arc<RecordingCharger>) {
    let source = Arc::new(customers.into_iter().collect::<InMemoryCustomerSource>());
    let charger = Arc::new(charger);
    let processor = BillingProcessor::new(source.clone(), charger.clone());
    (processor, source, charger)
}

/// Current stored subscription for a customer.
pub fn stored_subscription(source: &InMemoryCustomerSource, customer_id: Uuid) -> Subscription {
    source
        .get(customer_id)
        .and_then(|customer| customer.subscription)
        .expect("customer should hold a subscription")
}
