use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::error::{ChargeError, SourceError};

use super::models::{BillingPeriod, ChargeOutcome, Customer};
use super::subscription::Subscription;

/// key: billing-customer-source -> customers eligible for a run
#[async_trait]
pub trait CustomerSource: Send + Sync {
    /// Snapshot of every customer to evaluate. Ordering carries no meaning.
    async fn customers(&self) -> Result<Vec<Customer>, SourceError>;

    async fn save_subscription(
        &self,
        customer_id: Uuid,
        subscription: &Subscription,
    ) -> Result<(), SourceError>;
}

/// key: billing-payment-charger -> one charge attempt per call
#[async_trait]
pub trait PaymentCharger: Send + Sync {
    async fn charge(
        &self,
        customer: &Customer,
        period: BillingPeriod,
    ) -> Result<ChargeOutcome, ChargeError>;
}

#[async_trait]
impl<T: CustomerSource + ?Sized> CustomerSource for Arc<T> {
    async fn customers(&self) -> Result<Vec<Customer>, SourceError> {
        (**self).customers().await
    }

    async fn save_subscription(
        &self,
        customer_id: Uuid,
        subscription: &Subscription,
    ) -> Result<(), SourceError> {
        (**self).save_subscription(customer_id, subscription).await
    }
}

#[async_trait]
impl<T: PaymentCharger + ?Sized> PaymentCharger for Arc<T> {
    async fn charge(
        &self,
        customer: &Customer,
        period: BillingPeriod,
    ) -> Result<ChargeOutcome, ChargeError> {
        (**self).charge(customer, period).await
    }
}

/// key: billing-customer-source-memory -> DashMap backed store
#[derive(Debug, Default, Clone)]
pub struct InMemoryCustomerSource {
    customers: Arc<DashMap<Uuid, Customer>>,
}

impl InMemoryCustomerSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, customer: Customer) {
        self.customers.insert(customer.id, customer);
    }

    pub fn get(&self, customer_id: Uuid) -> Option<Customer> {
        self.customers.get(&customer_id).map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.customers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }

    pub fn snapshot(&self) -> Vec<Customer> {
        self.customers.iter().map(|r| r.value().clone()).collect()
    }
}

impl FromIterator<Customer> for InMemoryCustomerSource {
    fn from_iter<I: IntoIterator<Item = Customer>>(iter: I) -> Self {
        let source = Self::new();
        for customer in iter {
            source.insert(customer);
        }
        source
    }
}

#[async_trait]
impl CustomerSource for InMemoryCustomerSource {
    async fn customers(&self) -> Result<Vec<Customer>, SourceError> {
        Ok(self.snapshot())
    }

    async fn save_subscription(
        &self,
        customer_id: Uuid,
        subscription: &Subscription,
    ) -> Result<(), SourceError> {
        let mut entry = self
            .customers
            .get_mut(&customer_id)
            .ok_or(SourceError::NotFound(customer_id))?;
        entry.subscription = Some(subscription.clone());
        Ok(())
    }
}

/// Reads a JSON array of customers.
pub async fn load_customers(path: impl AsRef<Path>) -> Result<Vec<Customer>, SourceError> {
    let path = path.as_ref();
    let raw = tokio::fs::read(path).await.map_err(|err| {
        SourceError::Unavailable(format!("failed to read {}: {err}", path.display()))
    })?;
    serde_json::from_slice(&raw).map_err(|err| {
        SourceError::Unavailable(format!("failed to parse {}: {err}", path.display()))
    })
}

pub async fn store_customers(
    path: impl AsRef<Path>,
    customers: &[Customer],
) -> Result<(), SourceError> {
    let path = path.as_ref();
    let payload = serde_json::to_vec_pretty(customers)
        .map_err(|err| SourceError::Unavailable(format!("failed to encode customers: {err}")))?;
    tokio::fs::write(path, payload).await.map_err(|err| {
        SourceError::Unavailable(format!("failed to write {}: {err}", path.display()))
    })
}
