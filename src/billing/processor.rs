use tracing::{debug, info, warn};

use crate::error::BillingResult;

use super::adapters::{CustomerSource, PaymentCharger};
use super::models::{BillingPeriod, BillingRunReport, Customer};

/// key: billing-processor -> monthly charge run
pub struct BillingProcessor<S, C> {
    source: S,
    charger: C,
}

impl<S, C> BillingProcessor<S, C>
where
    S: CustomerSource,
    C: PaymentCharger,
{
    pub fn new(source: S, charger: C) -> Self {
        Self { source, charger }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn charger(&self) -> &C {
        &self.charger
    }

    pub async fn process_month(&self, year: i32, month: u32) -> BillingResult<BillingRunReport> {
        self.process_period(BillingPeriod::unchecked(year, month)).await
    }

    /// Runs one billing pass. The period is validated and the customer set
    /// loaded before any charge is attempted; after that each customer is
    /// handled on its own and failures never abort the run.
    pub async fn process_period(&self, period: BillingPeriod) -> BillingResult<BillingRunReport> {
        period.validate()?;
        let customers = self.source.customers().await?;

        let mut report = BillingRunReport::new(period);
        for customer in customers {
            report.evaluated += 1;
            self.process_customer(customer, period, &mut report).await;
        }

        info!(
            period = %period,
            evaluated = report.evaluated,
            charged = report.charged,
            declined = report.declined,
            errored = report.errored,
            newly_lapsed = report.newly_lapsed.len(),
            "billing run finished"
        );
        Ok(report)
    }

    async fn process_customer(
        &self,
        customer: Customer,
        period: BillingPeriod,
        report: &mut BillingRunReport,
    ) {
        let Some(subscription) = customer.subscription.as_ref() else {
            report.without_subscription += 1;
            debug!(customer_id = %customer.id, "customer has no subscription");
            return;
        };

        if !subscription.is_current() {
            report.lapsed += 1;
            debug!(customer_id = %customer.id, "subscription lapsed; not billing");
            return;
        }

        if !subscription.needs_billing(period) {
            report.not_due += 1;
            debug!(customer_id = %customer.id, period = %period, "subscription paid through period");
            return;
        }

        let outcome = match self.charger.charge(&customer, period).await {
            Ok(outcome) => outcome,
            Err(err) => {
                report.errored += 1;
                warn!(
                    ?err,
                    customer_id = %customer.id,
                    period = %period,
                    "charge attempt failed; subscription left untouched"
                );
                return;
            }
        };

        let mut updated = subscription.clone();
        updated.record_charge_outcome(outcome);
        if outcome.is_success() {
            updated.mark_paid_through(period);
        }

        // Counters only reflect state that actually reached the source.
        if let Err(err) = self.source.save_subscription(customer.id, &updated).await {
            report.errored += 1;
            warn!(
                ?err,
                customer_id = %customer.id,
                ?outcome,
                "failed to persist subscription after charge"
            );
            return;
        }

        if outcome.is_success() {
            report.charged += 1;
            info!(customer_id = %customer.id, period = %period, "customer charged");
            return;
        }

        report.declined += 1;
        info!(
            customer_id = %customer.id,
            period = %period,
            status = ?updated.status(),
            "charge declined"
        );
        if !updated.is_current() {
            report.newly_lapsed.push(customer.id);
            warn!(customer_id = %customer.id, "subscription lapsed after repeated declines");
        }
    }
}
