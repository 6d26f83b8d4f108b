use anyhow::{bail, Context, Result};
use billing_engine::billing::{
    load_customers, store_customers, BillingPeriod, BillingProcessor, HttpPaymentCharger,
    InMemoryCustomerSource,
};
use billing_engine::config;
use tracing_subscriber::{fmt, EnvFilter};

fn period_from_args() -> Result<BillingPeriod> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [] => Ok(BillingPeriod::current()),
        [year, month] => {
            let year = year.parse::<i32>().context("year must be an integer")?;
            let month = month.parse::<u32>().context("month must be an integer")?;
            Ok(BillingPeriod::new(year, month)?)
        }
        _ => bail!("usage: billing-run [<year> <month>]"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    dotenvy::dotenv().ok();

    let period = period_from_args()?;
    let path = config::BILLING_CUSTOMERS_PATH.as_str();
    let customers = load_customers(path)
        .await
        .with_context(|| format!("failed to load customers from {path}"))?;
    tracing::info!(%period, customers = customers.len(), "starting billing run");

    let source: InMemoryCustomerSource = customers.into_iter().collect();
    let charger = HttpPaymentCharger::from_env().context("failed to build payment gateway client")?;
    let processor = BillingProcessor::new(source, charger);

    let report = processor.process_period(period).await?;

    store_customers(path, &processor.source().snapshot())
        .await
        .with_context(|| format!("failed to write customers to {path}"))?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
