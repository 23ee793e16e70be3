//! Certification smoke run: authorize then void a test card

use anyhow::Context;
use portico_adapter::{
    card::{CreditCard, PaymentSource},
    portico::{ChargeParams, CreditAuth, CreditVoid},
    Gateway, GatewayConfig,
};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let path = std::env::args().nth(1).map(PathBuf::from);
    let config = GatewayConfig::load(path.as_deref()).context("loading gateway configuration")?;
    let gateway = Gateway::from_config(config)?;

    if !gateway.is_test_mode() {
        anyhow::bail!("refusing to run against production credentials");
    }

    let card = CreditCard::new("4012002000060016", 12, 2099).with_cvv("123");
    let params = ChargeParams::new("42.42", "USD", PaymentSource::Card(card))?;

    let auth = gateway.send(&CreditAuth::new(params)).await?;
    tracing::info!(
        "Authorization: successful={} code={:?} message={:?} reference={:?}",
        auth.is_successful(),
        auth.code(),
        auth.message(),
        auth.transaction_reference()
    );

    let Some(reference) = auth.transaction_reference() else {
        anyhow::bail!("authorization returned no transaction reference");
    };

    let void = gateway.send(&CreditVoid::new(reference)?).await?;
    tracing::info!(
        "Void: successful={} code={:?} message={:?}",
        void.is_successful(),
        void.code(),
        void.message()
    );

    Ok(())
}
