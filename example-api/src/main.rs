//! Example API server binary

use anyhow::Context;
use example_api::{server, ExampleApi, ServerConfiguration};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let configuration = ServerConfiguration::from_env().context("failed to load configuration")?;
    let api = ExampleApi::builder()
        .with_auth_policy(configuration.auth_policy.clone())
        .build();

    let (address, server) = server::bind(configuration.address, api)
        .with_context(|| format!("failed to bind to {}", configuration.address))?;
    tracing::info!(%address, "Listening for HTTP traffic");

    server.await?;

    Ok(())
}
