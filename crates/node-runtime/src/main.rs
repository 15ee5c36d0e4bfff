//! # Register Ledger Node
//!
//! Loads configuration from `RL_*` environment variables, starts the node
//! and runs until Ctrl+C.

use anyhow::{Context, Result};
use node_runtime::{LoggingConfig, NodeConfig, NodeRuntime};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .context("invalid log filter")?;
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(&LoggingConfig::from_env())?;
    let config = NodeConfig::from_env();
    config.validate().context("configuration rejected")?;

    let runtime = NodeRuntime::new(config).context("failed to initialize subsystems")?;
    runtime.start();

    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown().await;
    Ok(())
}
