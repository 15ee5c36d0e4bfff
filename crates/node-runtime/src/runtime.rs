//! # Node Runtime
//!
//! Owns the container and the background tasks.
//!
//! ## Startup Sequence
//!
//! 1. Validate configuration
//! 2. Initialize subsystems in dependency order
//! 3. Spawn the sealing scheduler and the pending-registration reaper
//! 4. Serve `LedgerApi` until shutdown

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::api::LedgerApi;
use crate::container::{ContainerError, LedgerContainer, NodeConfig};
use crate::handlers::{PendingReaper, SealingScheduler};

pub struct NodeRuntime {
    container: Arc<LedgerContainer>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl NodeRuntime {
    pub fn new(config: NodeConfig) -> Result<Self, ContainerError> {
        Ok(Self::from_container(LedgerContainer::new(config)?))
    }

    pub fn from_container(container: LedgerContainer) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            container: Arc::new(container),
            shutdown_tx,
            shutdown_rx,
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Spawn the background tasks.
    pub fn start(&self) {
        let container = &self.container;
        let scheduler = SealingScheduler::new(
            container.consensus.clone(),
            container.mempool.clone(),
            container.config.consensus.clone(),
            &container.event_bus,
        );
        let reaper = PendingReaper::new(
            container.registration.clone(),
            container.config.registration.reap_interval,
        );

        let mut tasks = self.tasks.lock();
        tasks.push(tokio::spawn(scheduler.run(self.shutdown_rx.clone())));
        tasks.push(tokio::spawn(reaper.run(self.shutdown_rx.clone())));
        info!(tasks = tasks.len(), "Background tasks started");
    }

    pub fn api(&self) -> LedgerApi {
        LedgerApi::new(self.container.clone())
    }

    pub fn container(&self) -> Arc<LedgerContainer> {
        Arc::clone(&self.container)
    }

    /// Signal every task and wait for it to stop.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");
        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }

        let tasks: Vec<_> = self.tasks.lock().drain(..).collect();
        for task in tasks {
            if let Err(e) = task.await {
                warn!(error = %e, "Background task ended abnormally");
            }
        }
        info!("Shutdown complete");
    }
}
