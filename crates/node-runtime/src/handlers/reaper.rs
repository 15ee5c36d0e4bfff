//! # Pending Registration Reaper
//!
//! Periodically drops registrations whose TTL has passed and reclaims
//! finalize leases abandoned by cancelled callers.

use std::sync::Arc;
use std::time::Duration;

use rl_05_register_creation::RegisterCreationApi;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{info, instrument, warn};

pub struct PendingReaper {
    registration: Arc<dyn RegisterCreationApi>,
    interval: Duration,
}

impl PendingReaper {
    pub fn new(registration: Arc<dyn RegisterCreationApi>, interval: Duration) -> Self {
        Self {
            registration,
            interval,
        }
    }

    #[instrument(skip_all, name = "pending_reaper")]
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            interval_secs = self.interval.as_secs(),
            "Pending registration reaper started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.sweep().await;
                }
                _ = shutdown.changed() => {
                    info!("Pending registration reaper shutting down");
                    break;
                }
            }
        }
    }

    /// One sweep. Returns how many registrations were dropped.
    pub async fn sweep(&self) -> usize {
        match self.registration.reap_expired().await {
            Ok(expired) => expired.len(),
            Err(e) => {
                warn!(error = %e, "Reaper sweep failed");
                0
            }
        }
    }
}
