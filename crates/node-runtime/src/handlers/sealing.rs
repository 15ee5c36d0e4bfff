//! # Sealing Scheduler
//!
//! Decides when dockets are built. A register is sealed when
//!
//! - a `TransactionAccepted` event reports its pending count at or above the
//!   policy's `trigger_count` (size trigger), or
//! - the policy's `interval` ticks while it has anything pending (time
//!   trigger).
//!
//! Losing the sealing lease to a concurrent build is expected and only
//! logged: the winner's docket already drains the pool.

use std::sync::Arc;

use rl_02_mempool::MempoolApi;
use rl_04_docket_consensus::{ConsensusApi, ConsensusError, SealingPolicy};
use shared_bus::{EventFilter, EventTopic, InMemoryEventBus, LedgerEvent, Subscription};
use shared_types::{Docket, RegisterId};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, instrument, warn};

enum Wake {
    Tick,
    Event(Option<LedgerEvent>),
    Shutdown,
}

pub struct SealingScheduler {
    consensus: Arc<dyn ConsensusApi>,
    mempool: Arc<dyn MempoolApi>,
    policy: SealingPolicy,
    subscription: Subscription,
}

impl SealingScheduler {
    /// Subscribes to admission events on `bus`.
    pub fn new(
        consensus: Arc<dyn ConsensusApi>,
        mempool: Arc<dyn MempoolApi>,
        policy: SealingPolicy,
        bus: &InMemoryEventBus,
    ) -> Self {
        let subscription = bus.subscribe(EventFilter::topics(vec![EventTopic::Admission]));
        Self {
            consensus,
            mempool,
            policy,
            subscription,
        }
    }

    /// Run until `shutdown` flips.
    #[instrument(skip_all, name = "sealing_scheduler")]
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.policy.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut events_open = true;
        info!(
            interval_ms = self.policy.interval.as_millis() as u64,
            trigger_count = self.policy.trigger_count,
            max_transactions = self.policy.max_transactions,
            "Sealing scheduler started"
        );

        loop {
            let wake = tokio::select! {
                _ = ticker.tick() => Wake::Tick,
                event = self.subscription.recv(), if events_open => Wake::Event(event),
                _ = shutdown.changed() => Wake::Shutdown,
            };
            match wake {
                Wake::Tick => {
                    self.tick().await;
                }
                Wake::Event(Some(LedgerEvent::TransactionAccepted {
                    register_id,
                    pending,
                    ..
                })) if self.policy.is_full(pending) => {
                    debug!(%register_id, pending, "Size trigger reached");
                    self.seal_register(&register_id).await;
                }
                Wake::Event(Some(_)) => {}
                Wake::Event(None) => {
                    warn!("Event bus closed, sealing on the interval only");
                    events_open = false;
                }
                Wake::Shutdown => {
                    info!("Sealing scheduler shutting down");
                    break;
                }
            }
        }
    }

    /// Time trigger: purge expired entries and seal every register with
    /// pending work. Returns the dockets sealed.
    pub async fn tick(&self) -> Vec<Docket> {
        let purged = self.mempool.purge_expired();
        if purged > 0 {
            debug!(purged, "Expired transactions dropped before sealing");
        }

        let mut sealed = Vec::new();
        for (register_id, pending) in self.mempool.pending_registers() {
            debug!(%register_id, pending, "Interval trigger");
            if let Some(docket) = self.seal_register(&register_id).await {
                sealed.push(docket);
            }
        }
        sealed
    }

    /// Build and seal one docket for `register_id`.
    pub async fn seal_register(&self, register_id: &RegisterId) -> Option<Docket> {
        match self.consensus.build_and_seal(register_id).await {
            Ok(docket) => docket,
            Err(ConsensusError::LeaseHeld { .. }) => {
                debug!(%register_id, "Build already in flight");
                None
            }
            Err(ConsensusError::RegisterNotOnline { status, .. }) => {
                debug!(%register_id, ?status, "Register not online, skipping");
                None
            }
            Err(e @ ConsensusError::IntegrityViolation { .. }) => {
                error!(%register_id, error = %e, "Sealing stopped by integrity violation");
                None
            }
            Err(e) => {
                warn!(%register_id, error = %e, "Sealing failed");
                None
            }
        }
    }
}
