//! # Consensus Service
//!
//! Implements `ConsensusApi`. Storage is the source of truth for a register's
//! head; the mempool only supplies the ordered batch and forgets it after the
//! commit succeeds.

use crate::domain::{
    verify_links, ChainBreak, ChainCursor, ChainMetrics, ConsensusError, ConsensusResult,
    DocketCandidate, Proposed, Sealed, SealingLease, SealingLeases, SealingPolicy,
};
use crate::ports::{ConsensusApi, DocketBuild};
use async_trait::async_trait;
use rl_01_register_storage::{LedgerStore, StorageError};
use rl_02_mempool::MempoolApi;
use shared_bus::{EventPublisher, LedgerEvent};
use shared_types::{Docket, Register, RegisterId, RegisterStatus, TimeSource, Transaction};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Dockets read per storage call when walking a chain.
const CHAIN_PAGE: usize = 256;

pub struct ConsensusService {
    store: Arc<dyn LedgerStore>,
    mempool: Arc<dyn MempoolApi>,
    publisher: Arc<dyn EventPublisher>,
    time_source: Arc<dyn TimeSource>,
    leases: SealingLeases,
    policy: SealingPolicy,
}

impl ConsensusService {
    pub fn new(
        policy: SealingPolicy,
        store: Arc<dyn LedgerStore>,
        mempool: Arc<dyn MempoolApi>,
        publisher: Arc<dyn EventPublisher>,
        time_source: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            store,
            mempool,
            publisher,
            time_source,
            leases: SealingLeases::new(),
            policy,
        }
    }

    pub fn policy(&self) -> &SealingPolicy {
        &self.policy
    }

    pub fn leases(&self) -> &SealingLeases {
        &self.leases
    }

    fn acquire(&self, register_id: RegisterId) -> ConsensusResult<SealingLease> {
        self.leases
            .try_acquire(register_id)
            .ok_or(ConsensusError::LeaseHeld { register_id })
    }

    fn require_register(&self, register_id: &RegisterId) -> ConsensusResult<Register> {
        self.store
            .get_register(register_id)?
            .ok_or(ConsensusError::RegisterNotFound {
                register_id: *register_id,
            })
    }

    /// The register and its last sealed docket.
    fn head(&self, register_id: &RegisterId) -> ConsensusResult<(Register, Docket)> {
        let register = self.require_register(register_id)?;
        let head = self
            .store
            .get_docket(register_id, register.height)?
            .ok_or_else(|| ConsensusError::IntegrityViolation {
                register_id: *register_id,
                height: register.height,
                detail: "head docket missing".into(),
            })?;
        Ok((register, head))
    }

    /// Walk the stored chain from height 0 in pages.
    fn for_each_docket(
        &self,
        register_id: &RegisterId,
        mut visit: impl FnMut(Docket),
    ) -> ConsensusResult<()> {
        let mut from = 0u64;
        loop {
            let page = self.store.get_dockets(register_id, from, CHAIN_PAGE)?;
            let len = page.len();
            page.into_iter().for_each(&mut visit);
            if len < CHAIN_PAGE {
                return Ok(());
            }
            from += len as u64;
        }
    }

    fn check_head(&self, candidate: &DocketCandidate<Proposed>) -> ConsensusResult<()> {
        let register_id = candidate.register_id();
        let (register, head) = self.head(&register_id)?;
        let stale = |detail: String| ConsensusError::StaleCandidate {
            register_id,
            candidate_height: candidate.height(),
            detail,
        };
        if candidate.height() != register.height + 1 {
            return Err(stale(format!("register is at height {}", register.height)));
        }
        if candidate.previous_hash() != &head.hash {
            return Err(stale(format!(
                "previousHash does not match sealed docket {}",
                head.height
            )));
        }
        Ok(())
    }

    /// Persist a sealed candidate, then release its transactions from the
    /// mempool and announce it.
    async fn commit(&self, sealed: DocketCandidate<Sealed>) -> ConsensusResult<Docket> {
        let (docket, transactions) = sealed.into_parts();
        let register_id = docket.register_id;
        let height = docket.height;

        self.store
            .commit_docket(docket.clone(), transactions, self.time_source.now())
            .map_err(|err| stale_or_storage(register_id, height, err))?;

        self.mempool.confirm_sealed(&register_id, &docket.transaction_ids);
        self.announce(&docket).await;

        info!(
            %register_id,
            height,
            tx_count = docket.transaction_ids.len(),
            hash = %docket.hash,
            "Docket sealed"
        );
        Ok(docket)
    }

    async fn announce(&self, docket: &Docket) {
        self.publisher
            .publish(LedgerEvent::DocketSealed {
                register_id: docket.register_id,
                height: docket.height,
                hash: docket.hash,
                transaction_count: docket.transaction_ids.len(),
            })
            .await;
    }

    async fn report_violation(&self, register_id: RegisterId, brk: ChainBreak) -> ConsensusError {
        error!(
            %register_id,
            height = brk.height,
            detail = %brk.detail,
            "Chain integrity violation; register moved to Recovery"
        );
        if let Err(err) = self.store.set_register_status(
            &register_id,
            RegisterStatus::Recovery,
            self.time_source.now(),
        ) {
            error!(%register_id, error = %err, "Failed to mark register for recovery");
        }
        self.publisher
            .publish(LedgerEvent::IntegrityViolation {
                register_id,
                height: brk.height,
                detail: brk.detail.clone(),
            })
            .await;
        ConsensusError::IntegrityViolation {
            register_id,
            height: brk.height,
            detail: brk.detail,
        }
    }

    async fn pause_before(&self, attempt: u32) {
        let backoff = self.policy.backoff(attempt);
        if !backoff.is_zero() {
            tokio::time::sleep(backoff).await;
        }
    }

    fn seal_genesis_once(
        &self,
        register: &Register,
        transaction: &Transaction,
    ) -> ConsensusResult<Docket> {
        let register_id = register.id;
        let sealed = DocketCandidate::genesis(register_id)
            .propose(vec![transaction.clone()], self.time_source.now())
            .accept()
            .map_err(ConsensusError::InvalidCandidate)?
            .seal();
        let (docket, mut transactions) = sealed.into_parts();
        let Some(transaction) = transactions.pop() else {
            return Err(ConsensusError::InvalidCandidate("genesis docket is empty".into()));
        };

        self.store
            .commit_genesis(register.clone(), docket.clone(), transaction)
            .map_err(|err| match err {
                StorageError::RegisterExists { register_id }
                | StorageError::HeightTaken { register_id, .. } => {
                    ConsensusError::GenesisExists { register_id }
                }
                other => ConsensusError::Storage(other),
            })?;
        Ok(docket)
    }
}

/// Head-related commit failures mean someone else moved the chain.
fn stale_or_storage(register_id: RegisterId, height: u64, err: StorageError) -> ConsensusError {
    match err {
        StorageError::HeightMismatch { .. }
        | StorageError::PreviousHashMismatch { .. }
        | StorageError::HeightTaken { .. } => ConsensusError::StaleCandidate {
            register_id,
            candidate_height: height,
            detail: err.to_string(),
        },
        other => ConsensusError::Storage(other),
    }
}

#[async_trait]
impl ConsensusApi for ConsensusService {
    async fn build_next(&self, register_id: &RegisterId) -> ConsensusResult<Option<DocketBuild>> {
        let lease = self.acquire(*register_id)?;
        let (register, head) = self.head(register_id)?;
        if !register.is_online() {
            return Err(ConsensusError::RegisterNotOnline {
                register_id: *register_id,
                status: register.status,
            });
        }

        let batch = self
            .mempool
            .peek_batch(register_id, self.policy.max_transactions);
        if batch.is_empty() {
            return Ok(None);
        }

        let timestamp = self.time_source.now().max(head.timestamp);
        debug!(
            %register_id,
            height = head.height + 1,
            tx_count = batch.len(),
            "Docket proposed"
        );
        Ok(Some(DocketBuild {
            candidate: DocketCandidate::after(&head).propose(batch, timestamp),
            _lease: lease,
        }))
    }

    async fn seal(&self, build: DocketBuild) -> ConsensusResult<Docket> {
        let DocketBuild {
            candidate,
            _lease: lease,
        } = build;
        self.check_head(&candidate)?;
        let sealed = candidate
            .accept()
            .map_err(ConsensusError::InvalidCandidate)?
            .seal();
        let docket = self.commit(sealed).await?;
        drop(lease);
        Ok(docket)
    }

    async fn build_and_seal(&self, register_id: &RegisterId) -> ConsensusResult<Option<Docket>> {
        let attempts = self.policy.max_attempts.max(1);
        let mut last_error = String::new();
        for attempt in 1..=attempts {
            self.pause_before(attempt).await;
            let Some(build) = self.build_next(register_id).await? else {
                return Ok(None);
            };
            match self.seal(build).await {
                Ok(docket) => return Ok(Some(docket)),
                Err(err) if err.is_retryable() => {
                    warn!(%register_id, attempt, error = %err, "Docket commit failed; rebuilding");
                    last_error = err.to_string();
                }
                Err(err) => return Err(err),
            }
        }
        Err(ConsensusError::PersistenceExhausted {
            attempts,
            last_error,
        })
    }

    async fn seal_genesis(
        &self,
        register: Register,
        transaction: Transaction,
    ) -> ConsensusResult<Docket> {
        let register_id = register.id;
        let _lease = self.acquire(register_id)?;
        if self.store.get_register(&register_id)?.is_some()
            || self.store.get_docket(&register_id, 0)?.is_some()
        {
            return Err(ConsensusError::GenesisExists { register_id });
        }
        if transaction.prev_tx_id.is_some() {
            return Err(ConsensusError::InvalidCandidate(
                "genesis transaction cannot reference a previous transaction".into(),
            ));
        }

        let attempts = self.policy.max_attempts.max(1);
        let mut last_error = String::new();
        for attempt in 1..=attempts {
            self.pause_before(attempt).await;
            match self.seal_genesis_once(&register, &transaction) {
                Ok(docket) => {
                    self.announce(&docket).await;
                    info!(
                        %register_id,
                        tenant_id = %register.tenant_id,
                        hash = %docket.hash,
                        "Genesis docket sealed"
                    );
                    return Ok(docket);
                }
                Err(err) if err.is_retryable() => {
                    warn!(%register_id, attempt, error = %err, "Genesis commit failed; retrying");
                    last_error = err.to_string();
                }
                Err(err) => return Err(err),
            }
        }
        Err(ConsensusError::PersistenceExhausted {
            attempts,
            last_error,
        })
    }

    fn verify_chain(&self, dockets: &[Docket]) -> ConsensusResult<()> {
        let Some(first) = dockets.first() else {
            return Ok(());
        };
        verify_links(dockets).map_err(|brk| ConsensusError::IntegrityViolation {
            register_id: first.register_id,
            height: brk.height,
            detail: brk.detail,
        })
    }

    async fn verify_register_chain(&self, register_id: &RegisterId) -> ConsensusResult<u64> {
        let register = self.require_register(register_id)?;
        let mut cursor = ChainCursor::new();
        let mut from = 0u64;
        let verdict = loop {
            let page = self.store.get_dockets(register_id, from, CHAIN_PAGE)?;
            let len = page.len();
            if let Err(brk) = page.iter().try_for_each(|docket| cursor.push(docket)) {
                break Err(brk);
            }
            if len < CHAIN_PAGE {
                break cursor.finish(register.height);
            }
            from += len as u64;
        };

        match verdict {
            Ok(()) => {
                debug!(%register_id, dockets = cursor.verified(), "Chain verified");
                Ok(cursor.verified())
            }
            Err(brk) => Err(self.report_violation(*register_id, brk).await),
        }
    }

    async fn chain_metrics(&self, register_id: &RegisterId) -> ConsensusResult<ChainMetrics> {
        self.require_register(register_id)?;
        let mut metrics = ChainMetrics::empty(*register_id);
        self.for_each_docket(register_id, |docket| metrics.record(&docket))?;
        Ok(metrics)
    }
}
