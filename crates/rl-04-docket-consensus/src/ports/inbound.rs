//! Inbound (Driving) port: building, sealing and verifying dockets.

use crate::domain::{
    ChainMetrics, ConsensusResult, DocketCandidate, Proposed, SealingLease,
};
use async_trait::async_trait;
use shared_types::{Docket, Register, RegisterId, Transaction};

/// A proposed candidate together with the register's sealing lease.
///
/// The lease lives exactly as long as the build: sealing consumes it, and
/// dropping an unsealed build releases it with nothing persisted.
#[derive(Debug)]
pub struct DocketBuild {
    pub(crate) candidate: DocketCandidate<Proposed>,
    pub(crate) _lease: SealingLease,
}

impl DocketBuild {
    pub fn candidate(&self) -> &DocketCandidate<Proposed> {
        &self.candidate
    }
}

/// Consensus engine API.
#[async_trait]
pub trait ConsensusApi: Send + Sync {
    /// Take the register's lease and propose the next docket from the
    /// mempool's ordered batch.
    ///
    /// Returns `Ok(None)` when nothing is pending.
    ///
    /// # Errors
    /// - `LeaseHeld` if another build for the register is in flight
    /// - `RegisterNotFound`, `RegisterNotOnline`
    async fn build_next(&self, register_id: &RegisterId) -> ConsensusResult<Option<DocketBuild>>;

    /// Hash, seal and commit a build, then drop its transactions from the
    /// mempool.
    ///
    /// # Errors
    /// - `StaleCandidate` if the stored head no longer matches the candidate
    /// - `Storage` if the commit failed; nothing was persisted
    async fn seal(&self, build: DocketBuild) -> ConsensusResult<Docket>;

    /// `build_next` + `seal`, restarting from `build_next` while persistence
    /// reports a retryable failure.
    async fn build_and_seal(&self, register_id: &RegisterId) -> ConsensusResult<Option<Docket>>;

    /// Seal docket 0 and persist the register with it in one commit.
    ///
    /// # Errors
    /// - `GenesisExists` if the register already has docket 0
    /// - `LeaseHeld` if a genesis or build for the register is in flight
    async fn seal_genesis(
        &self,
        register: Register,
        transaction: Transaction,
    ) -> ConsensusResult<Docket>;

    /// Link check over a caller-supplied sequence.
    ///
    /// # Errors
    /// - `IntegrityViolation` with the first offending height
    fn verify_chain(&self, dockets: &[Docket]) -> ConsensusResult<()>;

    /// Full check of a register's stored chain. On a break the register is
    /// put into `Recovery` and an `IntegrityViolation` event is published.
    ///
    /// Returns the number of dockets verified.
    async fn verify_register_chain(&self, register_id: &RegisterId) -> ConsensusResult<u64>;

    async fn chain_metrics(&self, register_id: &RegisterId) -> ConsensusResult<ChainMetrics>;
}
