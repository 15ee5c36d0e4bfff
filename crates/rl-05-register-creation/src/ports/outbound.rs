//! Outbound (Driven) ports: pending-registration state and the wallet.

use crate::domain::{CreationResult, FinalizeLease, PendingRegistration, WalletError};
use async_trait::async_trait;
use shared_types::{DigestMode, RegisterId, SignatureAlgorithm, Timestamp};

/// Keyed, TTL-bound store for registrations between `initiate` and
/// `finalize`.
///
/// Operations on one register id are mutually exclusive; different ids never
/// contend. A registration moves `Pending → Finalizing → Committing →
/// Consumed`. Before `commit_finalize` the lease can be released back to
/// `Pending` or reclaimed by the reaper; after it, only the lease holder
/// decides the outcome.
#[async_trait]
pub trait PendingRegistrationStore: Send + Sync {
    async fn insert(&self, registration: PendingRegistration) -> CreationResult<()>;

    /// Take the finalize lease.
    ///
    /// # Errors
    /// - `PendingNotFound`, `Expired`
    /// - `AlreadyFinalized` for a consumed registration
    /// - `FinalizeInProgress` if another finalize holds the lease
    /// - `NonceMismatch`; the lease is not taken
    async fn begin_finalize(
        &self,
        register_id: &RegisterId,
        nonce: &str,
        now: Timestamp,
    ) -> CreationResult<(FinalizeLease, PendingRegistration)>;

    /// Pin the lease for genesis. From here on the reaper neither reclaims
    /// nor expires the registration.
    ///
    /// # Errors
    /// - `Expired` if the lease was reclaimed and the registration reaped
    /// - `LeaseLost` if the lease was reclaimed and is pending or re-leased
    async fn commit_finalize(&self, lease: &FinalizeLease) -> CreationResult<()>;

    /// Return the lease; the registration is `Pending` again. A stale token
    /// is ignored.
    async fn release_finalize(&self, lease: &FinalizeLease) -> CreationResult<()>;

    /// Mark consumed. Replays see `AlreadyFinalized` until the tombstone is
    /// reaped.
    ///
    /// # Errors
    /// - `LeaseLost` if `lease` no longer holds the registration
    async fn complete_finalize(&self, lease: &FinalizeLease) -> CreationResult<()>;

    /// Remove the registration entirely. A stale token is ignored.
    async fn discard(&self, lease: &FinalizeLease) -> CreationResult<()>;

    async fn get(&self, register_id: &RegisterId) -> CreationResult<Option<PendingRegistration>>;

    /// Remove expired entries and tombstones, and return uncommitted leases
    /// older than `lease_timeout_ms` to `Pending`. Returns the ids of expired
    /// registrations that were never finalized; a committed lease is never
    /// among them.
    async fn reap_expired(&self, now: Timestamp, lease_timeout_ms: u64)
        -> CreationResult<Vec<RegisterId>>;

    async fn pending_count(&self) -> usize;
}

/// A signing request. `mode` is always stated by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignRequest {
    pub wallet: String,
    pub data: Vec<u8>,
    pub mode: DigestMode,
    pub algorithm: SignatureAlgorithm,
}

impl SignRequest {
    /// `isPreHashed` flag as the wallet sees it.
    pub fn is_pre_hashed(&self) -> bool {
        self.mode.is_pre_hashed()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletSignature {
    pub public_key: Vec<u8>,
    pub signature: Vec<u8>,
    pub algorithm: SignatureAlgorithm,
}

/// Wallet signing collaborator.
#[async_trait]
pub trait WalletSigner: Send + Sync {
    async fn sign(&self, request: SignRequest) -> Result<WalletSignature, WalletError>;
}
