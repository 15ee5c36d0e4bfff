//! Pending registrations.

use super::attestation::AttestationKey;
use rand::RngCore;
use shared_types::{Hash, RegisterId, TenantId, Timestamp};
use std::collections::BTreeMap;

/// Nonce length in bytes before hex encoding.
pub const NONCE_BYTES: usize = 16;

/// A fresh random nonce, hex encoded.
pub fn generate_nonce() -> String {
    let mut bytes = [0u8; NONCE_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// State held between `initiate` and `finalize`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRegistration {
    pub register_id: RegisterId,
    pub nonce: String,
    pub tenant_id: TenantId,
    pub name: String,
    pub description: String,
    /// Raw digests of the attestation documents, by owner slot.
    pub attestation_hashes: BTreeMap<AttestationKey, Hash>,
    pub required_owners: Vec<AttestationKey>,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}

impl PendingRegistration {
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now >= self.expires_at
    }
}

/// Proof of holding a registration's finalize lease.
///
/// Every `begin_finalize` mints a new generation; a lease reclaimed by the
/// reaper and handed to another caller never matches the old token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalizeLease {
    pub register_id: RegisterId,
    pub generation: u64,
}
