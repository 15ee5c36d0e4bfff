//! Single-process `PendingRegistrationStore`.
//!
//! Each register id is one `DashMap` entry; the entry's shard lock is the
//! per-key lease, so every transition on one id is serialized and different
//! ids proceed in parallel.

use crate::domain::{CreationError, CreationResult, FinalizeLease, PendingRegistration};
use crate::ports::PendingRegistrationStore;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use shared_types::{RegisterId, Timestamp};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
enum Slot {
    Pending(PendingRegistration),
    Finalizing {
        registration: PendingRegistration,
        since: Timestamp,
        generation: u64,
        /// Set by `commit_finalize`; the reaper no longer reclaims the lease.
        committed: bool,
    },
    /// Tombstone kept until the original expiry so replays are recognised.
    Consumed { expires_at: Timestamp },
}

impl Slot {
    fn held_by(&self, lease: &FinalizeLease) -> bool {
        matches!(self, Slot::Finalizing { generation, .. } if *generation == lease.generation)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryPendingStore {
    slots: DashMap<RegisterId, Slot>,
    next_generation: AtomicU64,
}

impl InMemoryPendingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PendingRegistrationStore for InMemoryPendingStore {
    async fn insert(&self, registration: PendingRegistration) -> CreationResult<()> {
        match self.slots.entry(registration.register_id) {
            Entry::Occupied(_) => Err(CreationError::InvalidRequest(format!(
                "register id {} already pending",
                registration.register_id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(Slot::Pending(registration));
                Ok(())
            }
        }
    }

    async fn begin_finalize(
        &self,
        register_id: &RegisterId,
        nonce: &str,
        now: Timestamp,
    ) -> CreationResult<(FinalizeLease, PendingRegistration)> {
        let register_id = *register_id;
        let Entry::Occupied(mut entry) = self.slots.entry(register_id) else {
            return Err(CreationError::PendingNotFound { register_id });
        };

        let registration = match entry.get() {
            Slot::Consumed { .. } => {
                return Err(CreationError::AlreadyFinalized { register_id });
            }
            Slot::Finalizing { .. } => {
                return Err(CreationError::FinalizeInProgress { register_id });
            }
            Slot::Pending(registration) => registration,
        };
        if registration.is_expired(now) {
            entry.remove();
            return Err(CreationError::Expired { register_id });
        }
        if registration.nonce != nonce {
            warn!(%register_id, "Finalize with mismatched nonce");
            return Err(CreationError::NonceMismatch { register_id });
        }

        let registration = registration.clone();
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        entry.insert(Slot::Finalizing {
            registration: registration.clone(),
            since: now,
            generation,
            committed: false,
        });
        Ok((
            FinalizeLease {
                register_id,
                generation,
            },
            registration,
        ))
    }

    async fn commit_finalize(&self, lease: &FinalizeLease) -> CreationResult<()> {
        let register_id = lease.register_id;
        let Some(mut slot) = self.slots.get_mut(&register_id) else {
            return Err(CreationError::Expired { register_id });
        };
        match &mut *slot {
            Slot::Finalizing {
                generation,
                committed,
                ..
            } if *generation == lease.generation => {
                *committed = true;
                Ok(())
            }
            Slot::Consumed { .. } => Err(CreationError::AlreadyFinalized { register_id }),
            _ => {
                warn!(%register_id, "Finalize lease was reclaimed before genesis");
                Err(CreationError::LeaseLost { register_id })
            }
        }
    }

    async fn release_finalize(&self, lease: &FinalizeLease) -> CreationResult<()> {
        if let Some(mut slot) = self.slots.get_mut(&lease.register_id) {
            if let Slot::Finalizing {
                registration,
                committed: false,
                ..
            } = &*slot
            {
                if slot.held_by(lease) {
                    *slot = Slot::Pending(registration.clone());
                }
            }
        }
        Ok(())
    }

    async fn complete_finalize(&self, lease: &FinalizeLease) -> CreationResult<()> {
        let register_id = lease.register_id;
        // A committed slot the reaper dropped after expiry leaves nothing to
        // consume; replays then resolve against the sealed register.
        let Some(mut slot) = self.slots.get_mut(&register_id) else {
            return Ok(());
        };
        let Slot::Finalizing { registration, .. } = &*slot else {
            return Err(CreationError::LeaseLost { register_id });
        };
        if !slot.held_by(lease) {
            return Err(CreationError::LeaseLost { register_id });
        }
        *slot = Slot::Consumed {
            expires_at: registration.expires_at,
        };
        Ok(())
    }

    async fn discard(&self, lease: &FinalizeLease) -> CreationResult<()> {
        self.slots
            .remove_if(&lease.register_id, |_, slot| slot.held_by(lease));
        Ok(())
    }

    async fn get(&self, register_id: &RegisterId) -> CreationResult<Option<PendingRegistration>> {
        Ok(self.slots.get(register_id).and_then(|slot| match &*slot {
            Slot::Pending(registration) | Slot::Finalizing { registration, .. } => {
                Some(registration.clone())
            }
            Slot::Consumed { .. } => None,
        }))
    }

    async fn reap_expired(
        &self,
        now: Timestamp,
        lease_timeout_ms: u64,
    ) -> CreationResult<Vec<RegisterId>> {
        let mut expired = Vec::new();
        self.slots.retain(|register_id, slot| match slot {
            Slot::Pending(registration) if registration.is_expired(now) => {
                expired.push(*register_id);
                false
            }
            Slot::Pending(_) => true,
            Slot::Finalizing {
                registration,
                since,
                committed,
                ..
            } => {
                if now.saturating_sub(*since) < lease_timeout_ms {
                    return true;
                }
                if *committed {
                    // Genesis may already be sealed; never report it expired.
                    if registration.is_expired(now) {
                        warn!(%register_id, "Dropping stalled committed finalize");
                        return false;
                    }
                    return true;
                }
                warn!(%register_id, "Reclaiming abandoned finalize lease");
                if registration.is_expired(now) {
                    expired.push(*register_id);
                    return false;
                }
                *slot = Slot::Pending(registration.clone());
                true
            }
            Slot::Consumed { expires_at } => now < *expires_at,
        });
        if !expired.is_empty() {
            debug!(count = expired.len(), "Expired pending registrations reaped");
        }
        Ok(expired)
    }

    async fn pending_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| !matches!(slot.value(), Slot::Consumed { .. }))
            .count()
    }
}
