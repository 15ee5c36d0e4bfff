//! # Sealing Leases
//!
//! One exclusive lease per register. The arena holds a token per leased
//! register; dropping the `SealingLease` guard releases it. Acquisition never
//! waits: a second builder gets `None` and reports `Conflict`.

use parking_lot::Mutex;
use shared_types::RegisterId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct LeaseArena {
    held: Mutex<HashMap<RegisterId, u64>>,
    next_token: AtomicU64,
}

/// Per-register exclusive leases.
#[derive(Clone, Default)]
pub struct SealingLeases {
    arena: Arc<LeaseArena>,
}

impl SealingLeases {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the lease for `register_id`, or `None` if someone holds it.
    pub fn try_acquire(&self, register_id: RegisterId) -> Option<SealingLease> {
        let mut held = self.arena.held.lock();
        if held.contains_key(&register_id) {
            return None;
        }
        let token = self.arena.next_token.fetch_add(1, Ordering::Relaxed);
        held.insert(register_id, token);
        Some(SealingLease {
            arena: self.arena.clone(),
            register_id,
            token,
        })
    }

    pub fn is_held(&self, register_id: &RegisterId) -> bool {
        self.arena.held.lock().contains_key(register_id)
    }

    /// Number of registers currently being sealed.
    pub fn held_count(&self) -> usize {
        self.arena.held.lock().len()
    }
}

/// Guard for one register's lease.
#[derive(Debug)]
pub struct SealingLease {
    arena: Arc<LeaseArena>,
    register_id: RegisterId,
    token: u64,
}

impl SealingLease {
    pub fn register_id(&self) -> RegisterId {
        self.register_id
    }
}

impl Drop for SealingLease {
    fn drop(&mut self) {
        let mut held = self.arena.held.lock();
        if held.get(&self.register_id) == Some(&self.token) {
            held.remove(&self.register_id);
        }
    }
}

impl std::fmt::Debug for LeaseArena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeaseArena")
            .field("held", &self.held.lock().len())
            .finish()
    }
}
