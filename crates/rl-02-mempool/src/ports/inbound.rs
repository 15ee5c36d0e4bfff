//! Inbound (Driving) port: the API validation and consensus call.

use crate::domain::{MempoolError, MempoolStats, Priority};
use shared_types::{RegisterId, Transaction, TransactionId};

/// Mempool API.
///
/// Every operation on one register is linearizable: concurrent enqueues may
/// interleave, but each completes atomically and no id is accepted twice.
pub trait MempoolApi: Send + Sync {
    /// Admit a validated transaction in its default band.
    ///
    /// Returns the register's pending count after the insert.
    ///
    /// # Errors
    /// - `Duplicate` if pending or already sealed
    /// - `Expired` if past `expires_at`
    /// - `Invalid` if structurally unusable
    /// - `PoolFull` if the register is at capacity
    fn enqueue(&self, tx: Transaction) -> Result<usize, MempoolError>;

    /// Admit with an explicit band.
    fn enqueue_with_priority(
        &self,
        tx: Transaction,
        priority: Priority,
    ) -> Result<usize, MempoolError>;

    /// The ordered slice for the next docket. Does not remove anything.
    fn peek_batch(&self, register_id: &RegisterId, max_count: usize) -> Vec<Transaction>;

    /// Remove transactions that were just sealed. Returns how many were
    /// present. Call only after the docket's commit succeeded.
    fn confirm_sealed(&self, register_id: &RegisterId, ids: &[TransactionId]) -> usize;

    /// Whether `id` is pending for the register.
    fn contains(&self, register_id: &RegisterId, id: &TransactionId) -> bool;

    /// Pending count and per-priority breakdown.
    fn stats(&self, register_id: &RegisterId) -> MempoolStats;

    /// Registers with anything pending, with their counts.
    fn pending_registers(&self) -> Vec<(RegisterId, usize)>;

    /// Drop expired transactions everywhere. Returns how many went.
    fn purge_expired(&self) -> usize;
}
