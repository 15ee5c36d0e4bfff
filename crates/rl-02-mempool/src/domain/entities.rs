//! Mempool entities: priority bands, pooled transactions, configuration.

use shared_types::{Timestamp, Transaction, TransactionType};

/// Priority band. Lower discriminant is served first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Priority {
    High = 0,
    Normal = 1,
    Low = 2,
}

impl Priority {
    /// Default band for a transaction: control records jump the queue.
    pub fn for_transaction(tx: &Transaction) -> Self {
        match tx.metadata.tx_type {
            TransactionType::Control => Priority::High,
            TransactionType::Action | TransactionType::Data => Priority::Normal,
        }
    }
}

/// A transaction held in the pool.
#[derive(Clone, Debug)]
pub struct PooledTransaction {
    pub transaction: Transaction,
    pub priority: Priority,
    /// Arrival sequence within the register; FIFO tie-breaker.
    pub sequence: u64,
    pub added_at: Timestamp,
}

/// Mempool configuration.
#[derive(Clone, Debug)]
pub struct MempoolConfig {
    /// Pending transactions per register before enqueue fails `Exhausted`.
    pub max_pending_per_register: usize,
}

impl Default for MempoolConfig {
    fn default() -> Self {
        Self {
            max_pending_per_register: 10_000,
        }
    }
}
