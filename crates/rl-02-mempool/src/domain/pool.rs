//! # Register Pool - Ordered Pending Transactions
//!
//! One instance per register.
//!
//! ## Data Structures
//!
//! - `by_id`: O(1) lookup by transaction id
//! - `queue`: O(log n) ordered index (priority band, then arrival)
//!
//! ## Invariants Enforced
//!
//! - No duplicate ids (checked in `add()`)
//! - `queue` and `by_id` always hold the same set
//! - Transactions leave only through `remove()` / `purge_expired()`;
//!   `peek_batch()` never mutates
//! - A batch never carries a transaction whose parent is neither sealed nor
//!   placed earlier in the same batch

use super::entities::{PooledTransaction, Priority};
use super::errors::MempoolError;
use super::value_objects::{MempoolStats, QueueKey};
use shared_types::{Timestamp, Transaction, TransactionId};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Pending transactions of a single register.
#[derive(Debug, Default)]
pub struct RegisterPool {
    by_id: HashMap<TransactionId, PooledTransaction>,
    queue: BTreeMap<QueueKey, TransactionId>,
    next_sequence: u64,
}

impl RegisterPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn contains(&self, id: &TransactionId) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn get(&self, id: &TransactionId) -> Option<&PooledTransaction> {
        self.by_id.get(id)
    }

    /// Adds a transaction at the back of its band.
    ///
    /// # Errors
    /// - `Duplicate` if the id is already pending
    pub fn add(
        &mut self,
        transaction: Transaction,
        priority: Priority,
        now: Timestamp,
    ) -> Result<(), MempoolError> {
        let id = transaction.transaction_id;
        if self.by_id.contains_key(&id) {
            return Err(MempoolError::Duplicate { transaction_id: id });
        }

        let sequence = self.next_sequence;
        self.next_sequence += 1;

        self.queue.insert(QueueKey { priority, sequence }, id);
        self.by_id.insert(
            id,
            PooledTransaction {
                transaction,
                priority,
                sequence,
                added_at: now,
            },
        );
        Ok(())
    }

    /// The next docket's worth of transactions, in queue order.
    ///
    /// A transaction with a `prev_tx_id` is taken only when its parent was
    /// placed earlier in this batch or `is_sealed` confirms it; otherwise it
    /// waits. Expired entries are skipped too.
    pub fn peek_batch(
        &self,
        max_count: usize,
        now: Timestamp,
        is_sealed: impl Fn(&TransactionId) -> bool,
    ) -> Vec<Transaction> {
        let mut batch = Vec::new();
        let mut placed: HashSet<TransactionId> = HashSet::new();

        for id in self.queue.values() {
            if batch.len() >= max_count {
                break;
            }
            let Some(pooled) = self.by_id.get(id) else {
                continue;
            };
            let tx = &pooled.transaction;
            if tx.is_expired(now) {
                continue;
            }
            if let Some(parent) = &tx.prev_tx_id {
                if !placed.contains(parent) && !is_sealed(parent) {
                    continue;
                }
            }
            placed.insert(*id);
            batch.push(tx.clone());
        }

        batch
    }

    /// Removes the given transactions. Returns how many were present.
    pub fn remove(&mut self, ids: &[TransactionId]) -> usize {
        ids.iter().filter(|id| self.remove_one(id).is_some()).count()
    }

    fn remove_one(&mut self, id: &TransactionId) -> Option<PooledTransaction> {
        let pooled = self.by_id.remove(id)?;
        self.queue.remove(&QueueKey {
            priority: pooled.priority,
            sequence: pooled.sequence,
        });
        Some(pooled)
    }

    /// Drops every expired transaction, along with every pending descendant
    /// chained to one, and returns their ids.
    pub fn purge_expired(&mut self, now: Timestamp) -> Vec<TransactionId> {
        let mut children: HashMap<TransactionId, Vec<TransactionId>> = HashMap::new();
        for pooled in self.by_id.values() {
            if let Some(parent) = pooled.transaction.prev_tx_id {
                children
                    .entry(parent)
                    .or_default()
                    .push(pooled.transaction.transaction_id);
            }
        }

        let mut dropped: Vec<TransactionId> = self
            .by_id
            .values()
            .filter(|p| p.transaction.is_expired(now))
            .map(|p| p.transaction.transaction_id)
            .collect();
        let mut seen: HashSet<TransactionId> = dropped.iter().copied().collect();
        let mut next = 0;
        while next < dropped.len() {
            let id = dropped[next];
            next += 1;
            for child in children.get(&id).into_iter().flatten() {
                if seen.insert(*child) {
                    dropped.push(*child);
                }
            }
        }

        for id in &dropped {
            self.remove_one(id);
        }
        dropped
    }

    pub fn stats(&self, now: Timestamp) -> MempoolStats {
        let mut stats = MempoolStats::default();
        for pooled in self.by_id.values() {
            stats.count(pooled.priority, pooled.added_at, now);
        }
        stats
    }
}
