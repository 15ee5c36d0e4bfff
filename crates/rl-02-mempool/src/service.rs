//! # Mempool Service
//!
//! Pools are created lazily per register. The outer map is only write-locked
//! to insert a new register's pool; all per-register work happens under that
//! register's own mutex, so registers never contend with each other.

use crate::domain::{MempoolConfig, MempoolError, MempoolStats, Priority, RegisterPool};
use crate::ports::{MempoolApi, SealedTransactionIndex};
use parking_lot::{Mutex, RwLock};
use shared_types::{Digest, RegisterId, TimeSource, Transaction, TransactionId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// The mempool.
pub struct MempoolService {
    pools: RwLock<HashMap<RegisterId, Arc<Mutex<RegisterPool>>>>,
    sealed: Arc<dyn SealedTransactionIndex>,
    time_source: Arc<dyn TimeSource>,
    config: MempoolConfig,
}

impl MempoolService {
    pub fn new(
        config: MempoolConfig,
        sealed: Arc<dyn SealedTransactionIndex>,
        time_source: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            pools: RwLock::new(HashMap::new()),
            sealed,
            time_source,
            config,
        }
    }

    pub fn config(&self) -> &MempoolConfig {
        &self.config
    }

    fn pool(&self, register_id: &RegisterId) -> Option<Arc<Mutex<RegisterPool>>> {
        self.pools.read().get(register_id).cloned()
    }

    fn pool_or_create(&self, register_id: RegisterId) -> Arc<Mutex<RegisterPool>> {
        if let Some(pool) = self.pool(&register_id) {
            return pool;
        }
        self.pools
            .write()
            .entry(register_id)
            .or_insert_with(|| Arc::new(Mutex::new(RegisterPool::new())))
            .clone()
    }
}

impl MempoolApi for MempoolService {
    fn enqueue(&self, tx: Transaction) -> Result<usize, MempoolError> {
        let priority = Priority::for_transaction(&tx);
        self.enqueue_with_priority(tx, priority)
    }

    fn enqueue_with_priority(
        &self,
        tx: Transaction,
        priority: Priority,
    ) -> Result<usize, MempoolError> {
        if tx.transaction_id == Digest::ZERO {
            return Err(MempoolError::Invalid("missing transaction id".into()));
        }
        let now = self.time_source.now();
        if let Some(expires_at) = tx.expires_at.filter(|_| tx.is_expired(now)) {
            return Err(MempoolError::Expired {
                transaction_id: tx.transaction_id,
                expires_at,
            });
        }

        let register_id = tx.register_id;
        let tx_id = tx.transaction_id;
        let pool = self.pool_or_create(register_id);
        let mut pool = pool.lock();

        // Checked under the register lock: a seal commits to storage before it
        // confirms here, so the id is always visible in one place or the other.
        if pool.contains(&tx_id) || self.sealed.is_sealed(&register_id, &tx_id)? {
            return Err(MempoolError::Duplicate { transaction_id: tx_id });
        }
        if pool.len() >= self.config.max_pending_per_register {
            return Err(MempoolError::PoolFull {
                register_id,
                capacity: self.config.max_pending_per_register,
            });
        }

        pool.add(tx, priority, now)?;
        let pending = pool.len();
        debug!(%register_id, transaction_id = %tx_id, ?priority, pending, "Transaction enqueued");
        Ok(pending)
    }

    fn peek_batch(&self, register_id: &RegisterId, max_count: usize) -> Vec<Transaction> {
        let now = self.time_source.now();
        // An index failure holds chained transactions back rather than risk
        // sealing a child ahead of its parent.
        let is_sealed = |id: &TransactionId| {
            matches!(self.sealed.is_sealed(register_id, id), Ok(true))
        };
        self.pool(register_id)
            .map(|pool| pool.lock().peek_batch(max_count, now, is_sealed))
            .unwrap_or_default()
    }

    fn confirm_sealed(&self, register_id: &RegisterId, ids: &[TransactionId]) -> usize {
        let Some(pool) = self.pool(register_id) else {
            return 0;
        };
        let removed = pool.lock().remove(ids);
        debug!(%register_id, removed, "Sealed transactions removed from mempool");
        removed
    }

    fn contains(&self, register_id: &RegisterId, id: &TransactionId) -> bool {
        self.pool(register_id)
            .is_some_and(|pool| pool.lock().contains(id))
    }

    fn stats(&self, register_id: &RegisterId) -> MempoolStats {
        let now = self.time_source.now();
        self.pool(register_id)
            .map(|pool| pool.lock().stats(now))
            .unwrap_or_default()
    }

    fn pending_registers(&self) -> Vec<(RegisterId, usize)> {
        let pools: Vec<_> = self
            .pools
            .read()
            .iter()
            .map(|(id, pool)| (*id, pool.clone()))
            .collect();
        pools
            .into_iter()
            .map(|(id, pool)| (id, pool.lock().len()))
            .filter(|(_, pending)| *pending > 0)
            .collect()
    }

    fn purge_expired(&self) -> usize {
        let now = self.time_source.now();
        let pools: Vec<_> = self.pools.read().values().cloned().collect();
        let purged: usize = pools
            .iter()
            .map(|pool| pool.lock().purge_expired(now).len())
            .sum();
        if purged > 0 {
            info!(purged, "Expired transactions purged from mempool");
        }
        purged
    }
}
