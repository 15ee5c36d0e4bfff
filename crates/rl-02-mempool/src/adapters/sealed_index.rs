//! `SealedTransactionIndex` backed by register storage.

use crate::domain::MempoolError;
use crate::ports::SealedTransactionIndex;
use rl_01_register_storage::LedgerStore;
use shared_types::{RegisterId, TransactionId};
use std::sync::Arc;

/// Looks ids up in the sealed `transactions` partition.
pub struct StorageSealedIndex {
    store: Arc<dyn LedgerStore>,
}

impl StorageSealedIndex {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }
}

impl SealedTransactionIndex for StorageSealedIndex {
    fn is_sealed(
        &self,
        register_id: &RegisterId,
        id: &TransactionId,
    ) -> Result<bool, MempoolError> {
        self.store
            .contains_transaction(register_id, id)
            .map_err(|e| MempoolError::Unavailable(e.to_string()))
    }
}
