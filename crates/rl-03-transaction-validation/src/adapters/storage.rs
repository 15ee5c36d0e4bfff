//! `RegisterView` over register storage.

use crate::domain::ValidationError;
use crate::ports::RegisterView;
use rl_01_register_storage::LedgerStore;
use shared_types::{Register, RegisterId, TransactionId};
use std::sync::Arc;

pub struct StorageRegisterView {
    store: Arc<dyn LedgerStore>,
}

impl StorageRegisterView {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }
}

impl RegisterView for StorageRegisterView {
    fn register(&self, register_id: &RegisterId) -> Result<Option<Register>, ValidationError> {
        self.store
            .get_register(register_id)
            .map_err(|e| ValidationError::Unavailable(e.to_string()))
    }

    fn is_sealed(
        &self,
        register_id: &RegisterId,
        tx_id: &TransactionId,
    ) -> Result<bool, ValidationError> {
        self.store
            .contains_transaction(register_id, tx_id)
            .map_err(|e| ValidationError::Unavailable(e.to_string()))
    }
}
