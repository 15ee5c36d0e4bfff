//! Outbound (Driven) port: read access to registers and sealed history.

use crate::domain::ValidationError;
use shared_types::{Register, RegisterId, TransactionId};

/// What the validator needs to know about stored state.
pub trait RegisterView: Send + Sync {
    fn register(&self, register_id: &RegisterId) -> Result<Option<Register>, ValidationError>;

    fn is_sealed(
        &self,
        register_id: &RegisterId,
        tx_id: &TransactionId,
    ) -> Result<bool, ValidationError>;
}
