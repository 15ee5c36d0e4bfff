//! Outbound (Driven) port: knowledge of what has already been sealed.

use crate::domain::MempoolError;
use shared_types::{RegisterId, TransactionId};

/// Answers whether a transaction id is already part of a sealed docket.
pub trait SealedTransactionIndex: Send + Sync {
    fn is_sealed(&self, register_id: &RegisterId, id: &TransactionId)
        -> Result<bool, MempoolError>;
}
