//! Chain metrics.

use serde::{Deserialize, Serialize};
use shared_types::{Digest, Docket, RegisterId, Timestamp};

/// Summary of a register's sealed chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainMetrics {
    pub register_id: RegisterId,
    pub height: u64,
    pub docket_count: u64,
    pub sealed_transaction_count: u64,
    pub last_docket_hash: Digest,
    pub last_sealed_at: Timestamp,
    pub average_transactions_per_docket: f64,
}

impl ChainMetrics {
    pub(crate) fn empty(register_id: RegisterId) -> Self {
        Self {
            register_id,
            height: 0,
            docket_count: 0,
            sealed_transaction_count: 0,
            last_docket_hash: Digest::ZERO,
            last_sealed_at: 0,
            average_transactions_per_docket: 0.0,
        }
    }

    pub(crate) fn record(&mut self, docket: &Docket) {
        self.docket_count += 1;
        self.sealed_transaction_count += docket.transaction_ids.len() as u64;
        if docket.height >= self.height {
            self.height = docket.height;
            self.last_docket_hash = docket.hash;
            self.last_sealed_at = docket.timestamp;
        }
        self.average_transactions_per_docket =
            self.sealed_transaction_count as f64 / self.docket_count as f64;
    }
}
