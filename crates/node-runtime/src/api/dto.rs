//! Request and response bodies of the ledger surface. `camelCase` on the
//! wire.

use rl_02_mempool::MempoolStats;
use serde::{Deserialize, Serialize};
use shared_types::{Digest, RegisterId, RegisterStatus, Transaction, TransactionId};

/// Genesis submission for a register whose control record was prepared
/// elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenesisRequest {
    pub register_id: RegisterId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Unsigned genesis transaction; the system wallet signs it.
    pub transaction: Transaction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenesisResponse {
    pub register_id: RegisterId,
    pub sealed_docket_height: u64,
    pub docket_hash: Digest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTransactionResponse {
    pub transaction_id: TransactionId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MempoolStatsResponse {
    pub register_id: RegisterId,
    pub pending: usize,
    pub high_priority: usize,
    pub normal_priority: usize,
    pub low_priority: usize,
    pub oldest_age_ms: Option<u64>,
}

impl MempoolStatsResponse {
    pub fn new(register_id: RegisterId, stats: MempoolStats) -> Self {
        Self {
            register_id,
            pending: stats.pending,
            high_priority: stats.high,
            normal_priority: stats.normal,
            low_priority: stats.low,
            oldest_age_ms: stats.oldest_age_ms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainVerificationResponse {
    pub register_id: RegisterId,
    pub verified_dockets: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetStatusRequest {
    pub status: RegisterStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_serialize_camel_case() {
        let register_id = RegisterId::generate();
        let body = MempoolStatsResponse::new(
            register_id,
            MempoolStats {
                pending: 3,
                high: 1,
                normal: 2,
                low: 0,
                oldest_age_ms: Some(40),
            },
        );
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["pending"], 3);
        assert_eq!(json["highPriority"], 1);
        assert_eq!(json["oldestAgeMs"], 40);
    }
}
