//! # Key Layout
//!
//! Three primary partitions and three secondary indices, all in one
//! ordered key space. Heights and timestamps are big-endian so that a
//! prefix scan returns them in ascending order.
//!
//! | Prefix | Key | Value |
//! |--------|-----|-------|
//! | `r:` | `{register}` | `Register` |
//! | `d:` | `{register}{height}` | `Docket` (unique per register and height) |
//! | `t:` | `{register}{tx_id}` | `Transaction` |
//! | `s:` | `{len}{sender}{register}{tx_id}` | `(RegisterId, TransactionId)` |
//! | `i:` | `{register}{timestamp}{tx_id}` | `TransactionId` |
//! | `g:` | `{len}{tenant}{register}` | `RegisterId` |

use shared_types::{RegisterId, TenantId, Timestamp, TransactionId};

/// Key prefixes for the storage partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPrefix {
    Register,
    Docket,
    Transaction,
    SenderIndex,
    TimeIndex,
    TenantIndex,
}

impl KeyPrefix {
    /// Get the byte prefix for this key type.
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            KeyPrefix::Register => b"r:",
            KeyPrefix::Docket => b"d:",
            KeyPrefix::Transaction => b"t:",
            KeyPrefix::SenderIndex => b"s:",
            KeyPrefix::TimeIndex => b"i:",
            KeyPrefix::TenantIndex => b"g:",
        }
    }

    /// Build a full key with the given suffix parts.
    pub fn key(&self, parts: &[&[u8]]) -> Vec<u8> {
        let mut key = self.as_bytes().to_vec();
        for part in parts {
            key.extend_from_slice(part);
        }
        key
    }

    pub fn register_key(register_id: &RegisterId) -> Vec<u8> {
        KeyPrefix::Register.key(&[register_id.as_bytes()])
    }

    pub fn register_scan() -> Vec<u8> {
        KeyPrefix::Register.as_bytes().to_vec()
    }

    pub fn docket_key(register_id: &RegisterId, height: u64) -> Vec<u8> {
        KeyPrefix::Docket.key(&[register_id.as_bytes(), &height.to_be_bytes()])
    }

    pub fn docket_scan(register_id: &RegisterId) -> Vec<u8> {
        KeyPrefix::Docket.key(&[register_id.as_bytes()])
    }

    pub fn transaction_key(register_id: &RegisterId, tx_id: &TransactionId) -> Vec<u8> {
        KeyPrefix::Transaction.key(&[register_id.as_bytes(), tx_id.as_bytes()])
    }

    pub fn sender_key(sender: &str, register_id: &RegisterId, tx_id: &TransactionId) -> Vec<u8> {
        let mut key = Self::sender_scan(sender);
        key.extend_from_slice(register_id.as_bytes());
        key.extend_from_slice(tx_id.as_bytes());
        key
    }

    pub fn sender_scan(sender: &str) -> Vec<u8> {
        KeyPrefix::SenderIndex.key(&[&length_prefixed(sender)])
    }

    pub fn time_key(register_id: &RegisterId, timestamp: Timestamp, tx_id: &TransactionId) -> Vec<u8> {
        KeyPrefix::TimeIndex.key(&[
            register_id.as_bytes(),
            &timestamp.to_be_bytes(),
            tx_id.as_bytes(),
        ])
    }

    pub fn time_scan(register_id: &RegisterId) -> Vec<u8> {
        KeyPrefix::TimeIndex.key(&[register_id.as_bytes()])
    }

    /// Timestamp embedded in a time-index key.
    pub fn timestamp_of_time_key(key: &[u8]) -> Option<Timestamp> {
        let start = KeyPrefix::TimeIndex.as_bytes().len() + 16;
        let bytes: [u8; 8] = key.get(start..start + 8)?.try_into().ok()?;
        Some(Timestamp::from_be_bytes(bytes))
    }

    pub fn tenant_key(tenant_id: &TenantId, register_id: &RegisterId) -> Vec<u8> {
        let mut key = Self::tenant_scan(tenant_id);
        key.extend_from_slice(register_id.as_bytes());
        key
    }

    pub fn tenant_scan(tenant_id: &TenantId) -> Vec<u8> {
        KeyPrefix::TenantIndex.key(&[&length_prefixed(tenant_id.as_str())])
    }
}

fn length_prefixed(value: &str) -> Vec<u8> {
    let mut out = (value.len() as u32).to_be_bytes().to_vec();
    out.extend_from_slice(value.as_bytes());
    out
}
