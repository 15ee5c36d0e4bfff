//! Record encoding. Everything persisted goes through bincode.

use super::errors::{StorageError, StorageResult};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub(crate) fn encode<T: Serialize>(value: &T, max: usize) -> StorageResult<Vec<u8>> {
    let bytes = bincode::serialize(value).map_err(|e| StorageError::Serialization(e.to_string()))?;
    if bytes.len() > max {
        return Err(StorageError::RecordTooLarge {
            size: bytes.len(),
            max,
        });
    }
    Ok(bytes)
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> StorageResult<T> {
    bincode::deserialize(bytes).map_err(|e| StorageError::Serialization(e.to_string()))
}
