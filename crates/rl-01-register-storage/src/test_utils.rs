//! Test fixtures: a fault-injecting store, raw tamper helpers and builders
//! for well-formed genesis and follow-on dockets.

use crate::adapters::InMemoryKVStore;
use crate::domain::{KVStoreError, KeyPrefix};
use crate::ports::outbound::{BatchOperation, KeyValueStore, ScanResult};
use shared_types::{
    Digest, Docket, DocketState, Payload, Register, RegisterId, TenantId, Timestamp, Transaction,
    TransactionMetadata, TransactionType, GENESIS_PREVIOUS_HASH,
};
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory store whose next `n` batch writes fail.
#[derive(Default)]
pub struct FailingKVStore {
    inner: InMemoryKVStore,
    fail_batches: AtomicUsize,
    failed: AtomicUsize,
}

impl FailingKVStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` calls to `atomic_batch_write` fail.
    pub fn fail_next_batches(&self, n: usize) {
        self.fail_batches.store(n, Ordering::SeqCst);
    }

    /// Batches rejected so far.
    pub fn failed_batches(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }
}

impl KeyValueStore for FailingKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        self.inner.get(key)
    }

    fn atomic_batch_write(&self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        let should_fail = self
            .fail_batches
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            self.failed.fetch_add(1, Ordering::SeqCst);
            return Err(KVStoreError::Io("injected batch failure".into()));
        }
        self.inner.atomic_batch_write(operations)
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, KVStoreError> {
        self.inner.prefix_scan(prefix)
    }
}

/// Overwrite a stored docket, bypassing every commit check.
pub fn overwrite_docket<KV: KeyValueStore>(kv: &KV, docket: &Docket) {
    let bytes = bincode::serialize(docket).expect("docket encodes");
    kv.atomic_batch_write(vec![BatchOperation::put(
        KeyPrefix::docket_key(&docket.register_id, docket.height),
        bytes,
    )])
    .expect("raw write");
}

/// A data transaction with one payload.
pub fn data_transaction(
    register_id: RegisterId,
    sender: &str,
    timestamp: Timestamp,
    prev_tx_id: Option<Digest>,
) -> Transaction {
    Transaction::unsigned(
        register_id,
        sender,
        vec![Payload {
            recipient_wallet: "recipient".into(),
            data: timestamp.to_be_bytes().to_vec(),
        }],
        prev_tx_id,
        timestamp,
        TransactionMetadata::of_type(TransactionType::Data),
    )
}

/// A sealed docket over `transactions`.
pub fn sealed_docket(
    register_id: RegisterId,
    height: u64,
    previous_hash: Digest,
    transactions: &[Transaction],
    timestamp: Timestamp,
) -> Docket {
    let transaction_ids: Vec<_> = transactions.iter().map(|tx| tx.transaction_id).collect();
    Docket {
        register_id,
        height,
        hash: Docket::compute_hash(&register_id, height, &previous_hash, timestamp, &transaction_ids),
        previous_hash,
        transaction_ids,
        state: DocketState::Sealed,
        timestamp,
    }
}

/// Register, genesis docket and genesis transaction ready for `commit_genesis`.
pub fn genesis_fixture(tenant: &str, now: Timestamp) -> (Register, Docket, Transaction) {
    let register_id = RegisterId::generate();
    let register = Register::at_genesis(register_id, "fixture", "", TenantId::from(tenant), now);
    let tx = Transaction::unsigned(
        register_id,
        "system",
        vec![Payload {
            recipient_wallet: "system".into(),
            data: b"{\"owners\":[]}".to_vec(),
        }],
        None,
        now,
        TransactionMetadata::of_type(TransactionType::Control),
    );
    let docket = sealed_docket(register_id, 0, GENESIS_PREVIOUS_HASH, std::slice::from_ref(&tx), now);
    (register, docket, tx)
}
