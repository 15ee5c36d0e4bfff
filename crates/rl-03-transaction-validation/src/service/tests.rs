use super::*;
use crate::adapters::StorageRegisterView;
use crate::domain::HashField;
use rl_01_register_storage::test_utils::{data_transaction, genesis_fixture};
use rl_01_register_storage::{InMemoryLedgerStore, LedgerStore};
use rl_02_mempool::{MempoolConfig, MempoolService};
use shared_bus::{EventFilter, InMemoryEventBus};
use shared_crypto::{SignatureAlgorithm, SigningKeyPair};
use shared_types::{
    DigestMode, ManualTimeSource, RegisterId, RegisterStatus, TransactionId, TransactionSignature,
};

const T0: u64 = 1_700_000_000_000;

struct Fixture {
    validator: TransactionValidator,
    store: Arc<InMemoryLedgerStore>,
    mempool: Arc<MempoolService>,
    bus: Arc<InMemoryEventBus>,
    key: SigningKeyPair,
    register_id: RegisterId,
    genesis_tx_id: TransactionId,
}

fn fixture() -> Fixture {
    let store = Arc::new(InMemoryLedgerStore::in_memory());
    let (register, docket, genesis) = genesis_fixture("tenant-a", T0);
    let register_id = register.id;
    let genesis_tx_id = genesis.transaction_id;
    store.commit_genesis(register, docket, genesis).unwrap();

    let mempool = Arc::new(MempoolService::new(
        MempoolConfig::default(),
        Arc::new(rl_02_mempool::StorageSealedIndex::new(store.clone())),
        Arc::new(ManualTimeSource::new(T0)),
    ));
    let bus = Arc::new(InMemoryEventBus::new());
    let validator = TransactionValidator::new(
        ValidatorConfig::default(),
        Arc::new(StorageRegisterView::new(store.clone())),
        mempool.clone(),
        bus.clone(),
    );

    Fixture {
        validator,
        store,
        mempool,
        bus,
        key: SigningKeyPair::generate(SignatureAlgorithm::Ed25519).unwrap(),
        register_id,
        genesis_tx_id,
    }
}

fn sign(mut tx: Transaction, key: &SigningKeyPair) -> Transaction {
    tx.signatures.push(TransactionSignature {
        public_key: key.public_key_bytes().unwrap(),
        signature_value: key.sign(tx.signing_target(), DigestMode::PreHashed).unwrap(),
        algorithm: key.algorithm(),
    });
    tx
}

impl Fixture {
    fn signed(&self, timestamp: u64, prev: Option<TransactionId>) -> Transaction {
        sign(
            data_transaction(self.register_id, "alice", timestamp, prev),
            &self.key,
        )
    }

    fn rejection(&self, outcome: ValidationOutcome) -> RejectionReason {
        outcome
            .rejection()
            .cloned()
            .expect("transaction should have been rejected")
    }
}

#[tokio::test]
async fn test_valid_transaction_enters_mempool_and_is_announced() {
    let f = fixture();
    let mut events = f.bus.subscribe(EventFilter::all());
    let tx = f.signed(T0 + 1, None);

    let outcome = f.validator.validate(tx.clone()).await.unwrap();

    assert_eq!(
        outcome,
        ValidationOutcome::Accepted {
            transaction_id: tx.transaction_id,
            pending: 1
        }
    );
    assert!(f.mempool.contains(&f.register_id, &tx.transaction_id));
    assert!(matches!(
        events.try_recv().unwrap(),
        Some(LedgerEvent::TransactionAccepted { pending: 1, .. })
    ));
}

#[tokio::test]
async fn test_mutated_payload_byte_is_hash_mismatch() {
    let f = fixture();
    let mut tx = f.signed(T0 + 1, None);
    tx.payloads[0].data[0] ^= 0x80;

    let reason = f.rejection(f.validator.validate(tx).await.unwrap());

    assert_eq!(
        reason,
        RejectionReason::HashMismatch {
            field: HashField::PayloadHash
        }
    );
    assert_eq!(reason.kind(), shared_types::ErrorKind::CryptographicFailure);
    assert_eq!(f.mempool.stats(&f.register_id).pending, 0);
}

#[tokio::test]
async fn test_signature_by_other_key_rejected() {
    let f = fixture();
    let tx = data_transaction(f.register_id, "alice", T0 + 1, None);
    let other = SigningKeyPair::generate(SignatureAlgorithm::NistP256).unwrap();
    let mut tx = sign(tx, &other);
    tx.signatures[0].public_key = SigningKeyPair::generate(SignatureAlgorithm::NistP256)
        .unwrap()
        .public_key_bytes()
        .unwrap();

    let reason = f.rejection(f.validator.validate(tx).await.unwrap());
    assert!(matches!(reason, RejectionReason::InvalidSignature { index: 0, .. }));
}

#[tokio::test]
async fn test_signature_over_raw_id_is_not_accepted() {
    let f = fixture();
    let tx = data_transaction(f.register_id, "alice", T0 + 1, None);
    let key = SigningKeyPair::generate(SignatureAlgorithm::NistP256).unwrap();
    let signature_value = key.sign(tx.signing_target(), DigestMode::Raw).unwrap();
    let mut tx = tx;
    tx.signatures.push(TransactionSignature {
        public_key: key.public_key_bytes().unwrap(),
        signature_value,
        algorithm: SignatureAlgorithm::NistP256,
    });

    let reason = f.rejection(f.validator.validate(tx).await.unwrap());
    assert!(matches!(reason, RejectionReason::InvalidSignature { .. }));
}

#[tokio::test]
async fn test_unknown_register_not_found() {
    let f = fixture();
    let tx = sign(
        data_transaction(RegisterId::generate(), "alice", T0 + 1, None),
        &f.key,
    );

    let reason = f.rejection(f.validator.validate(tx).await.unwrap());
    assert!(matches!(reason, RejectionReason::RegisterNotFound { .. }));
}

#[tokio::test]
async fn test_register_in_recovery_refuses_transactions() {
    let f = fixture();
    f.store
        .set_register_status(&f.register_id, RegisterStatus::Recovery, T0)
        .unwrap();

    let reason = f.rejection(f.validator.validate(f.signed(T0 + 1, None)).await.unwrap());
    assert_eq!(
        reason,
        RejectionReason::RegisterNotOnline {
            register_id: f.register_id,
            status: RegisterStatus::Recovery
        }
    );
}

#[tokio::test]
async fn test_prev_reference_must_be_known() {
    let f = fixture();
    let orphan = f.signed(T0 + 1, Some(shared_types::Digest([7u8; 32])));

    let reason = f.rejection(f.validator.validate(orphan).await.unwrap());
    assert!(matches!(reason, RejectionReason::InvalidChainReference { .. }));
}

#[tokio::test]
async fn test_prev_reference_to_sealed_or_pending_accepted() {
    let f = fixture();
    let child_of_genesis = f.signed(T0 + 1, Some(f.genesis_tx_id));
    assert!(f
        .validator
        .validate(child_of_genesis.clone())
        .await
        .unwrap()
        .is_accepted());

    let grandchild = f.signed(T0 + 2, Some(child_of_genesis.transaction_id));
    assert!(f.validator.validate(grandchild).await.unwrap().is_accepted());
}

#[tokio::test]
async fn test_duplicates_pending_and_sealed() {
    let f = fixture();
    let tx = f.signed(T0 + 1, None);
    f.validator.validate(tx.clone()).await.unwrap();

    let reason = f.rejection(f.validator.validate(tx).await.unwrap());
    assert!(matches!(reason, RejectionReason::Duplicate { .. }));

    // Signatures are outside the id, so a signed copy of the sealed genesis
    // transaction keeps its id.
    let genesis = f
        .store
        .get_transaction(&f.register_id, &f.genesis_tx_id)
        .unwrap()
        .unwrap();
    let replay = sign(Transaction { docket_height: 0, ..genesis }, &f.key);
    let reason = f.rejection(f.validator.validate(replay).await.unwrap());
    assert_eq!(
        reason,
        RejectionReason::Duplicate {
            transaction_id: f.genesis_tx_id
        }
    );
}

#[tokio::test]
async fn test_expired_transaction_rejected() {
    let f = fixture();
    let tx = sign(
        data_transaction(f.register_id, "alice", T0 - 10, None).with_expiry(T0),
        &f.key,
    );

    let reason = f.rejection(f.validator.validate(tx).await.unwrap());
    assert_eq!(reason, RejectionReason::Expired { expires_at: T0 });
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_batch_keeps_order_and_isolates_failures() {
    let f = fixture();
    let parent = f.signed(T0 + 1, None);
    let child = f.signed(T0 + 2, Some(parent.transaction_id));
    let mut broken = f.signed(T0 + 3, None);
    broken.payloads[0].data.push(0);

    let outcomes = f
        .validator
        .validate_batch(vec![parent, child, broken])
        .await
        .unwrap();

    assert!(outcomes[0].is_accepted());
    assert!(outcomes[1].is_accepted());
    assert!(matches!(
        outcomes[2],
        ValidationOutcome::Rejected(RejectionReason::HashMismatch { .. })
    ));
    assert_eq!(f.mempool.stats(&f.register_id).pending, 2);
}
