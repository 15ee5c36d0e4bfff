//! End-to-end flows across creation, admission, sealing and verification.

use super::fixtures::*;
use node_runtime::api::SetStatusRequest;
use node_runtime::{NodeConfig, NodeRuntime};
use rl_01_register_storage::test_utils::{overwrite_docket, sealed_docket};
use rl_01_register_storage::{LedgerStore, StorageError};
use rl_02_mempool::{MempoolApi, Priority};
use rl_03_transaction_validation::{
    HashField, RejectionReason, TransactionValidationApi, ValidationOutcome,
};
use rl_04_docket_consensus::ConsensusApi;
use rl_05_register_creation::GenesisControlRecord;
use shared_crypto::SigningKeyPair;
use shared_types::{
    Digest, ErrorKind, RegisterStatus, SignatureAlgorithm, Transaction, TransactionType,
    GENESIS_PREVIOUS_HASH,
};
use std::time::Duration;

fn ed25519() -> SigningKeyPair {
    SigningKeyPair::generate(SignatureAlgorithm::Ed25519).expect("key")
}

// =============================================================================
// REGISTER CREATION
// =============================================================================

#[tokio::test]
async fn test_register_born_with_single_genesis_docket() {
    let node = Node::new();
    let admin = OwnerKey::new("admin", "alice", SignatureAlgorithm::Ed25519);
    let auditor = OwnerKey::new("auditor", "bob", SignatureAlgorithm::NistP256);

    let initiated = node
        .api
        .initiate_register(initiate_request("R1", &[&admin, &auditor]))
        .await
        .unwrap();
    let finalized = node
        .api
        .finalize_register(finalize_request(
            &initiated,
            vec![auditor.attest(&initiated), admin.attest(&initiated)],
        ))
        .await
        .unwrap();
    let register_id = finalized.register_id;

    let register = node.api.get_register(&tenant(), &register_id).unwrap();
    assert_eq!(register.height, 0);
    assert_eq!(register.status, RegisterStatus::Online);

    let genesis = node.api.get_docket(&tenant(), &register_id, 0).unwrap();
    assert_eq!(genesis.previous_hash, GENESIS_PREVIOUS_HASH);
    assert_eq!(genesis.transaction_ids.len(), 1);
    assert!(node.api.get_docket(&tenant(), &register_id, 1).is_err());

    let control = node
        .api
        .get_transaction(&tenant(), &register_id, &genesis.transaction_ids[0])
        .unwrap();
    assert_eq!(control.prev_tx_id, None);
    assert_eq!(control.docket_height, 0);
    assert_eq!(control.metadata.tx_type, TransactionType::Control);

    let record = GenesisControlRecord::from_transaction(&control).unwrap();
    let subjects: Vec<&str> = record.owners.iter().map(|o| o.subject.as_str()).collect();
    assert_eq!(subjects, ["alice", "bob"]);
}

#[tokio::test]
async fn test_data_to_sign_is_lowercase_sha256_hex() {
    let node = Node::new();
    let alice = OwnerKey::new("admin", "alice", SignatureAlgorithm::Ed25519);

    let initiated = node
        .api
        .initiate_register(initiate_request("R1", &[&alice]))
        .await
        .unwrap();

    assert_eq!(initiated.attestations_to_sign.len(), 1);
    let data_to_sign = &initiated.attestations_to_sign[0].data_to_sign;
    assert_eq!(data_to_sign.len(), 64);
    assert!(data_to_sign
        .chars()
        .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
}

#[tokio::test]
async fn test_signature_over_other_digest_is_cryptographic_failure() {
    let node = Node::new();
    let alice = OwnerKey::new("admin", "alice", SignatureAlgorithm::Ed25519);
    let initiated = node
        .api
        .initiate_register(initiate_request("R1", &[&alice]))
        .await
        .unwrap();

    let other = hex::encode([0x5a_u8; 32]);
    let err = node
        .api
        .finalize_register(finalize_request(
            &initiated,
            vec![alice.sign_hex(&initiated, &other)],
        ))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::CryptographicFailure);
    assert!(node.api.list_registers(&tenant()).unwrap().is_empty());

    // Lease released: the owner can still finish with the right digest.
    node.api
        .finalize_register(finalize_request(&initiated, vec![alice.attest(&initiated)]))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_replayed_finalize_is_conflict() {
    let node = Node::new();
    let alice = OwnerKey::new("admin", "alice", SignatureAlgorithm::Ed25519);
    let initiated = node
        .api
        .initiate_register(initiate_request("R1", &[&alice]))
        .await
        .unwrap();
    let request = finalize_request(&initiated, vec![alice.attest(&initiated)]);

    node.api.finalize_register(request.clone()).await.unwrap();
    let err = node.api.finalize_register(request).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Conflict);
    assert_eq!(node.api.list_registers(&tenant()).unwrap().len(), 1);
}

// =============================================================================
// ADMISSION
// =============================================================================

#[tokio::test]
async fn test_mutated_payload_fails_hash_check() {
    let node = Node::new();
    let register_id = create_register(&node.api, "R1").await;
    let key = ed25519();

    let mut tampered = signed_data(&key, register_id, "alice", 1, None);
    tampered.payloads[0].data.push(0xff);

    let outcome = node.container.validator.validate(tampered).await.unwrap();
    assert_eq!(
        outcome,
        ValidationOutcome::Rejected(RejectionReason::HashMismatch {
            field: HashField::PayloadHash
        })
    );
    assert_eq!(node.api.get_mempool_stats(&tenant(), &register_id).unwrap().pending, 0);
}

#[tokio::test]
async fn test_sealed_payload_hash_recomputes_from_stored_bytes() {
    let node = Node::new();
    let register_id = create_register(&node.api, "R1").await;
    let key = ed25519();

    let tx = signed_data(&key, register_id, "alice", 1, None);
    let tx_id = node
        .api
        .submit_transaction(&tenant(), tx)
        .await
        .unwrap()
        .transaction_id;
    node.api.seal_pending(&tenant(), &register_id).await.unwrap();

    let stored = node.api.get_transaction(&tenant(), &register_id, &tx_id).unwrap();
    assert_eq!(stored.docket_height, 1);
    assert_eq!(
        Transaction::compute_payload_hash(&stored.payloads),
        stored.payload_hash
    );
    assert_eq!(stored.compute_id(), tx_id);
}

#[tokio::test]
async fn test_prev_tx_id_must_name_accepted_transaction() {
    let node = Node::new();
    let register_id = create_register(&node.api, "R1").await;
    let key = ed25519();

    let dangling = signed_data(&key, register_id, "alice", 1, Some(Digest::from([7u8; 32])));
    let err = node.api.submit_transaction(&tenant(), dangling).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let parent = signed_data(&key, register_id, "alice", 2, None);
    let parent_id = parent.transaction_id;
    node.api.submit_transaction(&tenant(), parent).await.unwrap();
    let child = signed_data(&key, register_id, "alice", 3, Some(parent_id));
    node.api.submit_transaction(&tenant(), child).await.unwrap();

    let docket = node
        .api
        .seal_pending(&tenant(), &register_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(docket.transaction_ids.len(), 2);
    assert_eq!(docket.transaction_ids[0], parent_id);
}

// =============================================================================
// SEALING
// =============================================================================

#[tokio::test]
async fn test_high_band_sealed_first_and_fifo_within_band() {
    let node = Node::new();
    let register_id = create_register(&node.api, "R1").await;
    let key = ed25519();
    let mempool = &node.container.mempool;

    let n1 = signed_data(&key, register_id, "alice", 1, None);
    let n2 = signed_data(&key, register_id, "alice", 2, None);
    let h1 = signed_data(&key, register_id, "alice", 3, None);
    let h2 = signed_data(&key, register_id, "alice", 4, None);
    mempool.enqueue_with_priority(n1.clone(), Priority::Normal).unwrap();
    mempool.enqueue_with_priority(h1.clone(), Priority::High).unwrap();
    mempool.enqueue_with_priority(n2.clone(), Priority::Normal).unwrap();
    mempool.enqueue_with_priority(h2.clone(), Priority::High).unwrap();

    let docket = node
        .api
        .seal_pending(&tenant(), &register_id)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        docket.transaction_ids,
        vec![
            h1.transaction_id,
            h2.transaction_id,
            n1.transaction_id,
            n2.transaction_id
        ]
    );
    assert_eq!(mempool.stats(&register_id).pending, 0);
}

#[tokio::test]
async fn test_docket_size_bounded_by_policy() {
    let mut config = NodeConfig::default();
    config.consensus.max_transactions = 3;
    config.consensus.trigger_count = 3;
    let node = Node::with_config(config);
    let register_id = create_register(&node.api, "R1").await;
    let key = ed25519();

    for n in 0..7 {
        node.api
            .submit_transaction(&tenant(), signed_data(&key, register_id, "alice", n, None))
            .await
            .unwrap();
    }

    let mut sizes = Vec::new();
    while let Some(docket) = node.api.seal_pending(&tenant(), &register_id).await.unwrap() {
        sizes.push(docket.transaction_ids.len());
    }
    assert_eq!(sizes, [3, 3, 1]);
    assert_eq!(node.api.get_register(&tenant(), &register_id).unwrap().height, 3);
}

#[tokio::test]
async fn test_recovery_register_stops_admission_and_sealing() {
    let node = Node::new();
    let register_id = create_register(&node.api, "R1").await;
    let key = ed25519();

    node.api
        .submit_transaction(&tenant(), signed_data(&key, register_id, "alice", 1, None))
        .await
        .unwrap();
    node.api
        .set_register_status(
            &tenant(),
            &register_id,
            SetStatusRequest {
                status: RegisterStatus::Offline,
            },
        )
        .unwrap();

    let err = node
        .api
        .submit_transaction(&tenant(), signed_data(&key, register_id, "alice", 2, None))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(node.api.seal_pending(&tenant(), &register_id).await.is_err());
    assert_eq!(node.api.get_register(&tenant(), &register_id).unwrap().height, 0);
}

// =============================================================================
// CHAIN INTEGRITY
// =============================================================================

async fn register_at_height(node: &Node, height: u64) -> shared_types::RegisterId {
    let register_id = create_register(&node.api, "R1").await;
    let key = ed25519();
    for n in 0..height {
        node.api
            .submit_transaction(&tenant(), signed_data(&key, register_id, "alice", n, None))
            .await
            .unwrap();
        node.api.seal_pending(&tenant(), &register_id).await.unwrap();
    }
    register_id
}

#[tokio::test]
async fn test_verify_chain_accepts_intact_sequence() {
    let node = Node::new();
    let register_id = register_at_height(&node, 4).await;

    let dockets = node.container.storage.get_dockets(&register_id, 0, 10).unwrap();
    assert_eq!(dockets.len(), 5);
    node.container.consensus.verify_chain(&dockets).unwrap();

    let verified = node
        .api
        .verify_register_chain(&tenant(), &register_id)
        .await
        .unwrap();
    assert_eq!(verified.verified_dockets, 5);
}

#[tokio::test]
async fn test_verify_chain_detects_broken_link() {
    let node = Node::new();
    let register_id = register_at_height(&node, 4).await;

    let mut dockets = node.container.storage.get_dockets(&register_id, 0, 10).unwrap();
    dockets[2].previous_hash = Digest::from([9u8; 32]);
    dockets[2].hash = dockets[2].recompute_hash();

    let err = node.container.consensus.verify_chain(&dockets).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IntegrityViolation);
}

#[tokio::test]
async fn test_stored_corruption_moves_register_to_recovery() {
    let node = Node::new();
    let register_id = register_at_height(&node, 3).await;

    let mut corrupt = node.api.get_docket(&tenant(), &register_id, 2).unwrap();
    corrupt.transaction_ids.clear();
    overwrite_docket(node.container.storage.kv_store(), &corrupt);

    let err = node
        .api
        .verify_register_chain(&tenant(), &register_id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::IntegrityViolation);
    assert_eq!(
        node.api.get_register(&tenant(), &register_id).unwrap().status,
        RegisterStatus::Recovery
    );
}

#[tokio::test]
async fn test_docket_with_wrong_previous_hash_never_persisted() {
    let node = Node::new();
    let register_id = register_at_height(&node, 4).await;
    let storage = &node.container.storage;
    let key = ed25519();

    let tx = signed_data(&key, register_id, "alice", 99, None);
    let forged = sealed_docket(register_id, 5, Digest::from([3u8; 32]), &[tx.clone()], T0 + 99);

    let err = storage.commit_docket(forged, vec![tx.clone()], T0 + 99).unwrap_err();
    assert!(matches!(err, StorageError::PreviousHashMismatch { height: 5 }));
    assert_eq!(err.kind(), ErrorKind::Conflict);

    assert!(storage.get_docket(&register_id, 5).unwrap().is_none());
    assert!(!storage.contains_transaction(&register_id, &tx.transaction_id).unwrap());
    assert_eq!(storage.get_register(&register_id).unwrap().unwrap().height, 4);
}

// =============================================================================
// RUNTIME
// =============================================================================

#[tokio::test]
async fn test_runtime_scheduler_seals_admitted_transactions() {
    let mut config = NodeConfig::default();
    config.consensus.interval = Duration::from_millis(20);
    let runtime = NodeRuntime::new(config).unwrap();
    runtime.start();
    let api = runtime.api();

    let register_id = create_register(&api, "R1").await;
    let key = ed25519();
    let tx_id = api
        .submit_transaction(&tenant(), signed_data(&key, register_id, "alice", 1, None))
        .await
        .unwrap()
        .transaction_id;

    let mut sealed = None;
    for _ in 0..100 {
        if let Ok(tx) = api.get_transaction(&tenant(), &register_id, &tx_id) {
            sealed = Some(tx);
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    runtime.shutdown().await;

    let sealed = sealed.expect("scheduler sealed the transaction");
    assert_eq!(sealed.docket_height, 1);
    assert_eq!(api.get_register(&tenant(), &register_id).unwrap().height, 1);
}
