//! Racing callers against the same register.

use super::fixtures::*;
use node_runtime::NodeConfig;
use rl_01_register_storage::LedgerStore;
use rl_04_docket_consensus::ConsensusApi;
use shared_crypto::SigningKeyPair;
use shared_types::{ErrorKind, SignatureAlgorithm};
use std::collections::HashSet;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_finalize_creates_exactly_one_register() {
    let node = Node::new();
    let alice = OwnerKey::new("admin", "alice", SignatureAlgorithm::Ed25519);
    let initiated = node
        .api
        .initiate_register(initiate_request("R1", &[&alice]))
        .await
        .unwrap();
    let request = finalize_request(&initiated, vec![alice.attest(&initiated)]);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let api = node.api.clone();
            let request = request.clone();
            tokio::spawn(async move { api.finalize_register(request).await })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(err) => assert_eq!(err.kind, ErrorKind::Conflict),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(node.api.list_registers(&tenant()).unwrap().len(), 1);
    assert_eq!(
        node.container.storage.get_register(&initiated.register_id).unwrap().unwrap().height,
        0
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_sealers_produce_contiguous_chain() {
    let mut config = NodeConfig::default();
    config.consensus.max_transactions = 4;
    config.consensus.trigger_count = 4;
    let node = Node::with_config(config);
    let register_id = create_register(&node.api, "R1").await;
    let key = SigningKeyPair::generate(SignatureAlgorithm::Ed25519).unwrap();

    let mut submitted = HashSet::new();
    for n in 0..40 {
        let tx = signed_data(&key, register_id, "alice", n, None);
        submitted.insert(tx.transaction_id);
        node.api.submit_transaction(&tenant(), tx).await.unwrap();
    }

    let sealers: Vec<_> = (0..4)
        .map(|_| {
            let api = node.api.clone();
            tokio::spawn(async move {
                let mut sealed = 0u64;
                for _ in 0..200 {
                    match api.seal_pending(&tenant(), &register_id).await {
                        Ok(Some(_)) => sealed += 1,
                        Ok(None) => break,
                        Err(err) => assert_eq!(err.kind, ErrorKind::Conflict),
                    }
                    tokio::task::yield_now().await;
                }
                sealed
            })
        })
        .collect();
    let mut dockets_sealed = 0u64;
    for sealer in sealers {
        dockets_sealed += sealer.await.unwrap();
    }

    let register = node.api.get_register(&tenant(), &register_id).unwrap();
    assert_eq!(register.height, dockets_sealed);
    assert_eq!(register.height, 10);

    let dockets = node.container.storage.get_dockets(&register_id, 0, 64).unwrap();
    node.container.consensus.verify_chain(&dockets).unwrap();

    let mut seen = HashSet::new();
    for docket in &dockets[1..] {
        for id in &docket.transaction_ids {
            assert!(seen.insert(*id), "transaction sealed twice");
        }
    }
    assert_eq!(seen, submitted);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_same_transaction_admitted_once_under_race() {
    let node = Node::new();
    let register_id = create_register(&node.api, "R1").await;
    let key = SigningKeyPair::generate(SignatureAlgorithm::Ed25519).unwrap();
    let tx = signed_data(&key, register_id, "alice", 1, None);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let api = node.api.clone();
            let tx = tx.clone();
            tokio::spawn(async move { api.submit_transaction(&tenant(), tx).await })
        })
        .collect();

    let mut accepted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(err) => assert_eq!(err.kind, ErrorKind::Conflict),
        }
    }

    assert_eq!(accepted, 1);
    assert_eq!(
        node.api.get_mempool_stats(&tenant(), &register_id).unwrap().pending,
        1
    );
}
