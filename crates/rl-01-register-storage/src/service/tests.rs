use super::*;
use crate::adapters::InMemoryKVStore;
use crate::test_utils::{
    data_transaction, genesis_fixture, overwrite_docket, sealed_docket, FailingKVStore,
};
use shared_types::{Digest, ErrorKind};

const T0: Timestamp = 1_700_000_000_000;

fn store() -> RegisterStorageService<InMemoryKVStore> {
    RegisterStorageService::new(InMemoryKVStore::new(), StorageConfig::default())
}

fn with_genesis<KV: KeyValueStore>(store: &RegisterStorageService<KV>) -> (Register, Docket) {
    let (register, docket, tx) = genesis_fixture("tenant-a", T0);
    store
        .commit_genesis(register.clone(), docket.clone(), tx)
        .unwrap();
    (register, docket)
}

#[test]
fn test_genesis_creates_register_docket_and_transaction() {
    let store = store();
    let (register, docket, tx) = genesis_fixture("tenant-a", T0);
    let register_id = register.id;

    store.commit_genesis(register, docket.clone(), tx.clone()).unwrap();

    let stored = store.get_register(&register_id).unwrap().unwrap();
    assert_eq!(stored.height, 0);
    assert_eq!(store.last_docket(&register_id).unwrap(), Some(docket));
    assert!(store
        .contains_transaction(&register_id, &tx.transaction_id)
        .unwrap());
}

#[test]
fn test_second_genesis_conflicts() {
    let store = store();
    let (register, docket, tx) = genesis_fixture("tenant-a", T0);
    store
        .commit_genesis(register.clone(), docket.clone(), tx.clone())
        .unwrap();

    let err = store.commit_genesis(register, docket, tx).unwrap_err();
    assert!(matches!(err, StorageError::RegisterExists { .. }));
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[test]
fn test_failed_genesis_leaves_nothing_behind() {
    let store = RegisterStorageService::new(FailingKVStore::new(), StorageConfig::default());
    store.kv_store().fail_next_batches(1);
    let (register, docket, tx) = genesis_fixture("tenant-a", T0);
    let register_id = register.id;

    let err = store.commit_genesis(register, docket, tx).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unavailable);
    assert_eq!(store.get_register(&register_id).unwrap(), None);
    assert_eq!(store.get_docket(&register_id, 0).unwrap(), None);
}

#[test]
fn test_commit_docket_advances_height_and_indexes() {
    let store = store();
    let (register, genesis) = with_genesis(&store);
    let txs = vec![
        data_transaction(register.id, "alice", T0 + 10, None),
        data_transaction(register.id, "bob", T0 + 20, None),
    ];
    let docket = sealed_docket(register.id, 1, genesis.hash, &txs, T0 + 30);

    let updated = store.commit_docket(docket, txs.clone(), T0 + 30).unwrap();

    assert_eq!(updated.height, 1);
    let by_alice = store.transactions_by_sender("alice").unwrap();
    assert_eq!(by_alice.len(), 1);
    assert_eq!(by_alice[0].docket_height, 1);
    let ranged = store
        .transactions_in_range(&register.id, T0 + 15, T0 + 25)
        .unwrap();
    assert_eq!(ranged.len(), 1);
    assert_eq!(ranged[0].sender_wallet, "bob");
}

#[test]
fn test_mismatched_previous_hash_rejected_before_write() {
    let store = store();
    let (register, genesis) = with_genesis(&store);
    let mut parent = genesis.hash;
    for height in 1..=4 {
        let txs = vec![data_transaction(register.id, "alice", T0 + height, None)];
        let docket = sealed_docket(register.id, height, parent, &txs, T0 + height);
        parent = docket.hash;
        store.commit_docket(docket, txs, T0 + height).unwrap();
    }

    let txs = vec![data_transaction(register.id, "alice", T0 + 5, None)];
    let bad = sealed_docket(register.id, 5, Digest([0xEE; 32]), &txs, T0 + 5);
    let err = store.commit_docket(bad, txs, T0 + 5).unwrap_err();

    assert_eq!(err, StorageError::PreviousHashMismatch { height: 5 });
    assert_eq!(store.get_docket(&register.id, 5).unwrap(), None);
    assert_eq!(store.get_register(&register.id).unwrap().unwrap().height, 4);
}

#[test]
fn test_height_must_follow_head() {
    let store = store();
    let (register, genesis) = with_genesis(&store);
    let txs = vec![data_transaction(register.id, "alice", T0, None)];
    let skip = sealed_docket(register.id, 2, genesis.hash, &txs, T0);

    let err = store.commit_docket(skip, txs, T0).unwrap_err();
    assert_eq!(
        err,
        StorageError::HeightMismatch {
            expected_after: 0,
            actual: 2
        }
    );
}

#[test]
fn test_tampered_candidate_hash_rejected() {
    let store = store();
    let (register, genesis) = with_genesis(&store);
    let txs = vec![data_transaction(register.id, "alice", T0, None)];
    let mut docket = sealed_docket(register.id, 1, genesis.hash, &txs, T0);
    docket.transaction_ids.reverse();
    docket.transaction_ids.push(Digest([1; 32]));

    let err = store.commit_docket(docket, txs, T0).unwrap_err();
    assert_eq!(err, StorageError::InvalidDocketHash { height: 1 });
}

#[test]
fn test_already_sealed_transaction_rejected() {
    let store = store();
    let (register, genesis) = with_genesis(&store);
    let txs = vec![data_transaction(register.id, "alice", T0, None)];
    let first = sealed_docket(register.id, 1, genesis.hash, &txs, T0);
    store.commit_docket(first.clone(), txs.clone(), T0).unwrap();

    let again = sealed_docket(register.id, 2, first.hash, &txs, T0 + 1);
    let err = store.commit_docket(again, txs, T0 + 1).unwrap_err();
    assert!(matches!(err, StorageError::DuplicateTransaction { .. }));
}

#[test]
fn test_child_needs_sealed_or_earlier_parent() {
    let store = store();
    let (register, genesis) = with_genesis(&store);
    let parent = data_transaction(register.id, "alice", T0 + 1, None);
    let child = data_transaction(register.id, "alice", T0 + 2, Some(parent.transaction_id));

    // Parent never sealed and absent from the docket.
    let txs = vec![child.clone()];
    let orphan = sealed_docket(register.id, 1, genesis.hash, &txs, T0 + 2);
    let err = store.commit_docket(orphan, txs, T0 + 2).unwrap_err();
    assert_eq!(
        err,
        StorageError::UnsealedParent {
            transaction_id: child.transaction_id,
            prev_tx_id: parent.transaction_id,
        }
    );
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(store.get_register(&register.id).unwrap().unwrap().height, 0);

    // Child ahead of its parent in the same docket.
    let txs = vec![child.clone(), parent.clone()];
    let reversed = sealed_docket(register.id, 1, genesis.hash, &txs, T0 + 2);
    assert!(matches!(
        store.commit_docket(reversed, txs, T0 + 2),
        Err(StorageError::UnsealedParent { .. })
    ));

    // Parent first in the docket, then the child in a later docket.
    let txs = vec![parent.clone()];
    let first = sealed_docket(register.id, 1, genesis.hash, &txs, T0 + 1);
    store.commit_docket(first.clone(), txs, T0 + 1).unwrap();
    let txs = vec![child];
    let second = sealed_docket(register.id, 2, first.hash, &txs, T0 + 2);
    store.commit_docket(second, txs, T0 + 2).unwrap();
}

#[test]
fn test_tenant_scoping() {
    let store = store();
    let (register, _) = with_genesis(&store);

    assert!(store
        .get_register_for_tenant(&TenantId::from("tenant-a"), &register.id)
        .is_ok());
    let err = store
        .get_register_for_tenant(&TenantId::from("tenant-b"), &register.id)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(store.list_registers(&TenantId::from("tenant-a")).unwrap().len(), 1);
    assert!(store
        .list_registers(&TenantId::from("tenant-b"))
        .unwrap()
        .is_empty());
}

#[test]
fn test_tenant_register_limit() {
    let store = RegisterStorageService::new(
        InMemoryKVStore::new(),
        StorageConfig {
            max_registers_per_tenant: 1,
            ..StorageConfig::default()
        },
    );
    with_genesis(&store);

    let (register, docket, tx) = genesis_fixture("tenant-a", T0);
    let err = store.commit_genesis(register, docket, tx).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Exhausted);
}

#[test]
fn test_status_change_keeps_height() {
    let store = store();
    let (register, _) = with_genesis(&store);

    let updated = store
        .set_register_status(&register.id, RegisterStatus::Recovery, T0 + 1)
        .unwrap();
    assert_eq!(updated.status, RegisterStatus::Recovery);
    assert_eq!(updated.height, 0);
    assert_eq!(updated.updated_at, T0 + 1);
}

#[test]
fn test_get_dockets_stops_at_head() {
    let store = store();
    let (register, genesis) = with_genesis(&store);
    let txs = vec![data_transaction(register.id, "alice", T0, None)];
    store
        .commit_docket(sealed_docket(register.id, 1, genesis.hash, &txs, T0), txs, T0)
        .unwrap();

    let dockets = store.get_dockets(&register.id, 0, 10).unwrap();
    assert_eq!(dockets.iter().map(|d| d.height).collect::<Vec<_>>(), vec![0, 1]);
}

#[test]
fn test_overwrite_is_visible_to_reads() {
    let store = store();
    let (register, mut genesis) = with_genesis(&store);
    genesis.hash = Digest([0xAB; 32]);
    overwrite_docket(store.kv_store(), &genesis);

    let read = store.get_docket(&register.id, 0).unwrap().unwrap();
    assert_ne!(read.recompute_hash(), read.hash);
}
