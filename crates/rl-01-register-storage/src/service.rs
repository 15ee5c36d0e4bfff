//! # Register Storage Service
//!
//! Implements `LedgerStore` over any `KeyValueStore`.
//!
//! Commits take a process-wide commit lock so the check-then-write sequence
//! (height free, parent hash matches, no duplicate transaction) cannot
//! interleave with another commit. Sealing is already serialized per register
//! upstream; this lock is what keeps two writers from ever both passing the
//! checks.

use crate::domain::codec::{decode, encode};
use crate::domain::{KeyPrefix, StorageConfig, StorageError, StorageResult};
use crate::ports::inbound::LedgerStore;
use crate::ports::outbound::{BatchOperation, KeyValueStore};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use shared_types::{
    Docket, DocketState, Register, RegisterId, RegisterStatus, TenantId, Timestamp, Transaction,
    TransactionId,
};
use std::collections::HashSet;
use tracing::{debug, info};

/// The register storage service.
pub struct RegisterStorageService<KV: KeyValueStore> {
    kv_store: KV,
    config: StorageConfig,
    commit_lock: Mutex<()>,
}

impl<KV: KeyValueStore> RegisterStorageService<KV> {
    pub fn new(kv_store: KV, config: StorageConfig) -> Self {
        Self {
            kv_store,
            config,
            commit_lock: Mutex::new(()),
        }
    }

    /// The underlying store.
    pub fn kv_store(&self) -> &KV {
        &self.kv_store
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    fn read<T: DeserializeOwned>(&self, key: &[u8]) -> StorageResult<Option<T>> {
        match self.kv_store.get(key)? {
            Some(bytes) => decode(&bytes).map(Some),
            None => Ok(None),
        }
    }

    fn require_register(&self, register_id: &RegisterId) -> StorageResult<Register> {
        self.get_register(register_id)?
            .ok_or(StorageError::RegisterNotFound {
                register_id: *register_id,
            })
    }

    fn put<T: serde::Serialize>(
        &self,
        ops: &mut Vec<BatchOperation>,
        key: Vec<u8>,
        value: &T,
    ) -> StorageResult<()> {
        ops.push(BatchOperation::put(key, encode(value, self.config.max_record_bytes)?));
        Ok(())
    }

    /// Shared checks for any docket about to be committed.
    fn check_sealed_docket(
        &self,
        docket: &Docket,
        transactions: &[Transaction],
    ) -> StorageResult<()> {
        if docket.state != DocketState::Sealed {
            return Err(StorageError::DocketNotSealed {
                height: docket.height,
            });
        }
        if docket.recompute_hash() != docket.hash {
            return Err(StorageError::InvalidDocketHash {
                height: docket.height,
            });
        }
        if self
            .kv_store
            .exists(&KeyPrefix::docket_key(&docket.register_id, docket.height))?
        {
            return Err(StorageError::HeightTaken {
                register_id: docket.register_id,
                height: docket.height,
            });
        }

        let ids_match = docket.transaction_ids.len() == transactions.len()
            && transactions
                .iter()
                .zip(&docket.transaction_ids)
                .all(|(tx, id)| tx.transaction_id == *id && tx.register_id == docket.register_id);
        if !ids_match {
            return Err(StorageError::TransactionSetMismatch {
                height: docket.height,
            });
        }

        let mut placed = HashSet::with_capacity(transactions.len());
        for tx in transactions {
            if self.contains_transaction(&docket.register_id, &tx.transaction_id)? {
                return Err(StorageError::DuplicateTransaction {
                    transaction_id: tx.transaction_id,
                });
            }
            if let Some(prev_tx_id) = tx.prev_tx_id {
                if !placed.contains(&prev_tx_id)
                    && !self.contains_transaction(&docket.register_id, &prev_tx_id)?
                {
                    return Err(StorageError::UnsealedParent {
                        transaction_id: tx.transaction_id,
                        prev_tx_id,
                    });
                }
            }
            placed.insert(tx.transaction_id);
        }
        Ok(())
    }

    /// Writes for one sealed transaction and its two secondary indices.
    fn transaction_ops(
        &self,
        ops: &mut Vec<BatchOperation>,
        tx: &Transaction,
        height: u64,
    ) -> StorageResult<()> {
        let register_id = tx.register_id;
        let tx_id = tx.transaction_id;
        self.put(
            ops,
            KeyPrefix::transaction_key(&register_id, &tx_id),
            &tx.sealed_at(height),
        )?;
        self.put(
            ops,
            KeyPrefix::sender_key(&tx.sender_wallet, &register_id, &tx_id),
            &(register_id, tx_id),
        )?;
        self.put(
            ops,
            KeyPrefix::time_key(&register_id, tx.timestamp, &tx_id),
            &tx_id,
        )
    }
}

impl<KV: KeyValueStore> LedgerStore for RegisterStorageService<KV> {
    fn get_register(&self, register_id: &RegisterId) -> StorageResult<Option<Register>> {
        self.read(&KeyPrefix::register_key(register_id))
    }

    fn get_register_for_tenant(
        &self,
        tenant_id: &TenantId,
        register_id: &RegisterId,
    ) -> StorageResult<Register> {
        match self.get_register(register_id)? {
            Some(register) if &register.tenant_id == tenant_id => Ok(register),
            _ => Err(StorageError::RegisterNotFound {
                register_id: *register_id,
            }),
        }
    }

    fn list_registers(&self, tenant_id: &TenantId) -> StorageResult<Vec<Register>> {
        let mut registers = Vec::new();
        for (_, value) in self.kv_store.prefix_scan(&KeyPrefix::tenant_scan(tenant_id))? {
            let register_id: RegisterId = decode(&value)?;
            if let Some(register) = self.get_register(&register_id)? {
                registers.push(register);
            }
        }
        Ok(registers)
    }

    fn set_register_status(
        &self,
        register_id: &RegisterId,
        status: RegisterStatus,
        now: Timestamp,
    ) -> StorageResult<Register> {
        let _guard = self.commit_lock.lock();
        let mut register = self.require_register(register_id)?;
        if register.status == status {
            return Ok(register);
        }
        let previous = register.status;
        register.status = status;
        register.updated_at = now;

        let mut ops = Vec::with_capacity(1);
        self.put(&mut ops, KeyPrefix::register_key(register_id), &register)?;
        self.kv_store.atomic_batch_write(ops)?;

        info!(%register_id, from = ?previous, to = ?status, "Register status changed");
        Ok(register)
    }

    fn get_docket(&self, register_id: &RegisterId, height: u64) -> StorageResult<Option<Docket>> {
        self.read(&KeyPrefix::docket_key(register_id, height))
    }

    fn last_docket(&self, register_id: &RegisterId) -> StorageResult<Option<Docket>> {
        match self.get_register(register_id)? {
            Some(register) => self.get_docket(register_id, register.height),
            None => Ok(None),
        }
    }

    fn get_dockets(
        &self,
        register_id: &RegisterId,
        from_height: u64,
        limit: usize,
    ) -> StorageResult<Vec<Docket>> {
        let limit = limit.min(self.config.max_dockets_per_read);
        let mut dockets = Vec::with_capacity(limit);
        for height in from_height..from_height.saturating_add(limit as u64) {
            match self.get_docket(register_id, height)? {
                Some(docket) => dockets.push(docket),
                None => break,
            }
        }
        Ok(dockets)
    }

    fn get_transaction(
        &self,
        register_id: &RegisterId,
        tx_id: &TransactionId,
    ) -> StorageResult<Option<Transaction>> {
        self.read(&KeyPrefix::transaction_key(register_id, tx_id))
    }

    fn contains_transaction(
        &self,
        register_id: &RegisterId,
        tx_id: &TransactionId,
    ) -> StorageResult<bool> {
        Ok(self
            .kv_store
            .exists(&KeyPrefix::transaction_key(register_id, tx_id))?)
    }

    fn transactions_by_sender(&self, wallet: &str) -> StorageResult<Vec<Transaction>> {
        let mut out = Vec::new();
        for (_, value) in self.kv_store.prefix_scan(&KeyPrefix::sender_scan(wallet))? {
            let (register_id, tx_id): (RegisterId, TransactionId) = decode(&value)?;
            if let Some(tx) = self.get_transaction(&register_id, &tx_id)? {
                out.push(tx);
            }
        }
        Ok(out)
    }

    fn transactions_in_range(
        &self,
        register_id: &RegisterId,
        from: Timestamp,
        to: Timestamp,
    ) -> StorageResult<Vec<Transaction>> {
        let mut out = Vec::new();
        for (key, value) in self.kv_store.prefix_scan(&KeyPrefix::time_scan(register_id))? {
            let Some(timestamp) = KeyPrefix::timestamp_of_time_key(&key) else {
                continue;
            };
            if timestamp < from {
                continue;
            }
            if timestamp >= to {
                break;
            }
            let tx_id: TransactionId = decode(&value)?;
            if let Some(tx) = self.get_transaction(register_id, &tx_id)? {
                out.push(tx);
            }
        }
        Ok(out)
    }

    fn commit_genesis(
        &self,
        register: Register,
        docket: Docket,
        transaction: Transaction,
    ) -> StorageResult<()> {
        let _guard = self.commit_lock.lock();
        let register_id = register.id;

        if self.get_register(&register_id)?.is_some() {
            return Err(StorageError::RegisterExists { register_id });
        }
        if !docket.is_genesis() || register.height != 0 {
            return Err(StorageError::NotGenesis {
                height: docket.height,
            });
        }
        if docket.register_id != register_id {
            return Err(StorageError::TransactionSetMismatch { height: 0 });
        }
        let transactions = [transaction];
        self.check_sealed_docket(&docket, &transactions)?;

        let owned = self
            .kv_store
            .prefix_scan(&KeyPrefix::tenant_scan(&register.tenant_id))?
            .len();
        if owned >= self.config.max_registers_per_tenant {
            return Err(StorageError::TenantLimit {
                tenant_id: register.tenant_id.clone(),
                limit: self.config.max_registers_per_tenant,
            });
        }

        let mut ops = Vec::with_capacity(6);
        self.put(&mut ops, KeyPrefix::register_key(&register_id), &register)?;
        self.put(
            &mut ops,
            KeyPrefix::tenant_key(&register.tenant_id, &register_id),
            &register_id,
        )?;
        self.put(&mut ops, KeyPrefix::docket_key(&register_id, 0), &docket)?;
        self.transaction_ops(&mut ops, &transactions[0], 0)?;
        self.kv_store.atomic_batch_write(ops)?;

        info!(
            %register_id,
            tenant_id = %register.tenant_id,
            genesis_hash = %docket.hash,
            "Register persisted with genesis docket"
        );
        Ok(())
    }

    fn commit_docket(
        &self,
        docket: Docket,
        transactions: Vec<Transaction>,
        now: Timestamp,
    ) -> StorageResult<Register> {
        let _guard = self.commit_lock.lock();
        let register_id = docket.register_id;
        let height = docket.height;

        let mut register = self.require_register(&register_id)?;
        if height != register.height + 1 {
            return Err(StorageError::HeightMismatch {
                expected_after: register.height,
                actual: height,
            });
        }
        let parent_hash = self
            .get_docket(&register_id, height - 1)?
            .map(|parent| parent.hash);
        if parent_hash != Some(docket.previous_hash) {
            return Err(StorageError::PreviousHashMismatch { height });
        }
        self.check_sealed_docket(&docket, &transactions)?;

        let mut ops = Vec::with_capacity(2 + transactions.len() * 3);
        self.put(&mut ops, KeyPrefix::docket_key(&register_id, height), &docket)?;
        for tx in &transactions {
            self.transaction_ops(&mut ops, tx, height)?;
        }
        register.advance_height(height, now);
        self.put(&mut ops, KeyPrefix::register_key(&register_id), &register)?;
        self.kv_store.atomic_batch_write(ops)?;

        debug!(
            %register_id,
            height,
            tx_count = transactions.len(),
            hash = %docket.hash,
            "Docket committed"
        );
        Ok(register)
    }
}

#[cfg(test)]
mod tests;
