//! # Inbound Port
//!
//! The persistence API consumed by validation, consensus and register
//! creation. Reads scoped by tenant return `RegisterNotFound` for a
//! register owned by another tenant, so existence does not leak.

use crate::domain::StorageResult;
use shared_types::{
    Docket, Register, RegisterId, RegisterStatus, TenantId, Timestamp, Transaction, TransactionId,
};

/// Persistence API for registers, dockets and sealed transactions.
pub trait LedgerStore: Send + Sync {
    // ---- registers ---------------------------------------------------------

    /// Unscoped lookup for internal callers.
    fn get_register(&self, register_id: &RegisterId) -> StorageResult<Option<Register>>;

    /// Tenant-scoped lookup.
    fn get_register_for_tenant(
        &self,
        tenant_id: &TenantId,
        register_id: &RegisterId,
    ) -> StorageResult<Register>;

    /// All registers owned by a tenant.
    fn list_registers(&self, tenant_id: &TenantId) -> StorageResult<Vec<Register>>;

    /// Operator status change. Height is untouched.
    fn set_register_status(
        &self,
        register_id: &RegisterId,
        status: RegisterStatus,
        now: Timestamp,
    ) -> StorageResult<Register>;

    // ---- dockets -----------------------------------------------------------

    fn get_docket(&self, register_id: &RegisterId, height: u64) -> StorageResult<Option<Docket>>;

    /// Highest sealed docket.
    fn last_docket(&self, register_id: &RegisterId) -> StorageResult<Option<Docket>>;

    /// Up to `limit` dockets from `from_height`, ascending.
    fn get_dockets(
        &self,
        register_id: &RegisterId,
        from_height: u64,
        limit: usize,
    ) -> StorageResult<Vec<Docket>>;

    // ---- transactions ------------------------------------------------------

    fn get_transaction(
        &self,
        register_id: &RegisterId,
        tx_id: &TransactionId,
    ) -> StorageResult<Option<Transaction>>;

    fn contains_transaction(
        &self,
        register_id: &RegisterId,
        tx_id: &TransactionId,
    ) -> StorageResult<bool>;

    /// Every sealed transaction sent from `wallet`, across registers.
    fn transactions_by_sender(&self, wallet: &str) -> StorageResult<Vec<Transaction>>;

    /// Sealed transactions of a register with `from <= timestamp < to`.
    fn transactions_in_range(
        &self,
        register_id: &RegisterId,
        from: Timestamp,
        to: Timestamp,
    ) -> StorageResult<Vec<Transaction>>;

    // ---- commits -----------------------------------------------------------

    /// Persist a new register together with its sealed genesis docket and
    /// genesis transaction in one atomic write. The register does not exist
    /// before this call succeeds.
    fn commit_genesis(
        &self,
        register: Register,
        docket: Docket,
        transaction: Transaction,
    ) -> StorageResult<()>;

    /// Persist a sealed docket with its transactions and advance the
    /// register height, in one atomic write.
    ///
    /// Rejected before anything is written if the height is taken or does not
    /// follow the register head, if `previous_hash` differs from the stored
    /// parent's hash, or if the docket's hash does not match its contents.
    fn commit_docket(
        &self,
        docket: Docket,
        transactions: Vec<Transaction>,
        now: Timestamp,
    ) -> StorageResult<Register>;
}
