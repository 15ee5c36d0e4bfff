//! # Subsystem Container
//!
//! Holds all subsystem instances and wires them together.
//!
//! ## Initialization Order
//!
//! ```text
//! Level 0: event bus, time source, register storage
//! Level 1: mempool (sealed index over storage)
//! Level 2: transaction validator, docket consensus
//! Level 3: wallet, genesis manager
//! Level 4: register creation orchestrator
//! ```
//!
//! Every service is held behind an `Arc`; cross-subsystem references are
//! `Arc<dyn Trait>` ports, so any level can be swapped for another adapter.

use std::sync::Arc;

use shared_bus::InMemoryEventBus;
use shared_crypto::CryptoError;
use shared_types::{SystemTimeSource, TimeSource};
use thiserror::Error;
use tracing::info;

use rl_01_register_storage::{InMemoryKVStore, RegisterStorageService};
use rl_02_mempool::{MempoolService, StorageSealedIndex};
use rl_03_transaction_validation::{StorageRegisterView, TransactionValidator};
use rl_04_docket_consensus::ConsensusService;
use rl_05_register_creation::{
    GenesisManager, InMemoryPendingStore, LocalKeyWallet, RegisterCreationService,
};

use crate::container::config::{ConfigError, NodeConfig};

/// Storage service over the in-memory key-value backend.
pub type NodeStorage = RegisterStorageService<InMemoryKVStore>;

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("system wallet key: {0}")]
    WalletKey(#[from] CryptoError),
}

/// Central container holding all subsystem instances.
pub struct LedgerContainer {
    pub config: NodeConfig,

    // =========================================================================
    // SHARED INFRASTRUCTURE
    // =========================================================================
    pub event_bus: Arc<InMemoryEventBus>,
    pub time_source: Arc<dyn TimeSource>,

    // =========================================================================
    // LEVEL 0-2
    // =========================================================================
    pub storage: Arc<NodeStorage>,
    pub mempool: Arc<MempoolService>,
    pub validator: Arc<TransactionValidator>,
    pub consensus: Arc<ConsensusService>,

    // =========================================================================
    // LEVEL 3-4
    // =========================================================================
    /// Local signer for the system wallet.
    pub wallet: Arc<LocalKeyWallet>,
    pub genesis: Arc<GenesisManager>,
    pub registration: Arc<RegisterCreationService>,
}

impl LedgerContainer {
    /// Build every subsystem on the system clock.
    pub fn new(config: NodeConfig) -> Result<Self, ContainerError> {
        Self::with_time_source(config, Arc::new(SystemTimeSource))
    }

    /// Build every subsystem on the given clock.
    pub fn with_time_source(
        config: NodeConfig,
        time_source: Arc<dyn TimeSource>,
    ) -> Result<Self, ContainerError> {
        config.validate()?;
        info!("Initializing subsystems");

        let event_bus = Arc::new(InMemoryEventBus::new());
        let storage = Arc::new(RegisterStorageService::new(
            InMemoryKVStore::new(),
            config.storage.clone(),
        ));

        let mempool = Arc::new(MempoolService::new(
            config.mempool.clone(),
            Arc::new(StorageSealedIndex::new(storage.clone())),
            time_source.clone(),
        ));

        let validator = Arc::new(TransactionValidator::new(
            config.validator.clone(),
            Arc::new(StorageRegisterView::new(storage.clone())),
            mempool.clone(),
            event_bus.clone(),
        ));
        let consensus = Arc::new(ConsensusService::new(
            config.consensus.clone(),
            storage.clone(),
            mempool.clone(),
            event_bus.clone(),
            time_source.clone(),
        ));

        let wallet = Arc::new(LocalKeyWallet::new());
        let system_key = wallet.generate(
            config.registration.system_wallet.clone(),
            config.registration.genesis_algorithm,
        )?;
        info!(
            wallet = %config.registration.system_wallet,
            algorithm = %config.registration.genesis_algorithm,
            public_key_bytes = system_key.len(),
            "System wallet key generated"
        );

        let genesis = Arc::new(GenesisManager::new(
            config.registration.clone(),
            consensus.clone(),
            wallet.clone(),
            event_bus.clone(),
        ));
        let registration = Arc::new(RegisterCreationService::new(
            config.registration.clone(),
            Arc::new(InMemoryPendingStore::new()),
            genesis.clone(),
            storage.clone(),
            event_bus.clone(),
            time_source.clone(),
        ));

        info!("All subsystems initialized");
        Ok(Self {
            config,
            event_bus,
            time_source,
            storage,
            mempool,
            validator,
            consensus,
            wallet,
            genesis,
            registration,
        })
    }
}
