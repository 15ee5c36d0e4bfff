//! In-process wallet holding keys in memory. Stands in for the wallet
//! service in tests and single-node deployments.

use crate::domain::WalletError;
use crate::ports::{SignRequest, WalletSignature, WalletSigner};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_crypto::{CryptoError, SigningKeyPair};
use shared_types::SignatureAlgorithm;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Default)]
pub struct LocalKeyWallet {
    keys: RwLock<HashMap<String, Arc<SigningKeyPair>>>,
}

impl LocalKeyWallet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a key for `wallet`, replacing any existing one. Returns the
    /// public key bytes.
    pub fn generate(
        &self,
        wallet: impl Into<String>,
        algorithm: SignatureAlgorithm,
    ) -> Result<Vec<u8>, CryptoError> {
        let key = SigningKeyPair::generate(algorithm)?;
        let public_key = key.public_key_bytes()?;
        self.keys.write().insert(wallet.into(), Arc::new(key));
        Ok(public_key)
    }

    pub fn public_key(&self, wallet: &str) -> Option<Vec<u8>> {
        self.keys
            .read()
            .get(wallet)
            .and_then(|key| key.public_key_bytes().ok())
    }

    pub fn contains(&self, wallet: &str) -> bool {
        self.keys.read().contains_key(wallet)
    }
}

#[async_trait]
impl WalletSigner for LocalKeyWallet {
    async fn sign(&self, request: SignRequest) -> Result<WalletSignature, WalletError> {
        let key = self
            .keys
            .read()
            .get(&request.wallet)
            .cloned()
            .ok_or_else(|| WalletError::Rejected(format!("unknown wallet {}", request.wallet)))?;
        if key.algorithm() != request.algorithm {
            return Err(WalletError::Rejected(format!(
                "wallet {} holds a {} key, {} requested",
                request.wallet,
                key.algorithm(),
                request.algorithm
            )));
        }

        let signature = key
            .sign(&request.data, request.mode)
            .map_err(|e| WalletError::Rejected(e.to_string()))?;
        let public_key = key
            .public_key_bytes()
            .map_err(|e| WalletError::Rejected(e.to_string()))?;
        debug!(
            wallet = %request.wallet,
            algorithm = %request.algorithm,
            is_pre_hashed = request.is_pre_hashed(),
            "Signed with local key"
        );
        Ok(WalletSignature {
            public_key,
            signature,
            algorithm: request.algorithm,
        })
    }
}
