//! The genesis control record: the payload of a register's first
//! transaction, naming the owners whose attestations were verified.

use super::attestation::AttestationKey;
use serde::{Deserialize, Serialize};
use shared_types::{
    Payload, RegisterId, SignatureAlgorithm, TenantId, Timestamp, Transaction,
    TransactionMetadata, TransactionType,
};

/// An owner whose attestation signature verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedOwner {
    pub role: String,
    pub subject: String,
    #[serde(with = "hex")]
    pub public_key: Vec<u8>,
    pub algorithm: SignatureAlgorithm,
    #[serde(with = "hex")]
    pub attestation_hash: Vec<u8>,
}

impl VerifiedOwner {
    pub fn key(&self) -> AttestationKey {
        AttestationKey::new(self.role.clone(), self.subject.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenesisControlRecord {
    pub register_id: RegisterId,
    pub name: String,
    pub description: String,
    pub tenant_id: TenantId,
    pub owners: Vec<VerifiedOwner>,
    pub created_at: Timestamp,
}

impl GenesisControlRecord {
    /// The unsigned genesis transaction carrying this record.
    pub fn into_transaction(
        self,
        system_wallet: &str,
    ) -> Result<Transaction, serde_json::Error> {
        let data = serde_json::to_vec(&self)?;
        Ok(Transaction::unsigned(
            self.register_id,
            system_wallet,
            vec![Payload {
                recipient_wallet: system_wallet.to_string(),
                data,
            }],
            None,
            self.created_at,
            TransactionMetadata::of_type(TransactionType::Control),
        ))
    }

    /// Parse the record back out of a genesis transaction.
    pub fn from_transaction(tx: &Transaction) -> Result<Self, serde_json::Error> {
        let data = tx.payloads.first().map(|p| p.data.as_slice()).unwrap_or_default();
        serde_json::from_slice(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genesis_transaction_shape() {
        let record = GenesisControlRecord {
            register_id: RegisterId::generate(),
            name: "R1".into(),
            description: String::new(),
            tenant_id: TenantId::from("tenant"),
            owners: vec![VerifiedOwner {
                role: "admin".into(),
                subject: "alice".into(),
                public_key: vec![1; 32],
                algorithm: SignatureAlgorithm::Ed25519,
                attestation_hash: vec![2; 32],
            }],
            created_at: 42,
        };

        let tx = record.clone().into_transaction("system").unwrap();

        assert_eq!(tx.prev_tx_id, None);
        assert_eq!(tx.docket_height, 0);
        assert_eq!(tx.metadata.tx_type, TransactionType::Control);
        assert_eq!(tx.compute_id(), tx.transaction_id);
        assert_eq!(GenesisControlRecord::from_transaction(&tx).unwrap(), record);
    }
}
