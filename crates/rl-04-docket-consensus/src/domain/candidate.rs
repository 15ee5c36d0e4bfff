//! # Docket Candidate State Machine
//!
//! Each docket state is a distinct type. Transitions consume `self`, so a
//! sealed candidate cannot be re-proposed and an unsealed one cannot reach
//! storage.
//!
//! ```text
//! [Init] ──propose──→ [Proposed] ──accept──→ [Accepted] ──seal──→ [Sealed]
//! ```
//!
//! `Sealed` is terminal: the only thing left to do with it is
//! `into_parts()` for the commit.

use shared_types::{
    Digest, Docket, DocketState, RegisterId, Timestamp, Transaction, TransactionId,
    GENESIS_PREVIOUS_HASH,
};
use std::collections::HashSet;
use std::marker::PhantomData;

// =============================================================================
// STATE MARKERS
// =============================================================================

#[derive(Debug, Clone, Copy)]
pub struct Init;

#[derive(Debug, Clone, Copy)]
pub struct Proposed;

#[derive(Debug, Clone, Copy)]
pub struct Accepted;

#[derive(Debug, Clone, Copy)]
pub struct Sealed;

/// A docket on its way to storage.
#[derive(Debug)]
pub struct DocketCandidate<S> {
    register_id: RegisterId,
    height: u64,
    previous_hash: Digest,
    transactions: Vec<Transaction>,
    timestamp: Timestamp,
    hash: Digest,
    _state: PhantomData<S>,
}

impl<S> DocketCandidate<S> {
    pub fn register_id(&self) -> RegisterId {
        self.register_id
    }

    pub fn height(&self) -> u64 {
        self.height
    }

    pub fn previous_hash(&self) -> &Digest {
        &self.previous_hash
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn transaction_ids(&self) -> Vec<TransactionId> {
        self.transactions.iter().map(|tx| tx.transaction_id).collect()
    }

    fn transition<T>(self) -> DocketCandidate<T> {
        DocketCandidate {
            register_id: self.register_id,
            height: self.height,
            previous_hash: self.previous_hash,
            transactions: self.transactions,
            timestamp: self.timestamp,
            hash: self.hash,
            _state: PhantomData,
        }
    }
}

impl DocketCandidate<Init> {
    /// The candidate following `parent`.
    pub fn after(parent: &Docket) -> Self {
        Self::at(parent.register_id, parent.height + 1, parent.hash)
    }

    /// Height 0, linked to the genesis sentinel.
    pub fn genesis(register_id: RegisterId) -> Self {
        Self::at(register_id, 0, GENESIS_PREVIOUS_HASH)
    }

    fn at(register_id: RegisterId, height: u64, previous_hash: Digest) -> Self {
        Self {
            register_id,
            height,
            previous_hash,
            transactions: Vec::new(),
            timestamp: 0,
            hash: Digest::ZERO,
            _state: PhantomData,
        }
    }

    /// Fill the candidate with an ordered batch.
    #[must_use = "the proposed candidate must be accepted or dropped"]
    pub fn propose(
        mut self,
        transactions: Vec<Transaction>,
        timestamp: Timestamp,
    ) -> DocketCandidate<Proposed> {
        self.transactions = transactions;
        self.timestamp = timestamp;
        self.transition()
    }
}

impl DocketCandidate<Proposed> {
    /// Structural checks on the batch.
    ///
    /// # Errors
    /// A description of the first problem found: empty batch, a transaction
    /// from another register, or a repeated id.
    pub fn accept(self) -> Result<DocketCandidate<Accepted>, String> {
        if self.transactions.is_empty() {
            return Err(format!("docket {} has no transactions", self.height));
        }
        let mut seen = HashSet::with_capacity(self.transactions.len());
        for tx in &self.transactions {
            if tx.register_id != self.register_id {
                return Err(format!(
                    "transaction {} belongs to register {}",
                    tx.transaction_id, tx.register_id
                ));
            }
            if !seen.insert(tx.transaction_id) {
                return Err(format!("transaction {} listed twice", tx.transaction_id));
            }
        }
        Ok(self.transition())
    }
}

impl DocketCandidate<Accepted> {
    /// Compute the hash over header fields and ordered transaction ids.
    #[must_use = "the sealed candidate must be committed"]
    pub fn seal(mut self) -> DocketCandidate<Sealed> {
        self.hash = Docket::compute_hash(
            &self.register_id,
            self.height,
            &self.previous_hash,
            self.timestamp,
            &self.transaction_ids(),
        );
        self.transition()
    }
}

impl DocketCandidate<Sealed> {
    pub fn hash(&self) -> &Digest {
        &self.hash
    }

    /// The sealed docket and its transactions, in docket order.
    pub fn into_parts(self) -> (Docket, Vec<Transaction>) {
        let docket = Docket {
            register_id: self.register_id,
            height: self.height,
            hash: self.hash,
            previous_hash: self.previous_hash,
            transaction_ids: self.transaction_ids(),
            state: DocketState::Sealed,
            timestamp: self.timestamp,
        };
        (docket, self.transactions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{Payload, TransactionMetadata, TransactionType};

    fn tx(register_id: RegisterId, n: u8) -> Transaction {
        Transaction::unsigned(
            register_id,
            "alice",
            vec![Payload {
                recipient_wallet: "bob".into(),
                data: vec![n],
            }],
            None,
            n as u64,
            TransactionMetadata::of_type(TransactionType::Data),
        )
    }

    #[test]
    fn test_sealed_docket_hash_matches_contents() {
        let register_id = RegisterId::generate();
        let (docket, txs) = DocketCandidate::genesis(register_id)
            .propose(vec![tx(register_id, 1)], 10)
            .accept()
            .unwrap()
            .seal()
            .into_parts();

        assert!(docket.is_genesis());
        assert_eq!(docket.state, DocketState::Sealed);
        assert_eq!(docket.recompute_hash(), docket.hash);
        assert_eq!(docket.transaction_ids, vec![txs[0].transaction_id]);
    }

    #[test]
    fn test_successor_links_to_parent() {
        let register_id = RegisterId::generate();
        let (parent, _) = DocketCandidate::genesis(register_id)
            .propose(vec![tx(register_id, 1)], 10)
            .accept()
            .unwrap()
            .seal()
            .into_parts();

        let child = DocketCandidate::after(&parent);
        assert_eq!(child.height(), 1);
        assert_eq!(child.previous_hash(), &parent.hash);
    }

    #[test]
    fn test_accept_rejects_bad_batches() {
        let register_id = RegisterId::generate();
        let t = tx(register_id, 1);

        assert!(DocketCandidate::genesis(register_id)
            .propose(vec![], 0)
            .accept()
            .is_err());
        assert!(DocketCandidate::genesis(register_id)
            .propose(vec![t.clone(), t], 0)
            .accept()
            .is_err());
        assert!(DocketCandidate::genesis(register_id)
            .propose(vec![tx(RegisterId::generate(), 2)], 0)
            .accept()
            .is_err());
    }
}
