//! # Stateless Checks
//!
//! Pure functions over a single transaction. They touch no shared state, so
//! batches run them in parallel.
//!
//! Order matters: the id is checked before any signature because signatures
//! cover the id digest, and an id that does not match the content makes every
//! signature meaningless.

use super::entities::ValidatorConfig;
use super::errors::{HashField, RejectionReason};
use shared_crypto::{verify_signature, DigestMode};
use shared_types::Transaction;

/// Structural sanity: things no digest can vouch for.
pub fn check_structure(tx: &Transaction, config: &ValidatorConfig) -> Result<(), RejectionReason> {
    if tx.sender_wallet.is_empty() {
        return Err(RejectionReason::Malformed("empty senderWallet".into()));
    }
    if tx.payloads.len() > config.max_payloads {
        return Err(RejectionReason::Malformed(format!(
            "{} payloads exceeds limit of {}",
            tx.payloads.len(),
            config.max_payloads
        )));
    }
    Ok(())
}

/// (a) payload hash over the exact transmitted bytes, then the id digest.
pub fn check_hashes(tx: &Transaction) -> Result<(), RejectionReason> {
    if Transaction::compute_payload_hash(&tx.payloads) != tx.payload_hash {
        return Err(RejectionReason::HashMismatch {
            field: HashField::PayloadHash,
        });
    }
    if tx.compute_id() != tx.transaction_id {
        return Err(RejectionReason::HashMismatch {
            field: HashField::TransactionId,
        });
    }
    Ok(())
}

/// (b) every signature against its declared key and algorithm over the
/// pre-hashed id digest.
pub fn check_signatures(tx: &Transaction, config: &ValidatorConfig) -> Result<(), RejectionReason> {
    if tx.signatures.len() < config.min_signatures.max(1) {
        return Err(RejectionReason::MissingSignature);
    }
    for (index, signature) in tx.signatures.iter().enumerate() {
        verify_signature(
            signature.algorithm,
            &signature.public_key,
            tx.signing_target(),
            DigestMode::PreHashed,
            &signature.signature_value,
        )
        .map_err(|e| RejectionReason::InvalidSignature {
            index,
            detail: e.to_string(),
        })?;
    }
    Ok(())
}

/// Everything that needs no shared state.
pub fn check_stateless(tx: &Transaction, config: &ValidatorConfig) -> Result<(), RejectionReason> {
    check_structure(tx, config)?;
    check_hashes(tx)?;
    check_signatures(tx, config)
}
