//! # Chain Verification
//!
//! Pure checks over a docket sequence. A break is reported with the height
//! where it was found; nothing here repairs anything.

use shared_types::{Digest, Docket};

/// First break found in a docket sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainBreak {
    pub height: u64,
    pub detail: String,
}

impl ChainBreak {
    fn at(height: u64, detail: impl Into<String>) -> Self {
        Self {
            height,
            detail: detail.into(),
        }
    }
}

/// Links only: for every `i > 0`, `d[i].previous_hash == d[i-1].hash`.
pub fn verify_links(dockets: &[Docket]) -> Result<(), ChainBreak> {
    for pair in dockets.windows(2) {
        let (parent, child) = (&pair[0], &pair[1]);
        if child.previous_hash != parent.hash {
            return Err(ChainBreak::at(
                child.height,
                format!(
                    "previousHash {} does not match hash {} of height {}",
                    child.previous_hash, parent.hash, parent.height
                ),
            ));
        }
    }
    Ok(())
}

/// Incremental check of a stored chain fed in height order from 0: genesis
/// sentinel, contiguous heights, each docket's own hash, then the link to the
/// previous docket. Only the last hash is carried between calls, so a chain
/// can be checked one page at a time.
#[derive(Debug, Default)]
pub struct ChainCursor {
    expected_height: u64,
    parent_hash: Option<Digest>,
}

impl ChainCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dockets accepted so far.
    pub fn verified(&self) -> u64 {
        self.expected_height
    }

    pub fn push(&mut self, docket: &Docket) -> Result<(), ChainBreak> {
        if self.parent_hash.is_none() && !docket.is_genesis() {
            return Err(ChainBreak::at(docket.height, "chain does not start at genesis"));
        }
        if docket.height != self.expected_height {
            return Err(ChainBreak::at(
                self.expected_height,
                format!("missing docket; found height {} instead", docket.height),
            ));
        }
        let recomputed = docket.recompute_hash();
        if recomputed != docket.hash {
            return Err(ChainBreak::at(
                docket.height,
                format!("stored hash {} but contents hash to {}", docket.hash, recomputed),
            ));
        }
        if let Some(parent_hash) = self.parent_hash {
            if docket.previous_hash != parent_hash {
                return Err(ChainBreak::at(
                    docket.height,
                    format!(
                        "previousHash {} does not match parent hash {}",
                        docket.previous_hash, parent_hash
                    ),
                ));
            }
        }
        self.parent_hash = Some(docket.hash);
        self.expected_height += 1;
        Ok(())
    }

    /// Confirm the chain ends at the register's recorded height.
    pub fn finish(&self, register_height: u64) -> Result<(), ChainBreak> {
        if self.expected_height != register_height + 1 {
            return Err(ChainBreak::at(
                self.expected_height,
                format!(
                    "register height {} but {} dockets stored",
                    register_height, self.expected_height
                ),
            ));
        }
        Ok(())
    }
}

/// Full check of a stored chain read from height 0.
pub fn verify_stored(dockets: &[Docket]) -> Result<(), ChainBreak> {
    let mut cursor = ChainCursor::new();
    dockets.iter().try_for_each(|docket| cursor.push(docket))
}
