use hl_crypto::ContentHasher;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::LedgerResult;

/// One ledger entry: an opaque payload linked to its predecessor by digest.
///
/// A block is built with [`Block::new`] and handed to
/// [`Ledger::append`](crate::Ledger::append), which fills in `height`,
/// `timestamp` and `previous_hash` and seals `hash`. The persisted copy is
/// the source of truth from then on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Position in the chain; genesis is 0.
    pub height: u64,
    /// Unix seconds at append time.
    pub timestamp: i64,
    /// Opaque payload, never interpreted by the ledger.
    pub body: String,
    /// Hex digest of the block at `height - 1`; empty for genesis.
    pub previous_hash: String,
    /// Hex digest of this block's canonical content.
    pub hash: String,
}

impl Block {
    /// A fresh, unsealed block carrying `body`.
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            height: 0,
            timestamp: 0,
            body: body.into(),
            previous_hash: String::new(),
            hash: String::new(),
        }
    }

    /// Digest of the block's canonical content.
    ///
    /// Fields are hashed in the fixed order `height, timestamp, body,
    /// previous_hash, hash`, with `hash` always taken as empty. The stored
    /// `hash` field is never read or modified, so repeated calls on an
    /// unchanged block return the same digest.
    pub fn calculate_hash(&self) -> String {
        let height = self.height.to_le_bytes();
        let timestamp = self.timestamp.to_le_bytes();
        ContentHasher::BLOCK.hash_fields(&[
            &height,
            &timestamp,
            self.body.as_bytes(),
            self.previous_hash.as_bytes(),
            b"",
        ])
    }

    /// Returns `true` if the stored `hash` matches the recomputed digest.
    ///
    /// Logs the height and both digests on mismatch.
    pub fn validate_hash(&self) -> bool {
        let computed = self.calculate_hash();
        if computed == self.hash {
            return true;
        }
        warn!(
            height = self.height,
            stored = %self.hash,
            computed = %computed,
            "block hash mismatch"
        );
        false
    }

    /// Set `hash` to the digest of the current content.
    pub fn seal(&mut self) {
        self.hash = self.calculate_hash();
    }

    /// Returns `true` for a height-0 block with no predecessor link.
    pub fn is_genesis(&self) -> bool {
        self.height == 0 && self.previous_hash.is_empty()
    }

    /// Encode as the JSON record stored under the block's height.
    pub fn to_json(&self) -> LedgerResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode a stored JSON record.
    pub fn from_json(bytes: &[u8]) -> LedgerResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sealed(height: u64, body: &str, previous_hash: &str) -> Block {
        let mut block = Block {
            height,
            timestamp: 1_700_000_000,
            body: body.into(),
            previous_hash: previous_hash.into(),
            hash: String::new(),
        };
        block.seal();
        block
    }

    #[test]
    fn new_block_is_unsealed() {
        let block = Block::new("payload");
        assert_eq!(block.height, 0);
        assert_eq!(block.timestamp, 0);
        assert!(block.previous_hash.is_empty());
        assert!(block.hash.is_empty());
        assert!(block.is_genesis());
    }

    #[test]
    fn calculate_hash_ignores_stored_hash() {
        let mut block = sealed(3, "data", "abc");
        let digest = block.calculate_hash();
        block.hash = "garbage".into();
        assert_eq!(block.calculate_hash(), digest);
    }

    #[test]
    fn validate_hash_leaves_hash_untouched() {
        let block = sealed(1, "data", "abc");
        let before = block.hash.clone();
        assert!(block.validate_hash());
        assert_eq!(block.hash, before);
        assert_eq!(block.calculate_hash(), before);
    }

    #[test]
    fn every_field_is_covered_by_the_hash() {
        let base = sealed(5, "body", "prev");

        let mut changed = base.clone();
        changed.height = 6;
        assert!(!changed.validate_hash());

        let mut changed = base.clone();
        changed.timestamp += 1;
        assert!(!changed.validate_hash());

        let mut changed = base.clone();
        changed.body.push('!');
        assert!(!changed.validate_hash());

        let mut changed = base;
        changed.previous_hash = "other".into();
        assert!(!changed.validate_hash());
    }

    #[test]
    fn json_uses_camel_case_fields() {
        let block = sealed(2, "x", "y");
        let json: serde_json::Value = serde_json::from_slice(&block.to_json().unwrap()).unwrap();
        assert_eq!(json["previousHash"], "y");
        assert_eq!(json["height"], 2);
        assert_eq!(Block::from_json(&block.to_json().unwrap()).unwrap(), block);
    }

    #[test]
    fn from_json_rejects_untyped_records() {
        assert!(Block::from_json(br#"{"height":"two"}"#).is_err());
        assert!(Block::from_json(b"not json").is_err());
    }

    proptest! {
        #[test]
        fn hash_is_reproducible(
            height in any::<u64>(),
            timestamp in any::<i64>(),
            body in ".*",
            previous_hash in "[0-9a-f]{0,64}",
        ) {
            let mut block = Block { height, timestamp, body, previous_hash, hash: String::new() };
            let first = block.calculate_hash();
            prop_assert_eq!(&first, &block.calculate_hash());
            block.seal();
            prop_assert!(block.validate_hash());
            prop_assert_eq!(block.hash, first);
        }
    }
}
