//! Block: header plus opaque content, sealed into the ledger.
//!
//! Blocks live in the ledger's arena. Each block stores the index of its
//! predecessor and a cached copy of the predecessor's fingerprint; the
//! verifier checks both against the actual arena contents.
//!
//! A block's fingerprint is computed over the *actual* fingerprint of its
//! predecessor, so it commits to every ancestor. It therefore depends on the
//! arena and is computed through [`crate::Ledger`].

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::canonical::canonical_link_bytes;
use crate::crypto::{hash_block, Nonce};
use crate::types::Fingerprint;

/// The current block header version.
pub const BLOCK_VERSION: u8 = 0;

/// Content marker of the genesis block.
pub const GENESIS_CONTENT: &[u8] = b"genesis block";

/// The header of a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Schema version (currently 0).
    pub version: u8,

    /// Position in the ledger (0 = genesis).
    pub sequence_number: u64,

    /// Creation time (Unix milliseconds). Advisory only.
    pub timestamp: i64,

    /// Fingerprint of the preceding block (None for genesis).
    pub previous_fingerprint: Option<Fingerprint>,

    /// Random nonce, unique per block.
    pub nonce: Nonce,
}

/// A block in the ledger arena.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// The block header.
    pub header: BlockHeader,

    /// Arena index of the declared predecessor (None for genesis).
    pub previous: Option<usize>,

    /// The sealed payload bytes.
    pub content: Bytes,
}

impl Block {
    /// Build the genesis block.
    pub fn genesis(timestamp: i64, nonce: Nonce) -> Self {
        Self {
            header: BlockHeader {
                version: BLOCK_VERSION,
                sequence_number: 0,
                timestamp,
                previous_fingerprint: None,
                nonce,
            },
            previous: None,
            content: Bytes::from_static(GENESIS_CONTENT),
        }
    }

    /// Compute this block's fingerprint given its predecessor's fingerprint.
    pub fn fingerprint_with(&self, predecessor: Option<&Fingerprint>) -> Fingerprint {
        hash_block(&canonical_link_bytes(&self.header, predecessor), &self.content)
    }

    /// Get the sequence number.
    pub fn sequence_number(&self) -> u64 {
        self.header.sequence_number
    }

    /// Get the timestamp.
    pub fn timestamp(&self) -> i64 {
        self.header.timestamp
    }

    /// Get the stored fingerprint of the predecessor.
    pub fn previous_fingerprint(&self) -> Option<&Fingerprint> {
        self.header.previous_fingerprint.as_ref()
    }

    /// Get the content bytes.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Check if this is a genesis block.
    pub fn is_genesis(&self) -> bool {
        self.header.sequence_number == 0
            && self.previous.is_none()
            && self.header.previous_fingerprint.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genesis_block() {
        let block = Block::genesis(1000, Nonce::ZERO);
        assert!(block.is_genesis());
        assert_eq!(block.content(), b"genesis block");
        assert_eq!(block.previous_fingerprint(), None);
    }

    #[test]
    fn test_fingerprint_deterministic() {
        let block = Block::genesis(1000, Nonce::from_bytes([3; 12]));
        assert_eq!(block.fingerprint_with(None), block.clone().fingerprint_with(None));
    }

    #[test]
    fn test_fingerprint_covers_every_field() {
        let base = Block::genesis(1000, Nonce::from_bytes([3; 12]));
        let fp = base.fingerprint_with(None);

        let mut b = base.clone();
        b.content = Bytes::from_static(b"genesis blocK");
        assert_ne!(fp, b.fingerprint_with(None));

        let mut b = base.clone();
        b.header.timestamp += 1;
        assert_ne!(fp, b.fingerprint_with(None));

        let mut b = base.clone();
        b.header.sequence_number = 1;
        assert_ne!(fp, b.fingerprint_with(None));

        let mut b = base.clone();
        b.header.nonce = Nonce::from_bytes([4; 12]);
        assert_ne!(fp, b.fingerprint_with(None));

        let predecessor = Fingerprint::from_bytes([0; 32]);
        assert_ne!(fp, base.fingerprint_with(Some(&predecessor)));
    }

    #[test]
    fn test_stored_link_does_not_feed_fingerprint() {
        let base = Block::genesis(1000, Nonce::from_bytes([3; 12]));
        let mut relinked = base.clone();
        relinked.header.previous_fingerprint = Some(Fingerprint::from_bytes([9; 32]));
        assert_eq!(base.fingerprint_with(None), relinked.fingerprint_with(None));
    }
}
