//! Ledger: an ordered, append-only arena of blocks.
//!
//! The ledger is created once with a synthesized genesis block and grows
//! monotonically. `size()` is always the number of blocks and never drops
//! below one.
//!
//! Fingerprints are a fold over the arena: each block hashes the computed
//! fingerprint of its declared predecessor. The top fingerprint is cached
//! while the ledger is only appended to.

use bytes::Bytes;
use serde::Serialize;
use tracing::debug;

use crate::block::{Block, BlockHeader, BLOCK_VERSION};
use crate::crypto::{now_millis, Nonce};
use crate::error::{CoreError, Result};
use crate::types::Fingerprint;
use crate::verify::{self, Verification, VoteOutcome};

/// An in-memory, hash-linked chain of blocks.
#[derive(Debug, Clone, Serialize)]
pub struct Ledger {
    blocks: Vec<Block>,

    /// Fingerprint of the top block, if known to be current.
    #[serde(skip)]
    head: Option<Fingerprint>,
}

impl PartialEq for Ledger {
    fn eq(&self, other: &Self) -> bool {
        self.blocks == other.blocks
    }
}

impl Eq for Ledger {}

impl Ledger {
    /// Create a new ledger with a freshly synthesized genesis block.
    pub fn new() -> Result<Self> {
        Ok(Self::with_genesis(now_millis(), Nonce::generate()?))
    }

    /// Create a new ledger with a genesis block built from the given parts.
    pub fn with_genesis(timestamp: i64, nonce: Nonce) -> Self {
        let genesis = Block::genesis(timestamp, nonce);
        let head = genesis.fingerprint_with(None);
        Self {
            blocks: vec![genesis],
            head: Some(head),
        }
    }

    /// Rebuild a ledger from a snapshot of blocks, e.g. one supplied by a peer.
    ///
    /// The blocks are taken as-is; run [`Ledger::verify`] before trusting them.
    pub fn from_blocks(blocks: Vec<Block>) -> Result<Self> {
        if blocks.is_empty() {
            return Err(CoreError::EmptyLedger);
        }
        Ok(Self { blocks, head: None })
    }

    /// Number of blocks, genesis included.
    pub fn size(&self) -> usize {
        self.blocks.len()
    }

    /// The sequence number the next appended block will carry.
    pub fn next_block_id(&self) -> u64 {
        self.blocks.len() as u64
    }

    /// Get a block by arena index.
    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    /// Mutable access to a sealed block.
    ///
    /// Sealed blocks are immutable in normal operation; this exists for
    /// fault injection in tests and tooling that simulates tampering.
    pub fn block_mut(&mut self, index: usize) -> Option<&mut Block> {
        self.head = None;
        self.blocks.get_mut(index)
    }

    /// The genesis block.
    pub fn genesis(&self) -> &Block {
        &self.blocks[0]
    }

    /// The block on top of the chain.
    pub fn top(&self) -> &Block {
        &self.blocks[self.blocks.len() - 1]
    }

    /// All blocks in chain order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Computed fingerprint of every block, in arena order.
    ///
    /// A declared predecessor that does not precede the block is ignored, so
    /// a corrupt arena still yields a fingerprint per block.
    pub fn fingerprints(&self) -> Vec<Fingerprint> {
        let mut computed: Vec<Fingerprint> = Vec::with_capacity(self.blocks.len());
        for (index, block) in self.blocks.iter().enumerate() {
            let predecessor = block
                .previous
                .filter(|&p| p < index)
                .map(|p| computed[p]);
            computed.push(block.fingerprint_with(predecessor.as_ref()));
        }
        computed
    }

    /// Fingerprint of the block at `index`.
    pub fn fingerprint_at(&self, index: usize) -> Option<Fingerprint> {
        if index >= self.blocks.len() {
            return None;
        }
        self.fingerprints().get(index).copied()
    }

    /// Fingerprint of the top block.
    pub fn top_fingerprint(&self) -> Fingerprint {
        match self.head {
            Some(head) => head,
            None => self.fingerprints()[self.blocks.len() - 1],
        }
    }

    /// Copy of the first `len` blocks, or None if `len` is zero or exceeds
    /// the ledger size.
    pub fn prefix(&self, len: usize) -> Option<Ledger> {
        if len == 0 || len > self.blocks.len() {
            return None;
        }
        Some(Self {
            blocks: self.blocks[..len].to_vec(),
            head: None,
        })
    }

    /// Append a new block on top of the chain, stamped with the current time.
    ///
    /// Returns the fingerprint of the new block.
    pub fn add_block(&mut self, content: impl Into<Bytes>, nonce: Nonce) -> Fingerprint {
        self.add_block_at(content, nonce, now_millis())
    }

    /// Append a new block with an explicit timestamp.
    pub fn add_block_at(
        &mut self,
        content: impl Into<Bytes>,
        nonce: Nonce,
        timestamp: i64,
    ) -> Fingerprint {
        let top_index = self.blocks.len() - 1;
        let top_fingerprint = self.top_fingerprint();
        let header = BlockHeader {
            version: BLOCK_VERSION,
            sequence_number: self.next_block_id(),
            timestamp,
            previous_fingerprint: Some(top_fingerprint),
            nonce,
        };
        let block = Block {
            header,
            previous: Some(top_index),
            content: content.into(),
        };
        let fingerprint = block.fingerprint_with(Some(&top_fingerprint));

        debug!(
            sequence_number = block.header.sequence_number,
            content_len = block.content.len(),
            fingerprint = %fingerprint,
            "block appended"
        );

        self.blocks.push(block);
        self.head = Some(fingerprint);
        fingerprint
    }

    /// Verify every link in this ledger.
    pub fn verify(&self) -> Verification {
        verify::verify(self)
    }

    /// Vote on whether `other` is valid and identical to this ledger.
    pub fn vote(&self, other: &Ledger) -> bool {
        verify::vote(self, other)
    }

    /// Structured form of [`Ledger::vote`].
    pub fn ballot(&self, other: &Ledger) -> VoteOutcome {
        verify::ballot(self, other)
    }
}
