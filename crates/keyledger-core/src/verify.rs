//! Ledger verification and two-chain voting.
//!
//! Verification cannot vouch for the top block on its own: nothing later in
//! the chain commits to its fingerprint. That block is only established by
//! agreement with peers, which is what [`vote`] checks.

use tracing::warn;

use crate::ledger::Ledger;
use crate::types::Fingerprint;

/// Outcome of walking a ledger's links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    /// Every block links to its actual predecessor.
    Valid,

    /// The chain is broken.
    Broken {
        /// Index of the first block whose link does not hold.
        block: usize,
        /// Declared predecessor of that block: the last block still
        /// consistent with its own predecessor.
        predecessor: Option<usize>,
    },
}

impl Verification {
    /// Check if the ledger verified.
    pub fn is_valid(&self) -> bool {
        matches!(self, Verification::Valid)
    }

    /// The offending block reported by a failed verification.
    ///
    /// This is the predecessor of the first inconsistent block, not
    /// necessarily the block that was tampered with.
    pub fn offending_block(&self) -> Option<usize> {
        match self {
            Verification::Valid => None,
            Verification::Broken { predecessor, .. } => *predecessor,
        }
    }
}

/// Verify a ledger.
///
/// Walks blocks 1..size. For each block checks that its declared predecessor
/// is the block at the prior index and that its stored previous fingerprint
/// equals the recomputed fingerprint of that predecessor. Stops at the first
/// failure.
pub fn verify(ledger: &Ledger) -> Verification {
    let blocks = ledger.blocks();
    let computed = ledger.fingerprints();

    for index in 1..blocks.len() {
        let block = &blocks[index];

        let linked = block.previous == Some(index - 1);
        let consistent = linked
            && block.header.previous_fingerprint == Some(computed[index - 1]);

        if !consistent {
            warn!(
                block = index,
                predecessor = ?block.previous,
                linked,
                "ledger link broken"
            );
            return Verification::Broken {
                block: index,
                predecessor: block.previous,
            };
        }
    }

    Verification::Valid
}

/// Result of comparing a local ledger with a peer's snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteOutcome {
    /// Same size, same top fingerprint, and the peer chain verifies.
    Agreed,
    /// The chains have different lengths.
    SizeMismatch { local: usize, other: usize },
    /// The chains have the same length but different tops.
    TopMismatch {
        local: Fingerprint,
        other: Fingerprint,
    },
    /// The peer chain matches at the top but fails verification.
    PeerInvalid(Verification),
}

impl VoteOutcome {
    /// Check if the vote was in favour.
    pub fn is_agreed(&self) -> bool {
        matches!(self, VoteOutcome::Agreed)
    }
}

/// Compare two ledgers and report why they disagree, if they do.
///
/// The top fingerprint transitively covers every ancestor, so a tampered
/// interior block shows up as a top mismatch. The explicit verification of
/// `other` catches a peer whose top matches but whose stored links do not.
pub fn ballot(local: &Ledger, other: &Ledger) -> VoteOutcome {
    if local.size() != other.size() {
        return VoteOutcome::SizeMismatch {
            local: local.size(),
            other: other.size(),
        };
    }

    let local_top = local.top_fingerprint();
    let other_top = other.top_fingerprint();
    if local_top != other_top {
        return VoteOutcome::TopMismatch {
            local: local_top,
            other: other_top,
        };
    }

    match verify(other) {
        Verification::Valid => VoteOutcome::Agreed,
        broken => VoteOutcome::PeerInvalid(broken),
    }
}

/// Vote on whether `other` is valid and equal to `local`.
pub fn vote(local: &Ledger, other: &Ledger) -> bool {
    ballot(local, other).is_agreed()
}
