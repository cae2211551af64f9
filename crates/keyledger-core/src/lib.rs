//! # keyledger core
//!
//! Pure primitives for the keyledger datacenter: blocks, fingerprints, the
//! ledger arena, verification and the record buffer.
//!
//! This crate contains no I/O, no storage, no networking. It is pure computation
//! over hash-linked data structures.
//!
//! ## Key Types
//!
//! - [`Ledger`] - Append-only arena of blocks, genesis at index 0
//! - [`Block`] - Header plus opaque content, linked to its predecessor by index
//! - [`Fingerprint`] - 256-bit Blake3 digest binding a block to its ancestors
//! - [`RecordBuffer`] - Fixed-capacity accumulator that feeds sealed blocks
//!
//! ## Verification
//!
//! [`verify`] walks a ledger and reports the first broken link. [`vote`]
//! compares two ledger snapshots: equal size, equal top fingerprint, and the
//! peer chain verifies on its own.

pub mod block;
pub mod buffer;
pub mod canonical;
pub mod crypto;
pub mod error;
pub mod ledger;
pub mod types;
pub mod verify;

pub use block::{Block, BlockHeader, GENESIS_CONTENT};
pub use buffer::{RecordBuffer, RECORD_CAPACITY};
pub use canonical::{canonical_header_bytes, canonical_link_bytes};
pub use crypto::{now_millis, Nonce, NONCE_LEN};
pub use error::{CoreError, Result};
pub use ledger::Ledger;
pub use types::Fingerprint;
pub use verify::{ballot, verify, vote, Verification, VoteOutcome};
