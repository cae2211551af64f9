//! # keyledger
//!
//! A single authoritative datacenter that keeps a registry of user public
//! keys and records every change to it in an append-only, hash-linked ledger.
//!
//! ## Overview
//!
//! - **Registry**: user id to current X25519 public key. Registration and
//!   rotation are the only mutations; rotation is authorized by a
//!   Diffie-Hellman shared-secret proof against the user's current key.
//! - **Audit trail**: each mutation writes an [`AuditEvent`] through a
//!   fixed-capacity record buffer. Full buffers are sealed into ledger blocks.
//! - **Verification**: the ledger can verify its own links and vote on
//!   whether a peer's snapshot is identical and valid.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use keyledger::{Client, Datacenter, DatacenterConfig};
//!
//! fn example() -> keyledger::Result<()> {
//!     let mut datacenter = Datacenter::new(DatacenterConfig::default())?;
//!
//!     let mut alice = Client::new("alice", 101)?;
//!     datacenter.register_new_user(101, alice.public_key())?;
//!
//!     // Prove ownership of the current key, then rotate.
//!     let proof = alice.shared_secret_with(&datacenter.public_key());
//!     alice.random_initialization()?;
//!     datacenter.rotate_user_key(101, &proof, alice.public_key())?;
//!
//!     datacenter.force_write()?;
//!     assert!(datacenter.verify().is_valid());
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `keyledger::core` - Blocks, ledger, record buffer and verification
//! - `keyledger::keys` - Key agreement, proofs and encrypted messages

pub mod config;
pub mod datacenter;
pub mod error;
pub mod event;
pub mod registry;
pub mod shared;

pub use keyledger_core as core;
pub use keyledger_keys as keys;

pub use config::DatacenterConfig;
pub use datacenter::Datacenter;
pub use error::{DatacenterError, Result};
pub use event::{decode_events, AuditEvent, AuditRecord};
pub use registry::{KeyRegistry, KeyStatus};
pub use shared::SharedDatacenter;

pub use keyledger_core::{
    verify, vote, Block, Fingerprint, Ledger, RecordBuffer, Verification, VoteOutcome,
    GENESIS_CONTENT, RECORD_CAPACITY,
};
pub use keyledger_keys::{Client, EncryptedMessage, SharedKey, X25519PublicKey};
