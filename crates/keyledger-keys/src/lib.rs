//! # keyledger keys
//!
//! Key material for keyledger participants.
//!
//! - [`X25519PublicKey`] - The opaque, comparable identity the datacenter
//!   registers per user
//! - [`X25519StaticSecret`] / [`SharedKey`] - Diffie-Hellman agreement; the
//!   shared key doubles as the proof a user presents to rotate its key
//! - [`EncryptedMessage`] - Text encrypted to a public key with an ephemeral
//!   X25519 key and ChaCha20-Poly1305
//! - [`Client`] - A named participant bundling id and secret

pub mod client;
pub mod crypto;
pub mod envelope;
pub mod error;

pub use client::Client;
pub use crypto::{EncryptionKey, EncryptionNonce, SharedKey, X25519PublicKey, X25519StaticSecret};
pub use envelope::{EncryptedMessage, EncryptionFormat};
pub use error::{KeysError, Result};
