//! Error types for key handling.

use thiserror::Error;

/// Errors that can occur while generating keys or handling messages.
#[derive(Debug, Error)]
pub enum KeysError {
    /// The operating system's randomness source failed.
    #[error("randomness source failed: {0}")]
    RandomnessFailure(String),

    /// Encryption error.
    #[error("encryption error: {0}")]
    Encryption(String),

    /// Decryption error, including authentication failure.
    #[error("decryption error: {0}")]
    Decryption(String),

    /// A public key could not be parsed.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type for key operations.
pub type Result<T> = std::result::Result<T, KeysError>;
