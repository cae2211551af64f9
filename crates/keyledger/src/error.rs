//! Error types for the datacenter.

use keyledger_core::CoreError;
use keyledger_keys::{KeysError, X25519PublicKey};
use thiserror::Error;

/// Errors that can occur during datacenter operations.
///
/// All of them are recoverable; the datacenter never retries on its own.
#[derive(Debug, Error)]
pub enum DatacenterError {
    /// The user id is already registered.
    #[error("user id already exists: {0}")]
    DuplicateIdentifier(u64),

    /// The user id is not registered.
    #[error("user id not found: {0}")]
    UnknownIdentifier(u64),

    /// The rotation proof does not match the datacenter's shared secret.
    #[error("shared key does not match for user {0}")]
    ProofMismatch(u64),

    /// Nothing to write.
    #[error("no data to write")]
    EmptyPayload,

    /// Nonce or key generation failed.
    #[error("randomness source failed: {0}")]
    RandomnessFailure(String),

    /// The public key is active or was revoked.
    #[error("public key is already used: {0}")]
    KeyInUse(X25519PublicKey),

    /// Rotation to the key that is already registered.
    #[error("old and new keys are the same for user {0}")]
    KeyUnchanged(u64),

    /// An audit event could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A thread panicked while holding the datacenter lock.
    #[error("datacenter lock poisoned")]
    LockPoisoned,

    /// Core error.
    #[error("core error: {0}")]
    Core(CoreError),

    /// Key error.
    #[error("key error: {0}")]
    Keys(KeysError),
}

impl From<CoreError> for DatacenterError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::RandomnessFailure(reason) => DatacenterError::RandomnessFailure(reason),
            other => DatacenterError::Core(other),
        }
    }
}

impl From<KeysError> for DatacenterError {
    fn from(err: KeysError) -> Self {
        match err {
            KeysError::RandomnessFailure(reason) => DatacenterError::RandomnessFailure(reason),
            other => DatacenterError::Keys(other),
        }
    }
}

impl From<serde_json::Error> for DatacenterError {
    fn from(err: serde_json::Error) -> Self {
        DatacenterError::Serialization(err.to_string())
    }
}

/// Result type for datacenter operations.
pub type Result<T> = std::result::Result<T, DatacenterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_randomness_failures_are_flattened() {
        let err: DatacenterError = CoreError::RandomnessFailure("os".into()).into();
        assert!(matches!(err, DatacenterError::RandomnessFailure(ref r) if r == "os"));

        let err: DatacenterError = KeysError::RandomnessFailure("os".into()).into();
        assert!(matches!(err, DatacenterError::RandomnessFailure(_)));
    }

    #[test]
    fn test_other_errors_are_wrapped() {
        let err: DatacenterError = CoreError::EmptyLedger.into();
        assert!(matches!(err, DatacenterError::Core(CoreError::EmptyLedger)));

        let err: DatacenterError = KeysError::Decryption("tag".into()).into();
        assert!(matches!(err, DatacenterError::Keys(KeysError::Decryption(_))));
    }
}
