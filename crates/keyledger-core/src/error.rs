//! Error types for the keyledger core.

use thiserror::Error;

/// Core errors that can occur while building or importing ledgers.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("randomness source failed: {0}")]
    RandomnessFailure(String),

    #[error("ledger snapshot has no genesis block")]
    EmptyLedger,
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
