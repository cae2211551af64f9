//! Cryptographic primitives for the ledger.
//!
//! Wraps Blake3 block hashing and nonce generation with strong types.

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, Result};
use crate::types::Fingerprint;

/// Width of a block nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Derive-key context for block fingerprints.
const FINGERPRINT_CONTEXT: &str = "keyledger-block-v0 fingerprint";

/// A fixed-width random nonce carried in every block header.
///
/// Only perturbs the fingerprint. There is no difficulty target.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Nonce(pub [u8; NONCE_LEN]);

impl Nonce {
    /// Draw a fresh nonce from the operating system's CSPRNG.
    pub fn generate() -> Result<Self> {
        Self::generate_with(&mut OsRng)
    }

    /// Draw a fresh nonce from `rng`.
    pub fn generate_with<R: RngCore + ?Sized>(rng: &mut R) -> Result<Self> {
        let mut bytes = [0u8; NONCE_LEN];
        rng.try_fill_bytes(&mut bytes)
            .map_err(|e| CoreError::RandomnessFailure(e.to_string()))?;
        Ok(Self(bytes))
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; NONCE_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; NONCE_LEN] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// The all-zero nonce.
    pub const ZERO: Self = Self([0u8; NONCE_LEN]);
}

impl fmt::Debug for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Nonce({})", self.to_hex())
    }
}

/// Hash canonical header bytes and block content into a fingerprint.
pub(crate) fn hash_block(header_bytes: &[u8], content: &[u8]) -> Fingerprint {
    let mut hasher = blake3::Hasher::new_derive_key(FINGERPRINT_CONTEXT);
    hasher.update(header_bytes);
    hasher.update(content);
    Fingerprint(*hasher.finalize().as_bytes())
}

/// Get current time in milliseconds.
pub fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}
