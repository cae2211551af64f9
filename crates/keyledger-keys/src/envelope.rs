//! Encrypted message envelope.
//!
//! A message is encrypted to a recipient's public key with a one-time
//! ephemeral X25519 key. The envelope carries everything except the
//! recipient's secret: the ephemeral public key, the nonce and the ciphertext.

use serde::{Deserialize, Serialize};

use crate::crypto::{EncryptionNonce, X25519PublicKey, X25519StaticSecret};
use crate::error::{KeysError, Result};

/// Format identifier for encrypted messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum EncryptionFormat {
    /// Ephemeral X25519, BLAKE3 key derivation, ChaCha20-Poly1305.
    X25519ChaCha20Poly1305 = 1,
}

/// An encrypted text message addressed to one public key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedMessage {
    pub format: EncryptionFormat,

    /// Public half of the sender's one-time key.
    pub ephemeral: X25519PublicKey,

    /// The key the message was encrypted to.
    pub recipient: X25519PublicKey,

    pub nonce: EncryptionNonce,

    /// The encrypted data (includes authentication tag).
    pub ciphertext: Vec<u8>,
}

impl EncryptedMessage {
    /// Encrypt `plaintext` so that only the holder of `recipient`'s secret
    /// can read it.
    pub fn encrypt(plaintext: &str, recipient: &X25519PublicKey) -> Result<Self> {
        let ephemeral_secret = X25519StaticSecret::try_generate()?;
        let ephemeral = ephemeral_secret.public_key();
        let key = ephemeral_secret
            .diffie_hellman(recipient)
            .derive_encryption_key(&key_context(&ephemeral, recipient));

        let nonce = EncryptionNonce::try_generate()?;
        let ciphertext = key.encrypt(plaintext.as_bytes(), &nonce)?;

        Ok(Self {
            format: EncryptionFormat::X25519ChaCha20Poly1305,
            ephemeral,
            recipient: *recipient,
            nonce,
            ciphertext,
        })
    }

    /// Decrypt with the recipient's secret.
    pub fn decrypt(&self, secret: &X25519StaticSecret) -> Result<String> {
        if secret.public_key() != self.recipient {
            return Err(KeysError::Decryption(format!(
                "message is addressed to {}",
                self.recipient
            )));
        }

        let key = secret
            .diffie_hellman(&self.ephemeral)
            .derive_encryption_key(&key_context(&self.ephemeral, &self.recipient));

        let plaintext = match self.format {
            EncryptionFormat::X25519ChaCha20Poly1305 => key.decrypt(&self.ciphertext, &self.nonce)?,
        };
        String::from_utf8(plaintext).map_err(|e| KeysError::Decryption(e.to_string()))
    }

    /// Serialize to CBOR bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf)
            .map_err(|e| KeysError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize from CBOR bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        ciborium::from_reader(bytes).map_err(|e| KeysError::Serialization(e.to_string()))
    }
}

/// Binds the derived key to both public keys of the exchange.
fn key_context(ephemeral: &X25519PublicKey, recipient: &X25519PublicKey) -> [u8; 64] {
    let mut context = [0u8; 64];
    context[..32].copy_from_slice(ephemeral.as_bytes());
    context[32..].copy_from_slice(recipient.as_bytes());
    context
}
