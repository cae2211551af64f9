//! A participant holding an X25519 identity.

use tracing::debug;

use crate::crypto::{SharedKey, X25519PublicKey, X25519StaticSecret};
use crate::envelope::EncryptedMessage;
use crate::error::Result;

/// A named participant with its own key-agreement secret.
///
/// Ids identify users; names are labels and need not be unique. The
/// datacenter uses a `Client` for its own identity as well.
#[derive(Debug)]
pub struct Client {
    id: u64,
    name: String,
    secret: X25519StaticSecret,
}

impl Client {
    /// Create a client with a freshly generated secret.
    pub fn new(name: impl Into<String>, id: u64) -> Result<Self> {
        Ok(Self::with_secret(name, id, X25519StaticSecret::try_generate()?))
    }

    /// Create a client from existing key material.
    pub fn with_secret(name: impl Into<String>, id: u64, secret: X25519StaticSecret) -> Self {
        Self {
            id,
            name: name.into(),
            secret,
        }
    }

    /// Replace the secret with a freshly generated one.
    ///
    /// Returns the previous public key.
    pub fn random_initialization(&mut self) -> Result<X25519PublicKey> {
        let secret = X25519StaticSecret::try_generate()?;
        Ok(self.replace_secret(secret))
    }

    /// Replace the secret with the given one. Returns the previous public key.
    pub fn replace_secret(&mut self, secret: X25519StaticSecret) -> X25519PublicKey {
        let previous = self.public_key();
        self.secret = secret;
        debug!(id = self.id, previous = %previous, current = %self.public_key(), "client key replaced");
        previous
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The client's current public key.
    pub fn public_key(&self) -> X25519PublicKey {
        self.secret.public_key()
    }

    /// Shared secret between this client and `peer`.
    ///
    /// Presented to the datacenter as the proof for a key rotation.
    pub fn shared_secret_with(&self, peer: &X25519PublicKey) -> SharedKey {
        self.secret.diffie_hellman(peer)
    }

    /// Encrypt a text message to `recipient`.
    pub fn encrypt_msg(&self, msg: &str, recipient: &X25519PublicKey) -> Result<EncryptedMessage> {
        EncryptedMessage::encrypt(msg, recipient)
    }

    /// Decrypt a message addressed to this client.
    pub fn decrypt_msg(&self, encrypted: &EncryptedMessage) -> Result<String> {
        encrypted.decrypt(&self.secret)
    }
}
