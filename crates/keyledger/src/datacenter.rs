//! The datacenter: a key registry that audits every change into a ledger.
//!
//! Each registry mutation builds an [`AuditEvent`] and pushes its encoding
//! through the record buffer. Whenever the buffer fills, its bytes are sealed
//! into a new ledger block with a fresh nonce and the buffer is cleared.
//! Every nonce an event needs is drawn before any of its bytes are buffered,
//! so an event is either written in full or not at all.

use std::fmt;

use rand::rngs::OsRng;
use rand::RngCore;
use tracing::{debug, info, warn};

use keyledger_core::{
    now_millis, Fingerprint, Ledger, Nonce, RecordBuffer, Verification, VoteOutcome,
};
use keyledger_keys::{Client, SharedKey, X25519PublicKey, X25519StaticSecret};

use crate::config::DatacenterConfig;
use crate::error::{DatacenterError, Result};
use crate::event::{decode_events, AuditEvent};
use crate::registry::{KeyRegistry, KeyStatus};

/// The authoritative node owning one ledger and the key registry.
///
/// The ledger and the record buffer are mutated together; every method that
/// may seal a block takes `&mut self`. See [`crate::SharedDatacenter`] for
/// concurrent access.
pub struct Datacenter {
    config: DatacenterConfig,
    identity: Client,
    ledger: Ledger,
    buffer: RecordBuffer,
    registry: KeyRegistry,
    nonces: Box<dyn RngCore + Send + Sync>,
}

impl Datacenter {
    /// Create a datacenter with a freshly generated key.
    pub fn new(config: DatacenterConfig) -> Result<Self> {
        Self::with_secret(config, X25519StaticSecret::try_generate()?)
    }

    /// Create a datacenter from existing key material.
    ///
    /// Registers the datacenter's own key under its configured id and writes
    /// a "datacenter ready" event.
    pub fn with_secret(config: DatacenterConfig, secret: X25519StaticSecret) -> Result<Self> {
        Self::with_nonce_source(config, secret, OsRng)
    }

    /// Create a datacenter whose block nonces are drawn from `nonces`.
    pub fn with_nonce_source(
        config: DatacenterConfig,
        secret: X25519StaticSecret,
        nonces: impl RngCore + Send + Sync + 'static,
    ) -> Result<Self> {
        config.validate()?;

        let mut nonces: Box<dyn RngCore + Send + Sync> = Box::new(nonces);
        let identity = Client::with_secret(config.name.clone(), config.id, secret);
        let mut datacenter = Self {
            ledger: Ledger::with_genesis(now_millis(), Nonce::generate_with(&mut *nonces)?),
            buffer: RecordBuffer::with_capacity(config.buffer_capacity),
            registry: KeyRegistry::new(),
            identity,
            config,
            nonces,
        };

        let key = datacenter.identity.public_key();
        datacenter.registry.insert(datacenter.config.id, key)?;
        datacenter.write(&AuditEvent::DatacenterReady {
            at: now_millis(),
            datacenter: datacenter.config.id,
            key,
        })?;

        info!(
            id = datacenter.config.id,
            name = %datacenter.config.name,
            key = %key,
            "datacenter ready"
        );
        Ok(datacenter)
    }

    pub fn id(&self) -> u64 {
        self.config.id
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &DatacenterConfig {
        &self.config
    }

    /// The datacenter's own public key.
    pub fn public_key(&self) -> X25519PublicKey {
        self.identity.public_key()
    }

    /// The ledger, for inspection.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// An owned copy of the ledger, e.g. to hand to a peer for a vote.
    pub fn snapshot(&self) -> Ledger {
        self.ledger.clone()
    }

    pub fn registry(&self) -> &KeyRegistry {
        &self.registry
    }

    /// Bytes buffered but not yet sealed into a block.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Registry Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Check if the key is active or was revoked.
    pub fn public_key_exists(&self, key: &X25519PublicKey) -> bool {
        self.registry.key_exists(key)
    }

    /// Status of a key, or None if it was never registered.
    pub fn key_status(&self, key: &X25519PublicKey) -> Option<KeyStatus> {
        self.registry.status(key)
    }

    /// Look up the key registered for `id`.
    pub fn request_public_key(&self, id: u64) -> Result<X25519PublicKey> {
        self.registry
            .get(id)
            .ok_or(DatacenterError::UnknownIdentifier(id))
    }

    /// Register a new user with its first key.
    pub fn register_new_user(&mut self, id: u64, key: X25519PublicKey) -> Result<()> {
        if self.registry.contains(id) {
            warn!(user = id, "registration rejected: id already exists");
            return Err(DatacenterError::DuplicateIdentifier(id));
        }
        self.ensure_key_unused(&key)?;

        self.write(&AuditEvent::UserRegistered {
            at: now_millis(),
            user: id,
            key,
        })?;
        self.registry.insert(id, key)?;

        info!(user = id, key = %key, "user registered");
        Ok(())
    }

    /// Rotate the key of `id` to `new_key`.
    ///
    /// `proof` must equal the shared secret between the user's current key
    /// and the datacenter's key. The "update key" event is written before
    /// the proof is checked, so rejected attempts are audited too.
    pub fn rotate_user_key(
        &mut self,
        id: u64,
        proof: &SharedKey,
        new_key: X25519PublicKey,
    ) -> Result<()> {
        let current = self.request_public_key(id)?;
        if current == new_key {
            return Err(DatacenterError::KeyUnchanged(id));
        }
        self.ensure_key_unused(&new_key)?;

        self.write(&AuditEvent::KeyRotationRequested {
            at: now_millis(),
            user: id,
            current,
        })?;

        if self.identity.shared_secret_with(&current) != *proof {
            warn!(user = id, "key rotation rejected: proof mismatch");
            return Err(DatacenterError::ProofMismatch(id));
        }

        self.write(&AuditEvent::KeyRotated {
            at: now_millis(),
            user: id,
            key: new_key,
        })?;
        self.registry.replace(id, new_key)?;

        info!(user = id, previous = %current, key = %new_key, "user key rotated");
        Ok(())
    }

    /// Replace the datacenter's own key with a freshly generated one.
    ///
    /// Returns the new public key.
    pub fn reinitialize_keys(&mut self) -> Result<X25519PublicKey> {
        self.reinitialize_keys_with(X25519StaticSecret::try_generate()?)
    }

    /// Replace the datacenter's own key. The previous key is revoked and a
    /// "datacenter ready" event is written.
    ///
    /// Proofs computed against the previous key no longer match.
    pub fn reinitialize_keys_with(&mut self, secret: X25519StaticSecret) -> Result<X25519PublicKey> {
        let key = secret.public_key();
        self.ensure_key_unused(&key)?;

        self.write(&AuditEvent::DatacenterReady {
            at: now_millis(),
            datacenter: self.config.id,
            key,
        })?;
        self.registry.replace(self.config.id, key)?;
        self.identity.replace_secret(secret);

        info!(id = self.config.id, key = %key, "datacenter keys reinitialized");
        Ok(key)
    }

    /// The datacenter's side of a rotation proof for `key`.
    pub fn shared_secret_with(&self, key: &X25519PublicKey) -> SharedKey {
        self.identity.shared_secret_with(key)
    }

    fn ensure_key_unused(&self, key: &X25519PublicKey) -> Result<()> {
        if self.config.reject_key_reuse && self.registry.key_exists(key) {
            warn!(key = %key, "public key already used");
            return Err(DatacenterError::KeyInUse(*key));
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Write Pipeline
    // ─────────────────────────────────────────────────────────────────────────

    /// Encode an event and push it through the record buffer.
    ///
    /// Returns the number of blocks sealed.
    pub fn write(&mut self, event: &AuditEvent) -> Result<usize> {
        let bytes = event.to_bytes()?;
        self.write_bytes(&bytes)
    }

    /// Push raw bytes through the record buffer, sealing every time it fills.
    ///
    /// Returns the number of blocks sealed. If a nonce cannot be generated
    /// nothing is written: the buffer and the ledger are left as they were.
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<usize> {
        if data.is_empty() {
            return Err(DatacenterError::EmptyPayload);
        }

        let seals = (self.buffer.len() + data.len()) / self.buffer.capacity();
        let nonces = (0..seals)
            .map(|_| self.next_nonce())
            .collect::<Result<Vec<_>>>()?;

        let mut rest = data;
        for nonce in nonces {
            let consumed = self.buffer.write_until_full(rest);
            rest = &rest[consumed..];
            debug_assert!(self.buffer.is_full());
            self.seal_with(nonce);
        }
        if !rest.is_empty() {
            self.buffer.write_until_full(rest);
        }
        Ok(seals)
    }

    /// Seal whatever is buffered into a new block, even if it is not full.
    ///
    /// An empty buffer seals an empty block.
    pub fn force_write(&mut self) -> Result<Fingerprint> {
        let nonce = self.next_nonce()?;
        Ok(self.seal_with(nonce))
    }

    fn next_nonce(&mut self) -> Result<Nonce> {
        Ok(Nonce::generate_with(&mut *self.nonces)?)
    }

    fn seal_with(&mut self, nonce: Nonce) -> Fingerprint {
        let content = self.buffer.bytes();
        self.buffer.clear();

        let len = content.len();
        let fingerprint = self.ledger.add_block(content, nonce);
        debug!(
            size = self.ledger.size(),
            content_len = len,
            fingerprint = %fingerprint,
            "block sealed"
        );
        fingerprint
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Verification
    // ─────────────────────────────────────────────────────────────────────────

    /// Verify the datacenter's own ledger.
    pub fn verify(&self) -> Verification {
        self.ledger.verify()
    }

    /// Vote on whether a peer's ledger is valid and identical to ours.
    pub fn vote(&self, other: &Ledger) -> bool {
        self.ledger.vote(other)
    }

    /// Structured form of [`Datacenter::vote`].
    pub fn ballot(&self, other: &Ledger) -> VoteOutcome {
        self.ledger.ballot(other)
    }

    /// Decode every event written so far, sealed or still buffered.
    ///
    /// Fails with a serialization error if raw payloads were written with
    /// [`Datacenter::write_bytes`].
    pub fn audit_trail(&self) -> Result<Vec<AuditEvent>> {
        let mut bytes: Vec<u8> = self
            .ledger
            .blocks()
            .iter()
            .skip(1)
            .flat_map(|block| block.content().iter().copied())
            .collect();
        bytes.extend(self.buffer.bytes());
        decode_events(&bytes)
    }
}

impl fmt::Debug for Datacenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Datacenter")
            .field("config", &self.config)
            .field("identity", &self.identity)
            .field("ledger", &self.ledger)
            .field("buffer", &self.buffer)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
