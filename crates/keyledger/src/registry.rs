//! Key registry: user id to current public key, plus per-key status.

use std::collections::HashMap;

use keyledger_keys::X25519PublicKey;

use crate::error::{DatacenterError, Result};

/// Lifecycle of a public key known to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyStatus {
    /// Currently registered to at least one user.
    Active,
    /// Rotated away from. Stays revoked while the datacenter rejects key
    /// reuse; otherwise registering it again makes it active.
    Revoked,
}

/// Mapping from user id to the currently registered key.
///
/// Entries are never deleted; rotation replaces the key and revokes the old
/// one.
#[derive(Debug, Clone, Default)]
pub struct KeyRegistry {
    users: HashMap<u64, X25519PublicKey>,
    keys: HashMap<X25519PublicKey, KeyStatus>,
}

impl KeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The key registered for `id`, by value.
    pub fn get(&self, id: u64) -> Option<X25519PublicKey> {
        self.users.get(&id).copied()
    }

    pub fn contains(&self, id: u64) -> bool {
        self.users.contains_key(&id)
    }

    /// Status of a key, or None if the registry has never seen it.
    pub fn status(&self, key: &X25519PublicKey) -> Option<KeyStatus> {
        self.keys.get(key).copied()
    }

    /// Check if the key is active or was revoked.
    pub fn key_exists(&self, key: &X25519PublicKey) -> bool {
        self.keys.contains_key(key)
    }

    /// Number of registered users.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Registered users and their keys, in no particular order.
    pub fn users(&self) -> impl Iterator<Item = (u64, X25519PublicKey)> + '_ {
        self.users.iter().map(|(id, key)| (*id, *key))
    }

    /// Register `id` with its first key.
    pub fn insert(&mut self, id: u64, key: X25519PublicKey) -> Result<()> {
        if self.users.contains_key(&id) {
            return Err(DatacenterError::DuplicateIdentifier(id));
        }
        self.users.insert(id, key);
        self.keys.insert(key, KeyStatus::Active);
        Ok(())
    }

    /// Replace the key of `id`. Returns the previous key.
    ///
    /// The previous key is revoked unless another user still holds it.
    pub fn replace(&mut self, id: u64, key: X25519PublicKey) -> Result<X25519PublicKey> {
        let previous = self.get(id).ok_or(DatacenterError::UnknownIdentifier(id))?;
        self.users.insert(id, key);

        if previous != key && !self.users.values().any(|held| *held == previous) {
            self.keys.insert(previous, KeyStatus::Revoked);
        }
        self.keys.insert(key, KeyStatus::Active);
        Ok(previous)
    }
}
