//! Thread-safe handle to a datacenter.
//!
//! Buffer fill, seal and clear must not interleave with another writer, so
//! every operation that may seal holds the write lock for its whole duration.
//! Lookups, verification and votes share the read lock.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use keyledger_core::{Fingerprint, Ledger, Verification, VoteOutcome};
use keyledger_keys::{SharedKey, X25519PublicKey};

use crate::datacenter::Datacenter;
use crate::error::{DatacenterError, Result};
use crate::event::AuditEvent;

/// A cloneable, lock-protected [`Datacenter`].
#[derive(Debug, Clone)]
pub struct SharedDatacenter {
    inner: Arc<RwLock<Datacenter>>,
}

impl SharedDatacenter {
    pub fn new(datacenter: Datacenter) -> Self {
        Self {
            inner: Arc::new(RwLock::new(datacenter)),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Datacenter>> {
        self.inner.read().map_err(|_| DatacenterError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Datacenter>> {
        self.inner.write().map_err(|_| DatacenterError::LockPoisoned)
    }

    /// Run `f` with shared access.
    pub fn with<T>(&self, f: impl FnOnce(&Datacenter) -> T) -> Result<T> {
        Ok(f(&*self.read()?))
    }

    /// Run `f` with exclusive access.
    pub fn with_mut<T>(&self, f: impl FnOnce(&mut Datacenter) -> T) -> Result<T> {
        Ok(f(&mut *self.write()?))
    }

    pub fn register_new_user(&self, id: u64, key: X25519PublicKey) -> Result<()> {
        self.write()?.register_new_user(id, key)
    }

    pub fn rotate_user_key(
        &self,
        id: u64,
        proof: &SharedKey,
        new_key: X25519PublicKey,
    ) -> Result<()> {
        self.write()?.rotate_user_key(id, proof, new_key)
    }

    pub fn reinitialize_keys(&self) -> Result<X25519PublicKey> {
        self.write()?.reinitialize_keys()
    }

    pub fn write_event(&self, event: &AuditEvent) -> Result<usize> {
        self.write()?.write(event)
    }

    pub fn write_bytes(&self, data: &[u8]) -> Result<usize> {
        self.write()?.write_bytes(data)
    }

    pub fn force_write(&self) -> Result<Fingerprint> {
        self.write()?.force_write()
    }

    pub fn request_public_key(&self, id: u64) -> Result<X25519PublicKey> {
        self.read()?.request_public_key(id)
    }

    pub fn public_key(&self) -> Result<X25519PublicKey> {
        Ok(self.read()?.public_key())
    }

    pub fn public_key_exists(&self, key: &X25519PublicKey) -> Result<bool> {
        Ok(self.read()?.public_key_exists(key))
    }

    pub fn verify(&self) -> Result<Verification> {
        Ok(self.read()?.verify())
    }

    pub fn vote(&self, other: &Ledger) -> Result<bool> {
        Ok(self.read()?.vote(other))
    }

    pub fn ballot(&self, other: &Ledger) -> Result<VoteOutcome> {
        Ok(self.read()?.ballot(other))
    }

    /// Consistent copy of the ledger.
    pub fn snapshot(&self) -> Result<Ledger> {
        Ok(self.read()?.snapshot())
    }
}

impl From<Datacenter> for SharedDatacenter {
    fn from(datacenter: Datacenter) -> Self {
        Self::new(datacenter)
    }
}
