//! Audit events written to the ledger.
//!
//! Every registry mutation produces one event. Events are encoded as JSON
//! records with four string fields and concatenated into the record buffer,
//! so a single event may span blocks and a block may hold several events.

use serde::{Deserialize, Serialize};

use keyledger_keys::X25519PublicKey;

use crate::error::{DatacenterError, Result};

/// Fixed vocabulary of the `info` field.
pub mod info {
    pub const DATACENTER_READY: &str = "datacenter ready";
    pub const REGISTER_NEW_USER: &str = "register new user";
    pub const UPDATE_KEY: &str = "update key";
    pub const UPDATE_KEY_SUCCESS: &str = "update key success";
}

/// A registry event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditEvent {
    /// The datacenter installed its own key.
    DatacenterReady {
        at: i64,
        datacenter: u64,
        key: X25519PublicKey,
    },

    /// A user was registered with its first key.
    UserRegistered {
        at: i64,
        user: u64,
        key: X25519PublicKey,
    },

    /// A user asked to rotate away from `current`. Written before the proof
    /// is checked.
    KeyRotationRequested {
        at: i64,
        user: u64,
        current: X25519PublicKey,
    },

    /// A rotation was accepted; `key` is the new key.
    KeyRotated {
        at: i64,
        user: u64,
        key: X25519PublicKey,
    },
}

impl AuditEvent {
    /// Creation time (Unix milliseconds).
    pub fn timestamp(&self) -> i64 {
        match *self {
            AuditEvent::DatacenterReady { at, .. }
            | AuditEvent::UserRegistered { at, .. }
            | AuditEvent::KeyRotationRequested { at, .. }
            | AuditEvent::KeyRotated { at, .. } => at,
        }
    }

    /// The user (or datacenter) the event is about.
    pub fn entity(&self) -> u64 {
        match *self {
            AuditEvent::DatacenterReady { datacenter, .. } => datacenter,
            AuditEvent::UserRegistered { user, .. }
            | AuditEvent::KeyRotationRequested { user, .. }
            | AuditEvent::KeyRotated { user, .. } => user,
        }
    }

    /// The public key recorded with the event.
    pub fn key(&self) -> X25519PublicKey {
        match *self {
            AuditEvent::DatacenterReady { key, .. }
            | AuditEvent::UserRegistered { key, .. }
            | AuditEvent::KeyRotated { key, .. } => key,
            AuditEvent::KeyRotationRequested { current, .. } => current,
        }
    }

    pub fn info(&self) -> &'static str {
        match self {
            AuditEvent::DatacenterReady { .. } => info::DATACENTER_READY,
            AuditEvent::UserRegistered { .. } => info::REGISTER_NEW_USER,
            AuditEvent::KeyRotationRequested { .. } => info::UPDATE_KEY,
            AuditEvent::KeyRotated { .. } => info::UPDATE_KEY_SUCCESS,
        }
    }

    pub fn to_record(&self) -> AuditRecord {
        AuditRecord {
            timestamp: self.timestamp().to_string(),
            entity: self.entity().to_string(),
            entity_pub_key: self.key().to_string(),
            info: self.info().to_string(),
        }
    }

    /// Encode as a JSON record.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.to_record())?)
    }

    /// Decode a single JSON record.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let record: AuditRecord = serde_json::from_slice(bytes)?;
        Self::try_from(record)
    }
}

/// The encoded form of an [`AuditEvent`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub timestamp: String,
    pub entity: String,
    pub entity_pub_key: String,
    pub info: String,
}

impl TryFrom<AuditRecord> for AuditEvent {
    type Error = DatacenterError;

    fn try_from(record: AuditRecord) -> Result<Self> {
        let at: i64 = record
            .timestamp
            .parse()
            .map_err(|e| malformed("timestamp", e))?;
        let entity: u64 = record.entity.parse().map_err(|e| malformed("entity", e))?;
        let key: X25519PublicKey = record
            .entity_pub_key
            .parse()
            .map_err(|e| malformed("entity_pub_key", e))?;

        match record.info.as_str() {
            info::DATACENTER_READY => Ok(AuditEvent::DatacenterReady {
                at,
                datacenter: entity,
                key,
            }),
            info::REGISTER_NEW_USER => Ok(AuditEvent::UserRegistered {
                at,
                user: entity,
                key,
            }),
            info::UPDATE_KEY => Ok(AuditEvent::KeyRotationRequested {
                at,
                user: entity,
                current: key,
            }),
            info::UPDATE_KEY_SUCCESS => Ok(AuditEvent::KeyRotated {
                at,
                user: entity,
                key,
            }),
            other => Err(DatacenterError::Serialization(format!(
                "unknown audit info: {other:?}"
            ))),
        }
    }
}

fn malformed(field: &str, err: impl std::fmt::Display) -> DatacenterError {
    DatacenterError::Serialization(format!("malformed {field}: {err}"))
}

/// Decode a run of concatenated records, e.g. the joined content of every
/// non-genesis block.
pub fn decode_events(bytes: &[u8]) -> Result<Vec<AuditEvent>> {
    serde_json::Deserializer::from_slice(bytes)
        .into_iter::<AuditRecord>()
        .map(|record| AuditEvent::try_from(record?))
        .collect()
}
