//! Datacenter configuration.

use serde::{Deserialize, Serialize};

use keyledger_core::RECORD_CAPACITY;

use crate::error::{DatacenterError, Result};

/// Configuration for a [`crate::Datacenter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatacenterConfig {
    /// User id under which the datacenter registers its own key.
    pub id: u64,
    /// Display name of the datacenter.
    pub name: String,
    /// Record buffer capacity in bytes; every sealed full block has this size.
    pub buffer_capacity: usize,
    /// Refuse to register or rotate to a key that is active or was revoked.
    pub reject_key_reuse: bool,
}

impl Default for DatacenterConfig {
    fn default() -> Self {
        Self {
            id: 0,
            name: "datacenter".to_string(),
            buffer_capacity: RECORD_CAPACITY,
            reject_key_reuse: true,
        }
    }
}

impl DatacenterConfig {
    pub fn with_id(mut self, id: u64) -> Self {
        self.id = id;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    pub fn with_key_reuse_rejection(mut self, reject: bool) -> Self {
        self.reject_key_reuse = reject;
        self
    }

    /// Check the configuration before a datacenter is built from it.
    pub fn validate(&self) -> Result<()> {
        if self.buffer_capacity == 0 {
            return Err(DatacenterError::InvalidConfig(
                "buffer_capacity must be non-zero".into(),
            ));
        }
        if self.name.trim().is_empty() {
            return Err(DatacenterError::InvalidConfig("name must not be empty".into()));
        }
        Ok(())
    }
}
