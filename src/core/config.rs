use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::core::errors::DetCoreError;

/// Number of integer keys pre-registered when no size is given.
pub const DEFAULT_KEYSPACE_SIZE: u64 = 1_000_000;

/// Upper bound accepted from a config file. Every key costs a mutex and a
/// version chain, so anything larger is almost certainly a typo.
pub const MAX_KEYSPACE_SIZE: u64 = 1 << 32;

/// Configuration for bootstrapping an [`MvccStorage`](crate::MvccStorage).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Keys `0..keyspace_size` are registered and given an initial version
    /// at timestamp 0 by `MvccStorage::open`.
    pub keyspace_size: u64,
    /// Time waits on and holds of the storage's key mutexes.
    pub lock_stats_enabled: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            keyspace_size: DEFAULT_KEYSPACE_SIZE,
            lock_stats_enabled: false,
        }
    }
}

impl StorageConfig {
    /// Create a new config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keyspace_size(mut self, size: u64) -> Self {
        self.keyspace_size = size;
        self
    }

    pub fn lock_stats_enabled(mut self, enabled: bool) -> Self {
        self.lock_stats_enabled = enabled;
        self
    }

    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, DetCoreError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, DetCoreError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), DetCoreError> {
        if self.keyspace_size > MAX_KEYSPACE_SIZE {
            return Err(DetCoreError::InvalidConfig(format!(
                "keyspace_size {} exceeds maximum {}",
                self.keyspace_size, MAX_KEYSPACE_SIZE
            )));
        }
        Ok(())
    }
}
