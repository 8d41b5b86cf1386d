//! Configuration consumed at startup.
//!
//! The core only reads these values; parsing them from files, flags or the
//! environment is the host's job.

use serde::{Deserialize, Serialize};

/// Default security strength in bytes (256 bits).
pub const DEFAULT_SECURITY_STRENGTH: u32 = 32;

/// DRNG backend and seed hash selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrngConfig {
    /// Name of the generator algorithm the backend should load.
    pub drng_name: Option<String>,
    /// Hash used to condition seeds. When unset it is derived from the
    /// backend's seed size.
    pub seed_hash: Option<String>,
    /// Requested security strength in bytes.
    pub security_strength: u32,
}

impl Default for DrngConfig {
    fn default() -> Self {
        Self {
            drng_name: None,
            seed_hash: None,
            security_strength: DEFAULT_SECURITY_STRENGTH,
        }
    }
}

impl DrngConfig {
    /// Configuration selecting `drng_name` with an automatic seed hash.
    pub fn new(drng_name: impl Into<String>) -> Self {
        Self {
            drng_name: Some(drng_name.into()),
            ..Self::default()
        }
    }

    /// Use `seed_hash` for seed conditioning.
    pub fn with_seed_hash(mut self, seed_hash: impl Into<String>) -> Self {
        self.seed_hash = Some(seed_hash.into());
        self
    }
}
