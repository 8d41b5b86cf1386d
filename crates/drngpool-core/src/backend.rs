//! Pluggable DRNG backend contract.
//!
//! Every generator algorithm is reached through two traits:
//!
//! - [`DrngBackend`] is the process-wide descriptor: it names the algorithm
//!   and allocates / deallocates per-instance state.
//! - [`DrngHandle`] is the state a backend hands out. It is seeded and
//!   queried only while the owning instance holds its generate lock.
//!
//! [`AlgorithmBackend`] is the stock descriptor. It resolves a configured
//! DRNG name against the built-in [`algorithms`](crate::algorithms) catalog
//! and refuses names that would make the manager wrap itself.

use crate::algorithms;
use crate::error::{DrngError, Result};

/// Names that must never be loaded as a backend. Matched as prefixes, so
/// `drbg_nopr_sha256` is refused just like `drbg`.
pub const RESERVED_DRNG_NAMES: &[&str] = &["stdrng", "lrng", "drbg", "jitterentropy_rng"];

/// Per-instance generator state allocated by a [`DrngBackend`].
pub trait DrngHandle: Send {
    /// Seed length the algorithm requires. Zero means any length is
    /// accepted and the algorithm folds the input in itself.
    fn seed_size(&self) -> usize;

    /// Reset the generator state from `seed`.
    fn seed(&mut self, seed: &[u8]) -> Result<()>;

    /// Fill `out` with random bytes. Returns the number of bytes written.
    fn generate(&mut self, out: &mut [u8]) -> Result<usize>;
}

/// Capability descriptor of a concrete generator algorithm.
pub trait DrngBackend: Send + Sync {
    /// Display name of the algorithm.
    fn name(&self) -> &str;

    /// Allocate fresh, unseeded generator state.
    fn alloc(&self, security_strength: u32) -> Result<Box<dyn DrngHandle>>;

    /// Release state obtained from [`alloc`](Self::alloc).
    fn dealloc(&self, handle: Box<dyn DrngHandle>) {
        drop(handle);
    }

    /// Seed `handle`. Delegates to the handle by default.
    fn seed(&self, handle: &mut dyn DrngHandle, seed: &[u8]) -> Result<()> {
        handle.seed(seed)
    }

    /// Generate into `out`. Delegates to the handle by default.
    fn generate(&self, handle: &mut dyn DrngHandle, out: &mut [u8]) -> Result<usize> {
        handle.generate(out)
    }
}

/// Reject empty names and names aliasing the aggregating generator.
pub fn check_drng_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(DrngError::MissingDrngName);
    }
    if RESERVED_DRNG_NAMES
        .iter()
        .any(|reserved| name.starts_with(reserved))
    {
        return Err(DrngError::DeniedDrngName(name.to_string()));
    }
    Ok(())
}

/// Backend resolving its generator from the built-in algorithm catalog.
#[derive(Debug, Clone)]
pub struct AlgorithmBackend {
    drng_name: Option<String>,
}

impl AlgorithmBackend {
    /// Backend for the named algorithm. The name is validated on `alloc`.
    pub fn new(drng_name: impl Into<String>) -> Self {
        Self {
            drng_name: Some(drng_name.into()),
        }
    }

    /// Backend taking its name from configuration, which may lack one.
    pub fn from_config(config: &crate::DrngConfig) -> Self {
        Self {
            drng_name: config.drng_name.clone(),
        }
    }
}

impl DrngBackend for AlgorithmBackend {
    fn name(&self) -> &str {
        self.drng_name.as_deref().unwrap_or("")
    }

    fn alloc(&self, security_strength: u32) -> Result<Box<dyn DrngHandle>> {
        let Some(name) = self.drng_name.as_deref() else {
            log::error!("DRNG name missing");
            return Err(DrngError::MissingDrngName);
        };
        if let Err(e) = check_drng_name(name) {
            log::error!("Refusing to load the requested random number generator {name}");
            return Err(e);
        }

        let handle = algorithms::allocate(name).ok_or_else(|| {
            log::error!("DRNG {name} cannot be allocated");
            DrngError::AllocationFailed(name.to_string())
        })?;
        log::info!(
            "DRNG {name} allocated (seed size {}, security strength {} bits)",
            handle.seed_size(),
            strength_bits(security_strength)
        );
        Ok(handle)
    }

    fn dealloc(&self, handle: Box<dyn DrngHandle>) {
        drop(handle);
        log::info!("DRNG {} deallocated", self.name());
    }
}

/// Security strength in bits for a strength given in bytes.
fn strength_bits(security_strength: u32) -> u64 {
    u64::from(security_strength) * 8
}
