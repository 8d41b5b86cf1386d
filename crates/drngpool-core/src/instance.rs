//! A single DRNG instance: one backend handle plus its seed conditioner.
//!
//! Locking:
//! - the generate lock (a mutex around the backend handle) serializes seed
//!   and generate calls;
//! - the conditioner sits behind its own read-write lock so the seed hash
//!   can be swapped without stalling concurrent reseeds for longer than
//!   the swap itself.
//!
//! When both are needed the generate lock is taken first.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::backend::{DrngBackend, DrngHandle};
use crate::conditioning::{SeedConditioner, SeedHash, bootstrap_seed};
use crate::error::{DrngError, Result};

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(0);

/// Generator instance coupling a backend handle with its conditioner.
///
/// Dropping the instance destroys it. Cloned `Arc`s keep it alive, so the
/// initial instance stays valid while any domain slot shares it.
pub struct GeneratorInstance {
    id: u64,
    backend: Arc<dyn DrngBackend>,
    drng: Mutex<Option<Box<dyn DrngHandle>>>,
    conditioner: RwLock<Option<SeedConditioner>>,
    seed_size: usize,
}

impl std::fmt::Debug for GeneratorInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorInstance")
            .field("id", &self.id)
            .field("backend", &self.backend.name())
            .field("seed_size", &self.seed_size)
            .field("seed_hash", &self.seed_hash())
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}

impl GeneratorInstance {
    /// Allocate and bootstrap-seed a new instance.
    ///
    /// When the backend declares a seed size, a conditioner is attached
    /// using `seed_hash` or, if unset, the default hash for that size.
    /// Everything allocated so far is released if any step fails.
    pub fn new(
        backend: Arc<dyn DrngBackend>,
        seed_hash: Option<&str>,
        security_strength: u32,
    ) -> Result<Self> {
        let handle = backend.alloc(security_strength)?;
        let seed_size = handle.seed_size();

        // From here on, returning early drops `instance`, which deallocates.
        let mut instance = Self {
            id: NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed),
            backend,
            drng: Mutex::new(Some(handle)),
            conditioner: RwLock::new(None),
            seed_size,
        };

        if seed_size > 0 {
            let hash = SeedHash::resolve(seed_hash, seed_size).inspect_err(|e| {
                log::error!("DRNG {}: {e}", instance.name());
            })?;
            instance.conditioner = RwLock::new(Some(SeedConditioner::new(hash, seed_size)?));
        } else if let Some(name) = seed_hash {
            log::debug!(
                "DRNG {} takes seeds of any size, ignoring seed hash {name}",
                instance.name()
            );
        }

        instance.reseed(&bootstrap_seed())?;
        Ok(instance)
    }

    /// Allocate an instance with the same backend and seed hash as `self`.
    ///
    /// The new instance is seeded on its own, never from this instance's
    /// state.
    pub fn sibling(&self, security_strength: u32) -> Result<Self> {
        let hash = self.seed_hash().map(SeedHash::name);
        Self::new(Arc::clone(&self.backend), hash, security_strength)
    }

    /// Process-unique instance number.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Backend display name.
    pub fn name(&self) -> &str {
        self.backend.name()
    }

    pub fn backend(&self) -> &Arc<dyn DrngBackend> {
        &self.backend
    }

    /// Seed size the backend requires, zero if it accepts any length.
    pub fn seed_size(&self) -> usize {
        self.seed_size
    }

    /// Hash currently used for conditioning, if any.
    pub fn seed_hash(&self) -> Option<SeedHash> {
        read(&self.conditioner).as_ref().map(SeedConditioner::hash)
    }

    pub fn is_destroyed(&self) -> bool {
        lock(&self.drng).is_none()
    }

    /// Reseed from arbitrary-length seed material.
    ///
    /// Conditioned to the backend seed size when a conditioner is attached,
    /// passed through unchanged otherwise. Backend and hash errors are
    /// returned as is.
    pub fn reseed(&self, seed: &[u8]) -> Result<()> {
        let mut drng = lock(&self.drng);
        let handle = drng.as_deref_mut().ok_or(DrngError::Destroyed)?;
        let conditioner = read(&self.conditioner);
        match conditioner.as_ref() {
            Some(c) => c.condition(seed, |digest| self.backend.seed(handle, digest)),
            None => self.backend.seed(handle, seed),
        }
    }

    /// Return exactly `len` random bytes.
    pub fn generate(&self, len: usize) -> Result<Vec<u8>> {
        let mut out = vec![0u8; len];
        self.generate_into(&mut out)?;
        Ok(out)
    }

    /// Fill `out` completely. A backend producing fewer bytes is an error.
    pub fn generate_into(&self, out: &mut [u8]) -> Result<()> {
        let mut drng = lock(&self.drng);
        let handle = drng.as_deref_mut().ok_or(DrngError::Destroyed)?;
        let returned = self.backend.generate(handle, out)?;
        if returned != out.len() {
            return Err(DrngError::ShortGenerate {
                requested: out.len(),
                returned,
            });
        }
        Ok(())
    }

    /// Replace the seed hash.
    ///
    /// The old conditioner stays in place if the new one cannot be built.
    pub fn set_seed_hash(&self, name: &str) -> Result<()> {
        if self.seed_size == 0 {
            return Err(DrngError::SeedHashNotApplicable(self.name().to_string()));
        }
        let conditioner = SeedConditioner::new(SeedHash::from_name(name)?, self.seed_size)?;
        *write(&self.conditioner) = Some(conditioner);
        log::info!("DRNG {} now conditions seeds with {name}", self.name());
        Ok(())
    }

    /// Release the backend handle, then the conditioner.
    ///
    /// Repeated calls are no-ops. Afterwards `reseed` and `generate` fail
    /// with [`DrngError::Destroyed`].
    pub fn destroy(&self) {
        let handle = lock(&self.drng).take();
        if let Some(handle) = handle {
            self.backend.dealloc(handle);
        }
        write(&self.conditioner).take();
    }
}

impl Drop for GeneratorInstance {
    fn drop(&mut self) {
        self.destroy();
    }
}

pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read<T>(l: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    l.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(l: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    l.write().unwrap_or_else(PoisonError::into_inner)
}
