//! Seed conditioning.
//!
//! Backends that declare a non-zero seed size only accept seeds of exactly
//! that length. Arbitrary-length seed material is compressed to the right
//! size with a hash whose digest size equals the seed size. The digest is
//! wiped when conditioning returns, on success and on every error path.
//!
//! ```text
//! raw seed material → SeedConditioner (SHA-256/384/512) → backend seed slot
//! ```

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering, compiler_fence};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use sha2::digest::DynDigest;
use sha2::{Sha256, Sha384, Sha512};

use crate::error::{DrngError, Result};

/// Largest digest any [`SeedHash`] produces.
pub const MAX_DIGEST_SIZE: usize = 64;

/// Hash used to bring seed material to a backend's seed size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeedHash {
    Sha256,
    Sha384,
    Sha512,
}

impl std::fmt::Display for SeedHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl SeedHash {
    /// Parse a configured hash name (`sha256`, `SHA-384`, ...).
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().replace('-', "").as_str() {
            "sha256" => Ok(Self::Sha256),
            "sha384" => Ok(Self::Sha384),
            "sha512" => Ok(Self::Sha512),
            _ => Err(DrngError::UnknownSeedHash(name.to_string())),
        }
    }

    /// Default hash for a backend seed size: 32 → SHA-256, 48 → SHA-384,
    /// 64 → SHA-512. Any other size has no default.
    pub fn for_seed_size(seed_size: usize) -> Result<Self> {
        match seed_size {
            32 => Ok(Self::Sha256),
            48 => Ok(Self::Sha384),
            64 => Ok(Self::Sha512),
            other => Err(DrngError::UnsupportedSeedSize(other)),
        }
    }

    /// Use the configured hash if there is one, else the default for `seed_size`.
    pub fn resolve(configured: Option<&str>, seed_size: usize) -> Result<Self> {
        match configured {
            Some(name) => Self::from_name(name),
            None => Self::for_seed_size(seed_size),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
        }
    }

    pub fn digest_size(self) -> usize {
        match self {
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }

    fn new_context(self) -> Box<dyn DynDigest + Send + Sync> {
        match self {
            Self::Sha256 => Box::new(Sha256::default()),
            Self::Sha384 => Box::new(Sha384::default()),
            Self::Sha512 => Box::new(Sha512::default()),
        }
    }
}

/// Hash context bound to one generator instance.
pub struct SeedConditioner {
    hash: SeedHash,
    ctx: Box<dyn DynDigest + Send + Sync>,
    digest_size: usize,
}

impl std::fmt::Debug for SeedConditioner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedConditioner")
            .field("hash", &self.hash)
            .field("digest_size", &self.digest_size)
            .finish()
    }
}

impl SeedConditioner {
    /// Allocate a conditioner for a backend requiring `seed_size` bytes.
    ///
    /// Fails when the hash output size differs from `seed_size`; the digest
    /// is never truncated or padded.
    pub fn new(hash: SeedHash, seed_size: usize) -> Result<Self> {
        let ctx = hash.new_context();
        let digest_size = ctx.output_size();
        if digest_size != seed_size {
            log::error!("Seed hash output size not equal to DRNG seed size");
            return Err(DrngError::DigestSizeMismatch {
                digest_size,
                seed_size,
            });
        }
        log::info!("Seed hash {hash} allocated");
        Ok(Self {
            hash,
            ctx,
            digest_size,
        })
    }

    pub fn hash(&self) -> SeedHash {
        self.hash
    }

    pub fn digest_size(&self) -> usize {
        self.digest_size
    }

    /// Hash `raw` and hand the digest to `sink`.
    ///
    /// The digest lives in a stack buffer that is wiped on drop, so it never
    /// outlives this call whatever `sink` or the hash returns.
    pub fn condition<T>(&self, raw: &[u8], sink: impl FnOnce(&[u8]) -> Result<T>) -> Result<T> {
        let mut digest = SeedBuffer::new();
        let mut ctx = self.ctx.box_clone();
        ctx.reset();
        ctx.update(raw);
        ctx.finalize_into_reset(&mut digest.0[..self.digest_size])
            .map_err(|_| DrngError::Hash)?;
        sink(&digest.0[..self.digest_size])
    }
}

/// Stack buffer for digests, wiped on drop.
struct SeedBuffer([u8; MAX_DIGEST_SIZE]);

impl SeedBuffer {
    fn new() -> Self {
        Self([0u8; MAX_DIGEST_SIZE])
    }
}

impl Drop for SeedBuffer {
    fn drop(&mut self) {
        wipe(&mut self.0);
    }
}

/// Overwrite `buf` with zeros in a way the optimizer may not elide.
pub fn wipe(buf: &mut [u8]) {
    for byte in buf.iter_mut() {
        // SAFETY: `byte` is a valid, aligned, exclusive reference.
        unsafe { std::ptr::write_volatile(byte, 0) };
    }
    compiler_fence(Ordering::SeqCst);
}

// ---------------------------------------------------------------------------
// Bootstrap seed
// ---------------------------------------------------------------------------

/// Time- and counter-derived value a fresh instance is seeded with so it
/// never runs unseeded. Not entropy; real seed material arrives through
/// reseeding.
pub fn bootstrap_seed() -> [u8; 24] {
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let elapsed = EPOCH.get_or_init(Instant::now).elapsed().as_nanos() as u64;
    let wall = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64;
    let count = COUNTER.fetch_add(1, Ordering::Relaxed);

    let mut seed = [0u8; 24];
    seed[..8].copy_from_slice(&wall.to_le_bytes());
    seed[8..16].copy_from_slice(&elapsed.to_le_bytes());
    seed[16..].copy_from_slice(&count.to_le_bytes());
    seed
}
