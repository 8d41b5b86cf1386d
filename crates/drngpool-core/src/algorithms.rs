//! Built-in generator algorithms, looked up by name.
//!
//! This is the catalog [`AlgorithmBackend`](crate::backend::AlgorithmBackend)
//! allocates from. Each algorithm rekeys itself after every generate call,
//! so a captured state does not reveal earlier output.
//!
//! | name           | seed size | construction                        |
//! |----------------|-----------|-------------------------------------|
//! | `chacha12`     | 32        | ChaCha12 stream (`rand::rngs::StdRng`) |
//! | `sha256_ctr`   | 32        | SHA-256 counter mode                |
//! | `sha384_ctr`   | 48        | SHA-384 counter mode                |
//! | `sha512_ctr`   | 64        | SHA-512 counter mode                |
//! | `sha512_chain` | 0 (any)   | SHA-512 counter mode, chained seeding |

use std::marker::PhantomData;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::backend::DrngHandle;
use crate::error::{DrngError, Result};

/// Names accepted by [`allocate`].
pub const BUILTIN_ALGORITHMS: &[&str] = &[
    "chacha12",
    "sha256_ctr",
    "sha384_ctr",
    "sha512_ctr",
    "sha512_chain",
];

/// Allocate unseeded state for the named algorithm.
pub fn allocate(name: &str) -> Option<Box<dyn DrngHandle>> {
    let handle: Box<dyn DrngHandle> = match name {
        "chacha12" => Box::new(ChaChaDrng::new()),
        "sha256_ctr" => Box::new(HashCtrDrng::<Sha256>::fixed_seed()),
        "sha384_ctr" => Box::new(HashCtrDrng::<Sha384>::fixed_seed()),
        "sha512_ctr" => Box::new(HashCtrDrng::<Sha512>::fixed_seed()),
        "sha512_chain" => Box::new(HashCtrDrng::<Sha512>::chained()),
        _ => return None,
    };
    Some(handle)
}

// ---------------------------------------------------------------------------
// ChaCha12
// ---------------------------------------------------------------------------

const CHACHA_SEED_SIZE: usize = 32;

/// ChaCha12 keystream generator.
pub struct ChaChaDrng {
    rng: StdRng,
}

impl ChaChaDrng {
    fn new() -> Self {
        Self {
            rng: StdRng::from_seed([0u8; CHACHA_SEED_SIZE]),
        }
    }

    fn rekey(&mut self) {
        let mut key = [0u8; CHACHA_SEED_SIZE];
        self.rng.fill_bytes(&mut key);
        self.rng = StdRng::from_seed(key);
        key.fill(0);
    }
}

impl DrngHandle for ChaChaDrng {
    fn seed_size(&self) -> usize {
        CHACHA_SEED_SIZE
    }

    fn seed(&mut self, seed: &[u8]) -> Result<()> {
        let key: [u8; CHACHA_SEED_SIZE] = seed.try_into().map_err(|_| {
            DrngError::Seed(format!(
                "chacha12 needs {CHACHA_SEED_SIZE} seed bytes, got {}",
                seed.len()
            ))
        })?;
        self.rng = StdRng::from_seed(key);
        Ok(())
    }

    fn generate(&mut self, out: &mut [u8]) -> Result<usize> {
        self.rng.fill_bytes(out);
        self.rekey();
        Ok(out.len())
    }
}

// ---------------------------------------------------------------------------
// Hash counter mode
// ---------------------------------------------------------------------------

/// Hash counter-mode generator.
///
/// Output block `i` is `H(key || counter_i)`. After each generate call the
/// key is replaced by `H(key || "rekey" || counter)`.
///
/// With a fixed seed size the seed must be exactly one digest long and
/// becomes the key. A chained instance declares seed size 0 and folds seeds
/// of any length into its key as `H(key || seed)`.
pub struct HashCtrDrng<D> {
    key: Vec<u8>,
    counter: u64,
    fixed_seed: bool,
    _digest: PhantomData<fn() -> D>,
}

impl<D: Digest> HashCtrDrng<D> {
    fn with_mode(fixed_seed: bool) -> Self {
        Self {
            key: vec![0u8; <D as Digest>::output_size()],
            counter: 0,
            fixed_seed,
            _digest: PhantomData,
        }
    }

    /// Instance requiring a seed exactly one digest long.
    pub fn fixed_seed() -> Self {
        Self::with_mode(true)
    }

    /// Instance accepting seeds of any length.
    pub fn chained() -> Self {
        Self::with_mode(false)
    }

    fn rekey(&mut self) {
        let mut h = D::new();
        h.update(&self.key);
        h.update(b"rekey");
        h.update(self.counter.to_le_bytes());
        self.key.copy_from_slice(&h.finalize());
    }
}

impl<D: Digest> DrngHandle for HashCtrDrng<D> {
    fn seed_size(&self) -> usize {
        if self.fixed_seed { self.key.len() } else { 0 }
    }

    fn seed(&mut self, seed: &[u8]) -> Result<()> {
        if self.fixed_seed {
            if seed.len() != self.key.len() {
                return Err(DrngError::Seed(format!(
                    "hash counter DRNG needs {} seed bytes, got {}",
                    self.key.len(),
                    seed.len()
                )));
            }
            self.key.copy_from_slice(seed);
        } else {
            let mut h = D::new();
            h.update(&self.key);
            h.update(seed);
            self.key.copy_from_slice(&h.finalize());
        }
        self.counter = 0;
        Ok(())
    }

    fn generate(&mut self, out: &mut [u8]) -> Result<usize> {
        let block_len = self.key.len();
        for chunk in out.chunks_mut(block_len) {
            let mut h = D::new();
            h.update(&self.key);
            h.update(self.counter.to_le_bytes());
            let block = h.finalize();
            chunk.copy_from_slice(&block[..chunk.len()]);
            self.counter = self.counter.wrapping_add(1);
        }
        self.rekey();
        Ok(out.len())
    }
}

impl<D> Drop for HashCtrDrng<D> {
    fn drop(&mut self) {
        self.key.fill(0);
    }
}
