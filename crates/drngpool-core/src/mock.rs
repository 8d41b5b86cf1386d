//! Scriptable backend shared by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::backend::{DrngBackend, DrngHandle};
use crate::error::{DrngError, Result};

/// Backend counting allocations and recording every seed it receives.
#[derive(Default)]
pub struct MockBackend {
    pub seed_size: usize,
    pub attempts: AtomicUsize,
    pub allocs: AtomicUsize,
    pub deallocs: AtomicUsize,
    /// Allocation attempt (1-based) that fails, if any.
    pub fail_alloc_at: Option<usize>,
    pub fail_seed: bool,
    pub short_generate: bool,
    pub seeds: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl MockBackend {
    pub fn with_seed_size(seed_size: usize) -> Self {
        Self {
            seed_size,
            ..Self::default()
        }
    }

    pub fn live(&self) -> usize {
        self.allocs.load(Ordering::SeqCst) - self.deallocs.load(Ordering::SeqCst)
    }

    pub fn allocs(&self) -> usize {
        self.allocs.load(Ordering::SeqCst)
    }

    pub fn recorded_seeds(&self) -> Vec<Vec<u8>> {
        self.seeds.lock().unwrap().clone()
    }
}

struct MockHandle {
    seed_size: usize,
    fail_seed: bool,
    short_generate: bool,
    seeds: Arc<Mutex<Vec<Vec<u8>>>>,
    state: u8,
}

impl DrngHandle for MockHandle {
    fn seed_size(&self) -> usize {
        self.seed_size
    }

    fn seed(&mut self, seed: &[u8]) -> Result<()> {
        if self.fail_seed {
            return Err(DrngError::Seed("mock reset failed".into()));
        }
        self.seeds.lock().unwrap().push(seed.to_vec());
        self.state = seed.iter().fold(self.state, |acc, b| acc.wrapping_add(*b));
        Ok(())
    }

    fn generate(&mut self, out: &mut [u8]) -> Result<usize> {
        for byte in out.iter_mut() {
            self.state = self.state.wrapping_mul(31).wrapping_add(7);
            *byte = self.state;
        }
        if self.short_generate {
            Ok(out.len() / 2)
        } else {
            Ok(out.len())
        }
    }
}

impl DrngBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    fn alloc(&self, _security_strength: u32) -> Result<Box<dyn DrngHandle>> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_alloc_at == Some(attempt) {
            return Err(DrngError::AllocationFailed("mock".into()));
        }
        self.allocs.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockHandle {
            seed_size: self.seed_size,
            fail_seed: self.fail_seed,
            short_generate: self.short_generate,
            seeds: Arc::clone(&self.seeds),
            state: 0,
        }))
    }

    fn dealloc(&self, handle: Box<dyn DrngHandle>) {
        drop(handle);
        self.deallocs.fetch_add(1, Ordering::SeqCst);
    }
}
