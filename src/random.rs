//! Injected randomness for sort order and page selection
//!
//! Recommendation payloads vary `sort_by` and `page` between calls so the
//! same request doesn't always surface the same titles. Routers take the
//! source as `Arc<dyn RandomSource>`; tests use [`SeededRandom`] to get
//! repeatable output.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub trait RandomSource: Send + Sync {
    /// Uniform index in `0..len`. `len` must be non-zero.
    fn index(&self, len: usize) -> usize;

    /// Uniform integer in `low..=high`
    fn between(&self, low: u32, high: u32) -> u32;
}

/// Thread-local RNG, the production default
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn index(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }

    fn between(&self, low: u32, high: u32) -> u32 {
        rand::thread_rng().gen_range(low..=high)
    }
}

/// Deterministic RNG for tests and reproducible CLI runs
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        // a panic while holding the lock can't leave the RNG in a bad state
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut rng)
    }
}

impl RandomSource for SeededRandom {
    fn index(&self, len: usize) -> usize {
        self.with_rng(|rng| rng.gen_range(0..len))
    }

    fn between(&self, low: u32, high: u32) -> u32 {
        self.with_rng(|rng| rng.gen_range(low..=high))
    }
}
