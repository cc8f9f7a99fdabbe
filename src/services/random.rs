use rand::{rngs::StdRng, Rng, SeedableRng};
use std::sync::{Mutex, PoisonError};

/// Source of randomness for cuisine/meal picks, fallback calories and
/// reciprocity draws. Injected so tests can pin outcomes.
pub trait RandomSource: Send + Sync {
    /// Uniform index in `0..len`. `len` must be non-zero.
    fn pick(&self, len: usize) -> usize;

    /// Uniform integer in `low..=high`
    fn between(&self, low: u32, high: u32) -> u32;

    /// Uniform float in `[0, 1)`
    fn unit(&self) -> f64;
}

/// `StdRng` behind a mutex, seeded from the OS or from a fixed seed
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }
}

impl RandomSource for SeededRandom {
    fn pick(&self, len: usize) -> usize {
        self.with_rng(|rng| rng.gen_range(0..len))
    }

    fn between(&self, low: u32, high: u32) -> u32 {
        self.with_rng(|rng| rng.gen_range(low..=high))
    }

    fn unit(&self) -> f64 {
        self.with_rng(|rng| rng.gen::<f64>())
    }
}
