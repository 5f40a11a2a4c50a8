//! Injected randomness for grading.
//!
//! The grading formula carries bounded jitter standing in for signal the
//! debate logs don't model. It is drawn from a `JitterSource` so tests can pin
//! it: `ZeroJitter` turns the formula into a deterministic estimator and
//! `SeededJitter` reproduces a run exactly from its seed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub trait JitterSource: Send {
    /// Next sample in `[0, 1)`.
    fn unit(&mut self) -> f64;

    /// Uniform sample in `[0, span)`.
    fn span(&mut self, span: f64) -> f64 {
        self.unit().clamp(0.0, 1.0) * span
    }
}

/// `StdRng`-backed jitter. Same seed, same sequence.
pub struct SeededJitter {
    rng: StdRng,
}

impl SeededJitter {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Seeded when `seed` is set, entropy otherwise.
    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::new(seed),
            None => Self::from_entropy(),
        }
    }
}

impl JitterSource for SeededJitter {
    fn unit(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// Always zero: every factor sits at its base value.
pub struct ZeroJitter;

impl JitterSource for ZeroJitter {
    fn unit(&mut self) -> f64 {
        0.0
    }
}

/// Constant sample. `FixedJitter(0.999)` pushes every factor to its ceiling.
pub struct FixedJitter(pub f64);

impl JitterSource for FixedJitter {
    fn unit(&mut self) -> f64 {
        self.0
    }
}
