use rand::{rngs::StdRng, Rng, SeedableRng};
use std::time::Instant;

/// Decides whether a keystroke was a typing error.
pub trait ErrorDetector: Send {
    fn is_error(&mut self, at: Instant) -> bool;
}

/// Stand-in for real error detection: flags each keystroke independently with
/// a fixed probability.
pub struct RandomErrorDetector {
    rng: StdRng,
    probability: f64,
}

impl RandomErrorDetector {
    pub fn new(probability: f64) -> Self {
        Self::with_rng(StdRng::from_entropy(), probability)
    }

    pub fn seeded(seed: u64, probability: f64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), probability)
    }

    fn with_rng(rng: StdRng, probability: f64) -> Self {
        Self {
            rng,
            probability: if probability.is_finite() {
                probability.clamp(0.0, 1.0)
            } else {
                0.0
            },
        }
    }
}

impl ErrorDetector for RandomErrorDetector {
    fn is_error(&mut self, _at: Instant) -> bool {
        self.rng.gen_bool(self.probability)
    }
}

/// Never flags an error.
pub struct NoErrors;

impl ErrorDetector for NoErrors {
    fn is_error(&mut self, _at: Instant) -> bool {
        false
    }
}
