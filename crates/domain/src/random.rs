//! Injected randomness.
//!
//! The domain crate carries no RNG dependency. Anything that needs a dice
//! roll takes a `RandomSource`, so generation is deterministic under test
//! and the engine decides where entropy comes from.

/// Caller-supplied source of randomness.
pub trait RandomSource {
    /// A uniform index in `[0, upper)`. `upper` is always >= 1 at call sites.
    fn pick(&mut self, upper: usize) -> usize;

    /// A uniform integer in `[min, max]` (inclusive).
    fn range(&mut self, min: i32, max: i32) -> i32;

    /// True with the given probability in `[0.0, 1.0]`.
    fn chance(&mut self, probability: f64) -> bool;
}

/// Fixed randomness for testing: always picks index 0, the range minimum,
/// and resolves `chance` against a preset outcome.
#[cfg(test)]
pub struct FixedRandom {
    pub chance_outcome: bool,
}

#[cfg(test)]
impl FixedRandom {
    pub fn new(chance_outcome: bool) -> Self {
        Self { chance_outcome }
    }
}

#[cfg(test)]
impl RandomSource for FixedRandom {
    fn pick(&mut self, _upper: usize) -> usize {
        0
    }

    fn range(&mut self, min: i32, _max: i32) -> i32 {
        min
    }

    fn chance(&mut self, _probability: f64) -> bool {
        self.chance_outcome
    }
}
