//! Clock and random implementations.

use chrono::{DateTime, Utc};
use questweave_domain::RandomSource;

use crate::infrastructure::ports::ClockPort;

/// System clock - uses real time.
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockPort for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// System randomness backing the domain's `RandomSource`.
pub struct SystemRandom;

impl SystemRandom {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for SystemRandom {
    fn pick(&mut self, upper: usize) -> usize {
        use rand::Rng;
        rand::thread_rng().gen_range(0..upper)
    }

    fn range(&mut self, min: i32, max: i32) -> i32 {
        use rand::Rng;
        rand::thread_rng().gen_range(min..=max)
    }

    fn chance(&mut self, probability: f64) -> bool {
        use rand::Rng;
        rand::thread_rng().gen_bool(probability.clamp(0.0, 1.0))
    }
}

/// Fixed clock for testing.
#[cfg(test)]
pub struct FixedClock(pub DateTime<Utc>);

#[cfg(test)]
impl ClockPort for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Fixed random for testing: index 0, range minimum, preset chance outcome.
#[cfg(test)]
pub struct FixedRandom(pub bool);

#[cfg(test)]
impl RandomSource for FixedRandom {
    fn pick(&mut self, _upper: usize) -> usize {
        0
    }

    fn range(&mut self, min: i32, _max: i32) -> i32 {
        min
    }

    fn chance(&mut self, _probability: f64) -> bool {
        self.0
    }
}
