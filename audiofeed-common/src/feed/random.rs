//! Random sources for cut points and new `random_id` keys

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex};

/// Source of uniform reals in [0, 1)
pub trait RandomSource: Send + Sync {
    fn next_unit(&self) -> f64;
}

impl<R: RandomSource + ?Sized> RandomSource for Arc<R> {
    fn next_unit(&self) -> f64 {
        (**self).next_unit()
    }
}

/// Production source backed by the thread-local RNG
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_unit(&self) -> f64 {
        // Standard distribution for f64 samples [0, 1)
        rand::thread_rng().gen::<f64>()
    }
}

/// Always returns the same value
///
/// Used to force a specific cut point.
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom(f64);

impl FixedRandom {
    /// Values outside [0, 1) are clamped into range
    pub fn new(value: f64) -> Self {
        Self(value.clamp(0.0, 1.0 - f64::EPSILON))
    }
}

impl RandomSource for FixedRandom {
    fn next_unit(&self) -> f64 {
        self.0
    }
}

/// Reproducible source from a fixed seed
#[derive(Debug)]
pub struct SeededRandom(Mutex<StdRng>);

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self(Mutex::new(StdRng::seed_from_u64(seed)))
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&self) -> f64 {
        let mut rng = match self.0.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        rng.gen::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_random_in_unit_interval() {
        let source = ThreadRandom;
        for _ in 0..10_000 {
            let r = source.next_unit();
            assert!((0.0..1.0).contains(&r), "out of range: {}", r);
        }
    }

    #[test]
    fn test_fixed_random_clamped() {
        assert_eq!(FixedRandom::new(0.6).next_unit(), 0.6);
        assert_eq!(FixedRandom::new(-1.0).next_unit(), 0.0);
        assert!(FixedRandom::new(1.0).next_unit() < 1.0);
    }

    #[test]
    fn test_seeded_random_reproducible() {
        let a = SeededRandom::new(99);
        let b = SeededRandom::new(99);
        for _ in 0..50 {
            assert_eq!(a.next_unit(), b.next_unit());
        }
    }

    #[test]
    fn test_arc_dyn_source() {
        let source: Arc<dyn RandomSource> = Arc::new(FixedRandom::new(0.25));
        assert_eq!(source.next_unit(), 0.25);
    }
}
