//! Seeded sample generators for unit tests.
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// `len` values drawn uniformly from `[-1, 1]`, reproducible per `seed`.
pub fn uniform_window(len: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.random_range(-1.0..=1.0)).collect()
}
