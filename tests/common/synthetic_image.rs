#![allow(dead_code)]

use local_resolution::ImageF64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

/// Image holding `value` everywhere.
pub fn constant(n: usize, value: f64) -> ImageF64 {
    assert!(n > 0, "image size must be positive");
    ImageF64::from_fn(n, n, |_, _| value)
}

/// `offset + cos(π·row / width)`: along the row axis this matches the
/// `cos(πx)` basis column exactly at half-width `width`.
pub fn row_sinusoid(n: usize, width: usize, offset: f64) -> ImageF64 {
    assert!(width > 0, "width must be positive");
    ImageF64::from_fn(n, n, |_, y| offset + (PI * y as f64 / width as f64).cos())
}

/// Seeded uniform noise in `[-amplitude, amplitude]` plus `offset`.
pub fn noise(n: usize, seed: u64, offset: f64, amplitude: f64) -> ImageF64 {
    let mut rng = StdRng::seed_from_u64(seed);
    ImageF64::from_fn(n, n, |_, _| offset + amplitude * rng.random_range(-1.0..=1.0))
}

/// Sum of two images of the same size.
pub fn add(a: &ImageF64, b: &ImageF64) -> ImageF64 {
    assert_eq!((a.w, a.h), (b.w, b.h), "images must share a shape");
    ImageF64::from_fn(a.w, a.h, |x, y| a.get(x, y) + b.get(x, y))
}
