#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod aggregate;
pub mod diagnostics;
pub mod error;
pub mod estimator;
pub mod image;
pub mod volume;

// Building blocks of the estimator, public for tools and tests.
pub mod critical;
pub mod directions;
pub mod kernel;
pub mod solver;
pub mod sweep;

#[cfg(test)]
pub(crate) mod testing;

// --- High-level re-exports -------------------------------------------------

pub use crate::aggregate::ResolutionMap;
pub use crate::error::{ResolutionError, Result};
pub use crate::estimator::{ResolutionEstimator, ResolutionParams};
pub use crate::image::{ImageF64, Mask};

pub use crate::diagnostics::{EstimationTrace, ResolutionReport};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use local_resolution::prelude::*;
///
/// # fn main() -> Result<(), ResolutionError> {
/// let n = 64usize;
/// let image = ImageF64::from_fn(n, n, |x, y| ((x as f64) * 0.7).sin() + (y as f64 * 0.3).cos());
/// let mask = Mask::full(n, n);
///
/// let estimator = ResolutionEstimator::new(ResolutionParams::default())?;
/// let map = estimator.estimate(&image, &mask)?;
/// println!("resolved={} of {}", map.resolved_count(), mask.count());
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::{ImageF64, Mask, ResolutionError, ResolutionEstimator, ResolutionParams};
}
