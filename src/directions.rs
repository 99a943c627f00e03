//! Window coordinate grid and the rotated projections feeding the
//! sinusoidal basis.
//!
//! Coordinates span `[-1, 1]` along both window axes. Flattening is row-major:
//! `x` follows the window rows (slow axis) and `y` the columns (fast axis),
//! so element `r * side + c` sits at row offset `r - width`, column offset
//! `c - width`.
use log::warn;
use nalgebra::DMatrix;
use std::f64::consts::PI;

/// Flattened window coordinates for one width.
#[derive(Clone, Debug)]
pub struct WindowGrid {
    pub width: usize,
    pub side: usize,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl WindowGrid {
    pub fn new(width: usize) -> Self {
        let side = 2 * width + 1;
        let axis = linspace(-1.0, 1.0, side);
        let mut x = Vec::with_capacity(side * side);
        let mut y = Vec::with_capacity(side * side);
        for &xr in &axis {
            for &yc in &axis {
                x.push(xr);
                y.push(yc);
            }
        }
        Self { width, side, x, y }
    }

    /// Number of samples in the window (`side²`).
    #[inline]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// `n` evenly spaced samples over `[start, end]`, endpoints included.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

/// Number of directions sampled by `angle_step` over the half turn.
pub fn direction_count(angle_step: f64) -> usize {
    if !(angle_step.is_finite() && angle_step > 0.0) {
        return 0;
    }
    // Guard against pi/(pi/k) landing just below k.
    (PI / angle_step + 1e-9).floor() as usize
}

/// Rotated projections of the window grid, one column per direction.
#[derive(Clone, Debug)]
pub struct DirectionBasis {
    pub angle_step: f64,
    pub projections: DMatrix<f64>,
}

impl DirectionBasis {
    pub fn new(grid: &WindowGrid, angle_step: f64) -> Self {
        let count = direction_count(angle_step);
        if count == 0 {
            warn!(
                "angle step {angle_step} yields no directions; sinusoidal fit degenerates to a constant"
            );
        }
        let projections = DMatrix::from_fn(grid.len(), count, |row, i| {
            let theta = i as f64 * angle_step;
            grid.x[row] * theta.cos() + grid.y[row] * theta.sin()
        });
        Self {
            angle_step,
            projections,
        }
    }

    /// Number of directions (columns).
    #[inline]
    pub fn len(&self) -> usize {
        self.projections.ncols()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.projections.ncols() == 0
    }

    /// Number of basis columns of the sinusoidal model (constant + sin/cos pairs).
    #[inline]
    pub fn num_comb(&self) -> usize {
        1 + 2 * self.len()
    }
}
