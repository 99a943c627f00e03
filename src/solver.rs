//! Weighted local regression for one window width.
//!
//! A [`WidthContext`] holds everything that depends only on the width: the
//! kernel weights `k`, the design matrix `A` (constant + sin/cos pair per
//! direction) and the weighted pseudo-inverse
//!
//! ```text
//! H = V · S⁺ · Uᵀ · diag(√k),   U S Vᵀ = diag(√k) · A
//! ```
//!
//! so that `H · w` is the weighted least-squares coefficient vector for a
//! window `w`. The context is built once per width and shared by reference by
//! every pixel solve at that width.
//!
//! Singular values at or below `svd_tolerance · s_max` get a zero reciprocal,
//! which keeps rank-deficient direction sets (e.g. `sin(πx)` vanishing on a
//! 3-sample axis) finite instead of failing.
use crate::directions::{DirectionBasis, WindowGrid};
use crate::error::{ResolutionError, Result};
use crate::kernel::kernel_weights;
use log::debug;
use nalgebra::{DMatrix, DVector};
use std::f64::consts::PI;

/// Residual sums of squares of both local models for one window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalFit {
    /// Weighted RSS of the constant model.
    pub rss_const: f64,
    /// Weighted RSS of the sinusoidal model.
    pub rss_sincos: f64,
    /// Parameters of the sinusoidal model (`num_comb`).
    pub p1: usize,
    /// Parameters of the constant model (always 1).
    pub p0: usize,
    /// RSS a flat window can reach through rounding alone,
    /// `(ε · max|w|)² · Σk`.
    pub rounding_floor: f64,
}

/// Fitted coefficients of both local models for one window.
#[derive(Clone, Debug, PartialEq)]
pub struct Coefficients {
    pub constant: f64,
    pub sincos: DVector<f64>,
}

/// Immutable per-width regression state.
#[derive(Clone, Debug)]
pub struct WidthContext {
    width: usize,
    kernel: DVector<f64>,
    kernel_sum: f64,
    design: DMatrix<f64>,
    pinv: DMatrix<f64>,
    rank: usize,
}

impl WidthContext {
    pub fn new(width: usize, angle_step: f64, svd_tolerance: f64) -> Self {
        let grid = WindowGrid::new(width);
        let basis = DirectionBasis::new(&grid, angle_step);
        let kernel = DVector::from_vec(kernel_weights(&grid.x, &grid.y));
        let kernel_sum = kernel.sum();
        let design = design_matrix(&basis);
        let (pinv, rank) = weighted_pseudo_inverse(&design, &kernel, svd_tolerance);
        if rank < design.ncols() {
            debug!(
                "width {width}: weighted design matrix has rank {rank} of {} columns",
                design.ncols()
            );
        }
        Self {
            width,
            kernel,
            kernel_sum,
            design,
            pinv,
            rank,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Samples per window (`(2·width + 1)²`), also the F-test dof.
    #[inline]
    pub fn dof(&self) -> usize {
        self.design.nrows()
    }

    /// Number of sinusoidal-model parameters.
    #[inline]
    pub fn num_comb(&self) -> usize {
        self.design.ncols()
    }

    /// Effective rank of the weighted design matrix.
    #[inline]
    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn design(&self) -> &DMatrix<f64> {
        &self.design
    }

    pub fn pseudo_inverse(&self) -> &DMatrix<f64> {
        &self.pinv
    }

    /// Coefficients of the constant and sinusoidal fits.
    ///
    /// An all-zero window has no scale; both fits are zero.
    pub fn coefficients(&self, window: &[f64]) -> Result<Coefficients> {
        self.check_len(window)?;
        let data = DVector::from_column_slice(window);
        let constant = self.kernel.dot(&data) / self.kernel_sum;
        let peak = data.amax();
        let sincos = if peak > 0.0 && peak.is_finite() {
            let scale = 1.0 / peak;
            (&self.pinv * (data * scale)) / scale
        } else {
            DVector::zeros(self.num_comb())
        };
        Ok(Coefficients { constant, sincos })
    }

    /// Weighted residual sums of squares of both models for `window`.
    pub fn solve(&self, window: &[f64]) -> Result<LocalFit> {
        let coef = self.coefficients(window)?;
        let fit = &self.design * &coef.sincos;
        let mut rss_const = 0.0;
        let mut rss_sincos = 0.0;
        for (i, &w) in window.iter().enumerate() {
            let k = self.kernel[i];
            let rc = w - coef.constant;
            let rs = w - fit[i];
            rss_const += k * rc * rc;
            rss_sincos += k * rs * rs;
        }
        Ok(LocalFit {
            rss_const,
            rss_sincos,
            p1: self.num_comb(),
            p0: 1,
            rounding_floor: rounding_floor(window, self.kernel_sum),
        })
    }

    fn check_len(&self, window: &[f64]) -> Result<()> {
        if window.len() != self.dof() {
            return Err(ResolutionError::InvalidInputShape(format!(
                "window of {} samples passed to width {} (expects {})",
                window.len(),
                self.width,
                self.dof()
            )));
        }
        Ok(())
    }
}

fn rounding_floor(window: &[f64], kernel_sum: f64) -> f64 {
    let peak = window.iter().fold(0.0f64, |m, &w| m.max(w.abs()));
    let eps = f64::EPSILON * peak;
    eps * eps * kernel_sum
}

/// Design matrix: column 0 all ones, columns `2i+1, 2i+2` hold
/// `sin(π·d_i)` and `cos(π·d_i)` for direction `i`.
pub fn design_matrix(basis: &DirectionBasis) -> DMatrix<f64> {
    let rows = basis.projections.nrows();
    DMatrix::from_fn(rows, basis.num_comb(), |r, c| {
        if c == 0 {
            return 1.0;
        }
        let d = basis.projections[(r, (c - 1) / 2)];
        if c % 2 == 1 {
            (PI * d).sin()
        } else {
            (PI * d).cos()
        }
    })
}

/// `V · S⁺ · Uᵀ · diag(√k)` and the number of retained singular values.
fn weighted_pseudo_inverse(
    design: &DMatrix<f64>,
    kernel: &DVector<f64>,
    tolerance: f64,
) -> (DMatrix<f64>, usize) {
    let sqrt_k = kernel.map(f64::sqrt);
    let mut weighted = design.clone();
    for (r, mut row) in weighted.row_iter_mut().enumerate() {
        row *= sqrt_k[r];
    }
    let svd = weighted.svd(true, true);
    let (u, v_t) = match (svd.u, svd.v_t) {
        (Some(u), Some(v_t)) => (u, v_t),
        _ => return (DMatrix::zeros(design.ncols(), design.nrows()), 0),
    };
    let s_max = svd.singular_values.max();
    let cutoff = tolerance * s_max;
    let mut rank = 0;
    let s_inv = svd.singular_values.map(|s| {
        if s > cutoff && s > 0.0 {
            rank += 1;
            1.0 / s
        } else {
            0.0
        }
    });
    // (V · S⁺) · Uᵀ, then scale columns by √k.
    let mut v_s = v_t.transpose();
    for (c, mut col) in v_s.column_iter_mut().enumerate() {
        col *= s_inv[c];
    }
    let mut pinv = v_s * u.transpose();
    for (c, mut col) in pinv.column_iter_mut().enumerate() {
        col *= sqrt_k[c];
    }
    (pinv, rank)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directions::WindowGrid;
    use crate::testing::uniform_window;
    use std::f64::consts::FRAC_PI_4;

    #[test]
    fn design_matrix_has_constant_and_sincos_columns() {
        let ctx = WidthContext::new(2, FRAC_PI_4, 1e-10);
        assert_eq!(ctx.dof(), 25);
        assert_eq!(ctx.num_comb(), 9);
        let grid = WindowGrid::new(2);
        for r in 0..ctx.dof() {
            assert_eq!(ctx.design()[(r, 0)], 1.0);
            assert!((ctx.design()[(r, 1)] - (PI * grid.x[r]).sin()).abs() < 1e-12);
            assert!((ctx.design()[(r, 2)] - (PI * grid.x[r]).cos()).abs() < 1e-12);
        }
        assert_eq!(ctx.pseudo_inverse().shape(), (9, 25));
    }

    #[test]
    fn pseudo_inverse_recovers_exact_coefficients() {
        let ctx = WidthContext::new(3, FRAC_PI_4, 1e-10);
        assert_eq!(ctx.rank(), ctx.num_comb());
        let truth = DVector::from_vec(vec![0.5, 1.0, -0.25, 0.0, 0.75, 0.1, 0.0, -0.3, 0.2]);
        let window = ctx.design() * &truth;
        let coef = ctx.coefficients(window.as_slice()).unwrap();
        assert!((coef.sincos - truth).norm() < 1e-9);
    }

    #[test]
    fn sincos_residual_never_exceeds_constant_residual() {
        for width in 1..=6 {
            let ctx = WidthContext::new(width, FRAC_PI_4, 1e-10);
            for seed in 0..5u64 {
                let window = uniform_window(ctx.dof(), seed * 31 + width as u64);
                let fit = ctx.solve(&window).unwrap();
                assert!(
                    fit.rss_sincos <= fit.rss_const + 1e-12,
                    "width {width}: sincos {} > const {}",
                    fit.rss_sincos,
                    fit.rss_const
                );
                assert_eq!((fit.p1, fit.p0), (9, 1));
            }
        }
    }

    #[test]
    fn solve_scales_quadratically() {
        let ctx = WidthContext::new(4, FRAC_PI_4, 1e-10);
        let window = uniform_window(ctx.dof(), 7);
        let base = ctx.solve(&window).unwrap();
        let c = 37.5;
        let scaled: Vec<f64> = window.iter().map(|v| v * c).collect();
        let fit = ctx.solve(&scaled).unwrap();
        assert!((fit.rss_const - c * c * base.rss_const).abs() <= 1e-9 * fit.rss_const);
        assert!((fit.rss_sincos - c * c * base.rss_sincos).abs() <= 1e-9 * fit.rss_sincos);
        let base_coef = ctx.coefficients(&window).unwrap();
        let coef = ctx.coefficients(&scaled).unwrap();
        assert!((coef.sincos - base_coef.sincos * c).norm() < 1e-9 * c);
    }

    #[test]
    fn flat_window_has_no_residual() {
        let ctx = WidthContext::new(2, FRAC_PI_4, 1e-10);
        let fit = ctx.solve(&vec![3.0; ctx.dof()]).unwrap();
        assert!(fit.rss_const < 1e-20);
        assert!(fit.rss_sincos < 1e-20);
        for level in [3.0, -250.0, 1e6] {
            let fit = ctx.solve(&vec![level; ctx.dof()]).unwrap();
            assert!(fit.rounding_floor > 0.0);
            assert!(fit.rss_const <= 1e6 * fit.rounding_floor, "level {level}: {fit:?}");
        }
    }

    #[test]
    fn zero_window_degenerates_to_zero_fit() {
        let ctx = WidthContext::new(2, FRAC_PI_4, 1e-10);
        let coef = ctx.coefficients(&vec![0.0; ctx.dof()]).unwrap();
        assert_eq!(coef.constant, 0.0);
        assert!(coef.sincos.iter().all(|&c| c == 0.0));
        let fit = ctx.solve(&vec![0.0; ctx.dof()]).unwrap();
        assert_eq!((fit.rss_const, fit.rss_sincos, fit.rounding_floor), (0.0, 0.0, 0.0));
    }

    #[test]
    fn rank_deficient_basis_stays_finite() {
        // On a 3-sample axis sin(πx) vanishes for the axis-aligned directions.
        let ctx = WidthContext::new(1, PI / 2.0, 1e-10);
        assert_eq!(ctx.num_comb(), 5);
        assert_eq!(ctx.rank(), 3);
        assert!(ctx.pseudo_inverse().iter().all(|v| v.is_finite()));
        let fit = ctx.solve(&uniform_window(9, 3)).unwrap();
        assert!(fit.rss_sincos.is_finite());
    }

    #[test]
    fn empty_direction_basis_matches_constant_model() {
        let ctx = WidthContext::new(2, 4.0, 1e-10);
        assert_eq!(ctx.num_comb(), 1);
        let window = uniform_window(ctx.dof(), 11);
        let fit = ctx.solve(&window).unwrap();
        assert!((fit.rss_const - fit.rss_sincos).abs() < 1e-12);
    }

    #[test]
    fn wrong_window_length_is_rejected() {
        let ctx = WidthContext::new(2, FRAC_PI_4, 1e-10);
        let err = ctx.solve(&[1.0; 9]).unwrap_err();
        assert!(matches!(err, ResolutionError::InvalidInputShape(_)));
    }
}
