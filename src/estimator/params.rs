//! Parameters of the local resolution estimator.
//!
//! Defaults follow the usual cryo-EM setup: widths 2..=10, a 0.999
//! significance level and four directions (`π/4` steps). Every field is
//! optional when deserializing, so configs only name what they change.

use crate::critical::{CriticalMethod, CriticalSettings, TABLE_MIN_DOF};
use crate::directions::direction_count;
use crate::error::{ResolutionError, Result};
use crate::sweep::BoundaryPolicy;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_4, PI};
use std::ops::RangeInclusive;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ResolutionParams {
    /// Smallest window half-width analysed (>= 1).
    pub width0: usize,
    /// Largest window half-width; also the "unresolved" sentinel.
    pub width_max: usize,
    /// Significance level of the F-test, in (0, 1).
    pub alpha: f64,
    /// Angular step between sinusoid directions (radians, in (0, π]).
    pub angle_step: f64,
    /// Grid spacing of the discretized CDF search.
    pub step_size: f64,
    /// Upper end of the discretized CDF search.
    pub cdf_upper_bound: f64,
    /// How critical values are derived from the F distribution.
    pub critical_method: CriticalMethod,
    /// Treatment of windows reaching past the image border.
    pub boundary: BoundaryPolicy,
    /// Relative cutoff below which singular values are treated as zero.
    pub svd_tolerance: f64,
    /// Multiple of the window's rounding floor `(ε·max|w|)²·Σk` below which
    /// the constant-fit RSS counts as flat (F = 0).
    pub flat_tolerance: f64,
}

impl Default for ResolutionParams {
    fn default() -> Self {
        Self {
            width0: 2,
            width_max: 10,
            alpha: 1.0 - 1e-3,
            angle_step: FRAC_PI_4,
            step_size: 1e-2,
            cdf_upper_bound: 100.0,
            critical_method: CriticalMethod::Grid,
            boundary: BoundaryPolicy::Skip,
            svd_tolerance: 1e-10,
            flat_tolerance: 1e6,
        }
    }
}

impl ResolutionParams {
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(ResolutionError::InvalidParams(msg));
        if self.width0 == 0 {
            return invalid("width0 must be at least 1".into());
        }
        if self.width0 > self.width_max {
            return invalid(format!(
                "width range {}..={} is empty",
                self.width0, self.width_max
            ));
        }
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return invalid(format!("alpha {} outside (0, 1)", self.alpha));
        }
        if !(self.angle_step.is_finite() && self.angle_step > 0.0 && self.angle_step <= PI) {
            return invalid(format!("angle step {} outside (0, π]", self.angle_step));
        }
        if !(self.step_size.is_finite() && self.step_size > 0.0) {
            return invalid(format!("step size {} must be positive", self.step_size));
        }
        if !(self.cdf_upper_bound.is_finite() && self.cdf_upper_bound >= self.step_size) {
            return invalid(format!(
                "CDF upper bound {} must be at least the step size",
                self.cdf_upper_bound
            ));
        }
        if !(self.svd_tolerance >= 0.0 && self.flat_tolerance >= 0.0) {
            return invalid("tolerances must be non-negative".into());
        }
        Ok(())
    }

    pub fn widths(&self) -> RangeInclusive<usize> {
        self.width0..=self.width_max
    }

    pub fn width_count(&self) -> usize {
        self.widths().count()
    }

    /// Samples in the largest window.
    pub fn max_dof(&self) -> usize {
        window_dof(self.width_max)
    }

    /// Sinusoidal-model parameter count implied by `angle_step`.
    pub fn num_comb(&self) -> usize {
        1 + 2 * direction_count(self.angle_step)
    }

    /// Critical-table settings covering every analysed width.
    pub fn critical_settings(&self) -> CriticalSettings {
        CriticalSettings {
            alpha: self.alpha,
            num_comb: self.num_comb(),
            min_dof: TABLE_MIN_DOF.min(window_dof(self.width0)),
            max_dof: self.max_dof(),
            step_size: self.step_size,
            upper_bound: self.cdf_upper_bound,
            method: self.critical_method,
        }
    }
}

/// Samples in a window of half-width `width`.
#[inline]
pub fn window_dof(width: usize) -> usize {
    let side = 2 * width + 1;
    side * side
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let params = ResolutionParams::default();
        params.validate().unwrap();
        assert_eq!(params.width_count(), 9);
        assert_eq!(params.max_dof(), 441);
        assert_eq!(params.num_comb(), 9);
        let settings = params.critical_settings();
        assert_eq!((settings.min_dof, settings.max_dof), (10, 441));
    }

    #[test]
    fn small_first_width_extends_table_down() {
        let params = ResolutionParams {
            width0: 1,
            width_max: 1,
            ..Default::default()
        };
        assert_eq!(params.critical_settings().min_dof, 9);
    }

    #[test]
    fn rejects_bad_parameters() {
        let cases = [
            ResolutionParams {
                width0: 0,
                ..Default::default()
            },
            ResolutionParams {
                width0: 5,
                width_max: 4,
                ..Default::default()
            },
            ResolutionParams {
                alpha: 1.0,
                ..Default::default()
            },
            ResolutionParams {
                angle_step: 4.0,
                ..Default::default()
            },
            ResolutionParams {
                step_size: 0.0,
                ..Default::default()
            },
            ResolutionParams {
                cdf_upper_bound: f64::INFINITY,
                ..Default::default()
            },
        ];
        for params in cases {
            assert!(
                matches!(params.validate(), Err(ResolutionError::InvalidParams(_))),
                "expected rejection of {params:?}"
            );
        }
    }

    #[test]
    fn partial_json_overrides_defaults() {
        let params: ResolutionParams = serde_json::from_str(
            r#"{ "width_max": 6, "critical_method": "quantile", "boundary": "reflect" }"#,
        )
        .unwrap();
        assert_eq!(params.width0, 2);
        assert_eq!(params.width_max, 6);
        assert_eq!(params.critical_method, CriticalMethod::Quantile);
        assert_eq!(params.boundary, BoundaryPolicy::Reflect);
    }
}
