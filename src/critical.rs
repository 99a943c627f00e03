//! Critical F values per window degrees of freedom.
//!
//! For a window of `dof` samples the sinusoidal model spends `num_comb`
//! parameters and the constant model one, so the reference distribution is
//! `F(num_comb - 1, dof - num_comb)`. The table is built once per run and
//! indexed by `dof`.
//!
//! Two constructions are supported:
//! - [`CriticalMethod::Grid`] scans the CDF on a uniform grid
//!   `k * step_size` (up to `cdf_upper_bound`) and keeps the first grid point
//!   whose CDF strictly exceeds `alpha`. The CDF is monotone, so the first
//!   crossing is located by bisection instead of evaluating every grid point.
//! - [`CriticalMethod::Quantile`] takes the distribution's inverse CDF.
use crate::error::{ResolutionError, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, FisherSnedecor};

/// Lowest degrees of freedom the table is populated for, unless the smallest
/// analysed window is smaller still.
pub const TABLE_MIN_DOF: usize = 10;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CriticalMethod {
    /// First grid point whose CDF exceeds `alpha`.
    #[default]
    Grid,
    /// Exact inverse CDF at `alpha`.
    Quantile,
}

/// Settings used to build a [`CriticalValueTable`].
#[derive(Clone, Copy, Debug)]
pub struct CriticalSettings {
    pub alpha: f64,
    pub num_comb: usize,
    pub min_dof: usize,
    pub max_dof: usize,
    pub step_size: f64,
    pub upper_bound: f64,
    pub method: CriticalMethod,
}

#[derive(Clone, Debug)]
pub struct CriticalValueTable {
    min_dof: usize,
    values: Vec<Option<f64>>,
}

impl CriticalValueTable {
    pub fn build(settings: &CriticalSettings) -> Result<Self> {
        let CriticalSettings {
            alpha,
            num_comb,
            min_dof,
            max_dof,
            step_size,
            upper_bound,
            method,
        } = *settings;
        if min_dof > max_dof {
            return Err(ResolutionError::InvalidParams(format!(
                "critical table range {min_dof}..={max_dof} is empty"
            )));
        }
        let mut values = vec![None; max_dof - min_dof + 1];
        for (slot, dof) in values.iter_mut().zip(min_dof..=max_dof) {
            // Windows with no residual degrees of freedom cannot be tested.
            if num_comb < 2 || dof <= num_comb {
                continue;
            }
            let dist = FisherSnedecor::new((num_comb - 1) as f64, (dof - num_comb) as f64)
                .map_err(|e| ResolutionError::Distribution(e.to_string()))?;
            let value = match method {
                CriticalMethod::Grid => grid_critical_value(&dist, alpha, step_size, upper_bound),
                CriticalMethod::Quantile => dist.inverse_cdf(alpha),
            };
            *slot = Some(value);
        }
        debug!(
            "critical table: alpha={alpha} num_comb={num_comb} dof={min_dof}..={max_dof} method={method:?}"
        );
        Ok(Self {
            min_dof,
            values,
        })
    }

    /// Critical value for `dof`, failing for dofs the table does not cover.
    pub fn lookup(&self, dof: usize) -> Result<f64> {
        dof.checked_sub(self.min_dof)
            .and_then(|i| self.values.get(i).copied().flatten())
            .ok_or(ResolutionError::CriticalValueLookupMiss {
                dof,
                min: self.min_dof,
                max: self.max_dof(),
            })
    }

    pub fn min_dof(&self) -> usize {
        self.min_dof
    }

    pub fn max_dof(&self) -> usize {
        self.min_dof + self.values.len() - 1
    }

    /// Populated `(dof, critical value)` pairs in increasing dof order.
    pub fn entries(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter_map(move |(i, v)| v.map(|v| (self.min_dof + i, v)))
    }
}

/// First grid point `k * step` whose CDF strictly exceeds `alpha`.
///
/// Returns `(last + 1) * step` when no grid point crosses `alpha`.
fn grid_critical_value(dist: &FisherSnedecor, alpha: f64, step: f64, upper_bound: f64) -> f64 {
    let points = (upper_bound / step).round() as usize + 1;
    let mut lo = 0usize;
    let mut hi = points;
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if dist.cdf(mid as f64 * step) > alpha {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }
    if lo == points {
        warn!(
            "F CDF stays below alpha={alpha} up to {upper_bound}; critical value saturates"
        );
    }
    lo as f64 * step
}
