//! Entry point tying the stages together.
//!
//! 1) Validate the image/mask pair (square, same shape, non-empty mask).
//! 2) Build the critical-value table once for the configured width range.
//! 3) Sweep every width, producing F and critical-value volumes.
//! 4) Aggregate the ratio volume into the resolution map.
//!
//! The estimator keeps its table between calls, so one instance can process
//! several maps with the same parameters.
pub mod params;

pub use params::{window_dof, ResolutionParams};

use crate::aggregate::{aggregate, ResolutionMap};
use crate::critical::CriticalValueTable;
use crate::diagnostics::{
    EstimationTrace, InputDescriptor, ResolutionReport, ResolutionVolumes, TimingBreakdown,
};
use crate::error::{ResolutionError, Result};
use crate::image::{ImageF64, ImageView, Mask};
use crate::sweep::WidthSweep;
use log::debug;
use std::time::Instant;

pub struct ResolutionEstimator {
    params: ResolutionParams,
    table: CriticalValueTable,
    table_ms: f64,
}

impl ResolutionEstimator {
    pub fn new(params: ResolutionParams) -> Result<Self> {
        params.validate()?;
        let start = Instant::now();
        let table = CriticalValueTable::build(&params.critical_settings())?;
        let table_ms = start.elapsed().as_secs_f64() * 1000.0;
        debug!(
            "ResolutionEstimator::new critical table dof {}..={} in {table_ms:.2} ms",
            table.min_dof(),
            table.max_dof()
        );
        Ok(Self {
            params,
            table,
            table_ms,
        })
    }

    pub fn params(&self) -> &ResolutionParams {
        &self.params
    }

    pub fn critical_table(&self) -> &CriticalValueTable {
        &self.table
    }

    /// Resolution map of `image` over the foreground of `mask`.
    pub fn estimate(&self, image: &ImageF64, mask: &Mask) -> Result<ResolutionMap> {
        Ok(self.estimate_with_diagnostics(image, mask)?.map)
    }

    /// Resolution map plus the per-width volumes and a timing trace.
    pub fn estimate_with_diagnostics(
        &self,
        image: &ImageF64,
        mask: &Mask,
    ) -> Result<ResolutionReport> {
        let t0 = Instant::now();
        validate_inputs(image, mask)?;
        let coords = mask.coords();

        let sweep_start = Instant::now();
        let sweep = WidthSweep::new(&self.params, &self.table).run(image, &coords)?;
        let sweep_ms = sweep_start.elapsed().as_secs_f64() * 1000.0;

        let agg_start = Instant::now();
        let agg = aggregate(&sweep.f_stat, &sweep.critical, mask, self.params.width_max);
        let agg_ms = agg_start.elapsed().as_secs_f64() * 1000.0;

        let mut timings = TimingBreakdown::with_total(t0.elapsed().as_secs_f64() * 1000.0);
        timings.push("critical_table", self.table_ms);
        timings.push("width_sweep", sweep_ms);
        timings.push("aggregate", agg_ms);

        let resolved = agg.map.resolved_count();
        debug!(
            "ResolutionEstimator::estimate n={} foreground={} resolved={resolved} total={:.2} ms",
            image.w,
            coords.len(),
            timings.total_ms
        );
        let trace = EstimationTrace {
            input: InputDescriptor {
                size: image.w,
                foreground: coords.len(),
            },
            params: self.params.clone(),
            timings,
            widths: sweep.summaries,
            resolved,
            histogram: agg.map.histogram(),
        };
        Ok(ResolutionReport {
            map: agg.map,
            volumes: ResolutionVolumes {
                f_stat: sweep.f_stat,
                critical: sweep.critical,
                ratio: agg.ratio,
            },
            trace,
        })
    }
}

/// Square, non-empty image with a same-shaped mask holding at least one
/// foreground pixel.
pub fn validate_inputs(image: &ImageF64, mask: &Mask) -> Result<()> {
    if image.width() == 0 || image.height() == 0 {
        return Err(ResolutionError::InvalidInputShape("image is empty".into()));
    }
    if !image.is_square() {
        return Err(ResolutionError::InvalidInputShape(format!(
            "image is {}x{}, expected square",
            image.width(),
            image.height()
        )));
    }
    if image.data.len() != image.w * image.h {
        return Err(ResolutionError::InvalidInputShape(format!(
            "image buffer holds {} values, expected {}",
            image.data.len(),
            image.w * image.h
        )));
    }
    if !image.same_shape(mask) || mask.data.len() != mask.w * mask.h {
        return Err(ResolutionError::InvalidInputShape(format!(
            "mask is {}x{}, image is {}x{}",
            mask.width(),
            mask.height(),
            image.width(),
            image.height()
        )));
    }
    if mask.count() == 0 {
        return Err(ResolutionError::EmptyMask);
    }
    Ok(())
}
