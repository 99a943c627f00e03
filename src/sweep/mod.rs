//! Width sweep: F statistics and critical values for every width.
//!
//! For each width the sweep builds one [`WidthContext`], extracts the
//! foreground windows into a packed arena, solves every window (in parallel
//! with the `parallel` feature) and scatters
//!
//! ```text
//! F = ((RSS_const - RSS_sincos) / (p1 - p0)) / (RSS_sincos / (dof - p1))
//! ```
//!
//! together with the table's critical value into that width's planes. Pixels
//! outside the mask, or skipped at the border, keep zero in both planes.
//! Widths run sequentially and the arena and context are dropped before the
//! next width starts.
pub mod extract;

pub use extract::{BoundaryPolicy, WindowArena};

use crate::critical::CriticalValueTable;
use crate::error::Result;
use crate::estimator::ResolutionParams;
use crate::image::ImageF64;
use crate::solver::{LocalFit, WidthContext};
use crate::volume::WidthVolume;
use log::debug;
use serde::Serialize;
use std::time::Instant;

/// Per-width bookkeeping reported alongside the volumes.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidthSummary {
    pub width: usize,
    pub dof: usize,
    pub num_comb: usize,
    pub rank: usize,
    pub critical_value: f64,
    pub fitted: usize,
    pub skipped: usize,
    pub significant: usize,
    pub elapsed_ms: f64,
}

/// F and critical-value planes for one width.
pub struct WidthLevel {
    pub f_stat: ImageF64,
    pub critical: ImageF64,
    pub summary: WidthSummary,
}

/// F and critical-value volumes for the whole width range.
pub struct SweepOutput {
    pub f_stat: WidthVolume,
    pub critical: WidthVolume,
    pub summaries: Vec<WidthSummary>,
}

pub struct WidthSweep<'a> {
    params: &'a ResolutionParams,
    table: &'a CriticalValueTable,
}

impl<'a> WidthSweep<'a> {
    pub fn new(params: &'a ResolutionParams, table: &'a CriticalValueTable) -> Self {
        Self { params, table }
    }

    /// Sweep `width0..=width_max` over the foreground pixels `coords`.
    pub fn run(&self, image: &ImageF64, coords: &[(usize, usize)]) -> Result<SweepOutput> {
        let levels = self.params.width_count();
        let mut f_planes = Vec::with_capacity(levels);
        let mut crit_planes = Vec::with_capacity(levels);
        let mut summaries = Vec::with_capacity(levels);
        for width in self.params.widths() {
            let level = self.sweep_width(image, coords, width)?;
            f_planes.push(level.f_stat);
            crit_planes.push(level.critical);
            summaries.push(level.summary);
        }
        Ok(SweepOutput {
            f_stat: WidthVolume::new(self.params.width0, f_planes),
            critical: WidthVolume::new(self.params.width0, crit_planes),
            summaries,
        })
    }

    pub fn sweep_width(
        &self,
        image: &ImageF64,
        coords: &[(usize, usize)],
        width: usize,
    ) -> Result<WidthLevel> {
        let start = Instant::now();
        let ctx = WidthContext::new(width, self.params.angle_step, self.params.svd_tolerance);
        let dof = ctx.dof();
        let critical_value = self.table.lookup(dof)?;
        let arena = WindowArena::extract(image, coords, width, self.params.boundary);
        let stats = solve_windows(&ctx, &arena, self.params.flat_tolerance)?;

        let mut f_stat = ImageF64::new(image.w, image.h);
        let mut critical = ImageF64::new(image.w, image.h);
        let mut significant = 0;
        for (&(x, y), &f) in arena.pixels.iter().zip(&stats) {
            f_stat.set(x, y, f);
            critical.set(x, y, critical_value);
            if f > critical_value {
                significant += 1;
            }
        }
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        debug!(
            "width {width}: dof={dof} crit={critical_value:.3} fitted={} skipped={} significant={significant} rank={}/{} ({elapsed_ms:.2} ms)",
            arena.len(),
            arena.skipped,
            ctx.rank(),
            ctx.num_comb()
        );
        Ok(WidthLevel {
            f_stat,
            critical,
            summary: WidthSummary {
                width,
                dof,
                num_comb: ctx.num_comb(),
                rank: ctx.rank(),
                critical_value,
                fitted: arena.len(),
                skipped: arena.skipped,
                significant,
                elapsed_ms,
            },
        })
    }
}

fn solve_windows(ctx: &WidthContext, arena: &WindowArena, flat_tolerance: f64) -> Result<Vec<f64>> {
    #[cfg(feature = "parallel")]
    {
        solve_windows_parallel(ctx, arena, flat_tolerance)
    }
    #[cfg(not(feature = "parallel"))]
    {
        solve_windows_serial(ctx, arena, flat_tolerance)
    }
}

#[cfg_attr(feature = "parallel", allow(dead_code))]
fn solve_windows_serial(
    ctx: &WidthContext,
    arena: &WindowArena,
    flat_tolerance: f64,
) -> Result<Vec<f64>> {
    let dof = ctx.dof();
    (0..arena.len())
        .map(|i| {
            ctx.solve(arena.window(i))
                .map(|fit| f_statistic(&fit, dof, flat_tolerance))
        })
        .collect()
}

#[cfg(feature = "parallel")]
fn solve_windows_parallel(
    ctx: &WidthContext,
    arena: &WindowArena,
    flat_tolerance: f64,
) -> Result<Vec<f64>> {
    use rayon::prelude::*;

    let dof = ctx.dof();
    arena
        .values
        .par_chunks(arena.window_len())
        .map(|window| {
            ctx.solve(window)
                .map(|fit| f_statistic(&fit, dof, flat_tolerance))
        })
        .collect()
}

/// Nested-model F statistic of the sinusoidal fit against the constant fit.
///
/// Flat windows (`RSS_const ≤ flat_tolerance · (ε·max|w|)² · Σk`, the RSS a
/// constant window reaches through rounding), negative reductions
/// and models without extra parameters or residual dof report 0. A perfect
/// sinusoidal fit with a positive reduction reports `+∞`.
pub fn f_statistic(fit: &LocalFit, dof: usize, flat_tolerance: f64) -> f64 {
    if fit.p1 <= fit.p0 || dof <= fit.p1 {
        return 0.0;
    }
    if fit.rss_const <= flat_tolerance * fit.rounding_floor {
        return 0.0;
    }
    let reduction = fit.rss_const - fit.rss_sincos;
    if !(reduction > 0.0) {
        return 0.0;
    }
    let numerator = reduction / (fit.p1 - fit.p0) as f64;
    let denominator = fit.rss_sincos.max(0.0) / (dof - fit.p1) as f64;
    if denominator == 0.0 {
        return f64::INFINITY;
    }
    numerator / denominator
}
