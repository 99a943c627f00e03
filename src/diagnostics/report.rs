use super::TimingBreakdown;
use crate::aggregate::ResolutionMap;
use crate::estimator::ResolutionParams;
use crate::sweep::WidthSummary;
use crate::volume::WidthVolume;
use serde::Serialize;

/// Result produced by
/// [`ResolutionEstimator::estimate_with_diagnostics`](crate::ResolutionEstimator).
pub struct ResolutionReport {
    pub map: ResolutionMap,
    pub volumes: ResolutionVolumes,
    pub trace: EstimationTrace,
}

/// Per-width F, critical-value and ratio volumes.
pub struct ResolutionVolumes {
    pub f_stat: WidthVolume,
    pub critical: WidthVolume,
    pub ratio: WidthVolume,
}

/// Serializable summary of one estimator run.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimationTrace {
    pub input: InputDescriptor,
    pub params: ResolutionParams,
    pub timings: TimingBreakdown,
    pub widths: Vec<WidthSummary>,
    pub resolved: usize,
    pub histogram: Vec<usize>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDescriptor {
    pub size: usize,
    pub foreground: usize,
}
