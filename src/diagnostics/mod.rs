//! Diagnostics returned next to the resolution map: timings, per-width
//! summaries and the full F / critical / ratio volumes.
pub mod report;
pub mod timing;

pub use report::{EstimationTrace, InputDescriptor, ResolutionReport, ResolutionVolumes};
pub use timing::{StageTiming, TimingBreakdown};
