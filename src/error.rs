use thiserror::Error;

/// Errors surfaced by the local resolution pipeline.
///
/// Degenerate (all-zero) windows and rank-deficient design matrices are
/// handled inside the solver and never show up here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolutionError {
    #[error("invalid input shape: {0}")]
    InvalidInputShape(String),
    #[error("mask has no foreground pixels")]
    EmptyMask,
    #[error("invalid parameters: {0}")]
    InvalidParams(String),
    #[error("no critical value for {dof} degrees of freedom (table covers {min}..={max})")]
    CriticalValueLookupMiss { dof: usize, min: usize, max: usize },
    #[error("F distribution unavailable: {0}")]
    Distribution(String),
}

pub type Result<T> = std::result::Result<T, ResolutionError>;
