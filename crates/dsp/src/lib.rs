pub mod bits;
pub mod coarse;
pub mod dpll;
pub mod freq_est;

use thiserror::Error;

/// Errors produced by the numerical pipeline stages.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DspError {
    /// A stage was handed a zero-length sample block.
    #[error("empty sample block")]
    EmptyBlock,

    /// The block is shorter than the stage's fixed transform size.
    #[error("sample block too short: got {got}, need {need}")]
    ShortBlock { got: usize, need: usize },

    /// The DPLL loop filter left its sane operating range. Tracking output
    /// for the block is discarded rather than propagated as garbage.
    #[error("carrier tracking diverged at sample {index} (|loop filter| = {magnitude})")]
    TrackingDiverged { index: usize, magnitude: f32 },
}
