//! Error types for the decoded-position pipeline
//!
//! Data errors are recoverable (bad input files). Cache and encoder errors
//! indicate an inconsistency between pipeline stages and should never occur
//! under a correct configuration; callers are expected to surface them loudly.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating decoded position data
#[derive(Debug, Error)]
pub enum DataError {
    /// Input did not match the decoded position data shape
    #[error("Not decoded linear position data: {0}")]
    Parse(String),

    /// Sample arrays disagree with the frame bounds
    #[error("frameBounds sum to {frame_total} samples but values has {values} and positions has {positions}")]
    SampleCountMismatch {
        frame_total: usize,
        values: usize,
        positions: usize,
    },

    /// A position bin index that the positions key cannot label
    #[error("Position index {position} at sample {sample} exceeds positions key length {key_len}")]
    PositionOutOfRange {
        sample: usize,
        position: u32,
        key_len: usize,
    },

    /// Observed positions must share the native time indexing
    #[error("observedPositions has {observed} entries but there are {frames} frames")]
    ObservedLengthMismatch { observed: usize, frames: usize },

    /// Positions key must be non-empty with a positive first bin
    #[error("positionsKey must be non-empty and start above zero")]
    InvalidPositionsKey,

    /// Sampling frequency must be finite and positive
    #[error("Invalid sampling frequency: {0} Hz")]
    InvalidSamplingFrequency(f64),

    /// IO error while reading a data file
    #[error("Failed to read data file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by the offscreen canvas cache
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CacheError {
    /// The requested window cannot fit in the backing canvas at this scale
    #[error("Requested window {start}-{end} does not fit in canvas width {canvas_width} at scale factor {scale}")]
    WindowTooWide {
        start: usize,
        end: usize,
        canvas_width: usize,
        scale: usize,
    },
}

/// Errors raised by the sparse run encoder
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    /// A run was opened for a value that was not seeded from the frame
    #[error("Attempted to open a run with value {value} but that key was never seeded")]
    UnseededValue { value: u32 },
}

/// Errors raised while refreshing the heatmap plot
#[derive(Debug, Error)]
pub enum PlotError {
    /// Building the lines representation failed
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// The visible window did not fit the offscreen canvas
    #[error(transparent)]
    Cache(#[from] CacheError),
}
