//! Error types for cue sheet operations.

use thiserror::Error;

/// Main error type for cue sheet operations.
#[derive(Error, Debug)]
pub enum CueSheetError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A persisted document is malformed or missing required fields.
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Encode error: {0}")]
    Encode(String),

    /// An update would have produced a range whose start is not before its end.
    /// The target is left unchanged.
    #[error("Inverted range: start {start} is not before end {end}")]
    InvertedRange { start: String, end: String },

    #[error("Invalid timescale: {0} (must be positive)")]
    InvalidTimescale(i64),

    #[error("Invalid seconds value: {0}")]
    InvalidSeconds(f64),

    #[error("Cue not found: {0}")]
    NotFound(String),
}

impl CueSheetError {
    pub(crate) fn inverted(start: impl std::fmt::Display, end: impl std::fmt::Display) -> Self {
        Self::InvertedRange {
            start: start.to_string(),
            end: end.to_string(),
        }
    }
}

/// Result type alias for cue sheet operations.
pub type Result<T> = std::result::Result<T, CueSheetError>;
