//! Cue Sheet Core - Foundation types for cue sheets
//!
//! This crate provides the fundamental types used by the cue sheet model:
//! - Time representation (Timecode, CueRange)
//! - Name collation for cue lists
//! - Error types

pub mod collate;
pub mod error;
pub mod time;

pub use collate::standard_compare;
pub use error::{CueSheetError, Result};
pub use time::{CueRange, Timecode};

/// Timescale constants, in ticks per second.
pub mod timescale {
    /// Nanoseconds per second.
    pub const NSEC_PER_SEC: i32 = 1_000_000_000;

    /// Finest scale used when converting from floating-point seconds.
    pub const MAX_RESOLUTION: i32 = NSEC_PER_SEC;

    /// Scale a new cue sheet uses for seconds-based input.
    pub const DEFAULT: i32 = MAX_RESOLUTION;
}
