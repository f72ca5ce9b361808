//! Cue types for the cue sheet.

use cuesheet_core::{CueRange, Result, Timecode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use tracing::warn;
use uuid::Uuid;

/// Unique cue identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CueId(Uuid);

impl CueId {
    /// Generate a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for CueId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for CueId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for CueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A named span on the timeline.
///
/// Two cues are the same cue only if their ids match; name and range do not
/// take part in equality or hashing.
#[derive(Debug, Clone)]
pub struct Cue {
    id: CueId,
    name: String,
    range: CueRange,
}

impl Cue {
    /// Create a new cue with a fresh id.
    pub fn new(name: impl Into<String>, range: CueRange) -> Self {
        Self::with_id(CueId::new(), name, range)
    }

    /// Create a cue that keeps a previously assigned id.
    pub fn with_id(id: CueId, name: impl Into<String>, range: CueRange) -> Self {
        Self {
            id,
            name: name.into(),
            range,
        }
    }

    /// Placeholder cue spanning from zero to an indefinite end.
    pub fn example() -> Self {
        Self::new("1E1", CueRange::INDEFINITE)
    }

    pub fn id(&self) -> CueId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn range(&self) -> CueRange {
        self.range
    }

    /// Start time (inclusive).
    pub fn start(&self) -> Timecode {
        self.range.start()
    }

    /// End time (exclusive).
    pub fn end(&self) -> Timecode {
        self.range.end()
    }

    /// Check if this cue covers the given time.
    pub fn contains(&self, time: Timecode) -> bool {
        self.range.contains(time)
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Move the start point. Fails without changing the cue if `start` is not
    /// before the current end.
    pub fn set_start(&mut self, start: Timecode) -> Result<()> {
        match self.range.with_start(start) {
            Ok(range) => {
                self.range = range;
                Ok(())
            }
            Err(e) => {
                warn!(cue = %self.id, start = %start, end = %self.range.end(), "Rejected cue start update");
                Err(e)
            }
        }
    }

    /// Move the end point. Fails without changing the cue if `end` is not
    /// after the current start.
    pub fn set_end(&mut self, end: Timecode) -> Result<()> {
        match self.range.with_end(end) {
            Ok(range) => {
                self.range = range;
                Ok(())
            }
            Err(e) => {
                warn!(cue = %self.id, start = %self.range.start(), end = %end, "Rejected cue end update");
                Err(e)
            }
        }
    }
}

impl PartialEq for Cue {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Cue {}

impl Hash for Cue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.range)
    }
}
