//! Cue Sheet Timeline - cue sheet data model
//!
//! Implements the cue sheet for a single timeline:
//! - Named, uniquely identified cues over half-open time ranges
//! - A cue sheet with sorted start/end/range indexes kept in sync on mutation
//! - Point lookup and next/previous navigation
//! - Change notifications for observers
//! - JSON persistence and shared access across threads

pub mod change;
pub mod cue;
pub mod serialization;
pub mod shared;
pub mod sheet;

pub use change::{CueField, ListenerId, SheetChange};
pub use cue::{Cue, CueId};
pub use serialization::{load, save, save_with, CueRecord, CueSheetFile, DocumentOptions};
pub use shared::SharedCueSheet;
pub use sheet::CueSheet;
