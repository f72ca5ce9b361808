//! Cue sheet persistence.
//!
//! A cue sheet is stored as a JSON object with a single `cues` array. Each
//! cue is flattened into its name and the raw tick/scale pairs of its start
//! and end:
//!
//! ```text
//! {
//!   "cues": [
//!     { "name": "1M1", "startTime": 0, "startTimescale": 600,
//!       "endTime": 6000, "endTimescale": 600 }
//!   ]
//! }
//! ```
//!
//! Ids are not written unless [`DocumentOptions::persist_ids`] is set; a
//! reader assigns fresh ids to records that carry none, so by default cue
//! identity only lasts for one session.

use std::collections::HashSet;
use std::path::Path;

use cuesheet_core::{CueRange, CueSheetError, Result, Timecode};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cue::{Cue, CueId};
use crate::sheet::CueSheet;

/// Writer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentOptions {
    /// Indent the output.
    pub pretty: bool,
    /// Write each cue's id so it survives a reload.
    pub persist_ids: bool,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            persist_ids: false,
        }
    }
}

/// One cue as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CueRecord {
    pub name: String,
    pub start_time: i64,
    pub start_timescale: i32,
    pub end_time: i64,
    pub end_timescale: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CueId>,
}

impl CueRecord {
    /// Flatten a cue.
    pub fn from_cue(cue: &Cue, persist_id: bool) -> Self {
        Self {
            name: cue.name().to_string(),
            start_time: cue.start().ticks(),
            start_timescale: cue.start().scale(),
            end_time: cue.end().ticks(),
            end_timescale: cue.end().scale(),
            id: persist_id.then(|| cue.id()),
        }
    }

    /// Rebuild the cue, validating timescales and range order.
    pub fn into_cue(self) -> Result<Cue> {
        let start = Timecode::try_new(self.start_time, self.start_timescale)
            .map_err(|e| decode_error(&self.name, e))?;
        let end = Timecode::try_new(self.end_time, self.end_timescale)
            .map_err(|e| decode_error(&self.name, e))?;
        let range = CueRange::new(start, end).map_err(|e| decode_error(&self.name, e))?;
        Ok(match self.id {
            Some(id) => Cue::with_id(id, self.name, range),
            None => Cue::new(self.name, range),
        })
    }
}

fn decode_error(name: &str, err: CueSheetError) -> CueSheetError {
    CueSheetError::Decode(format!("Invalid cue {:?}: {}", name, err))
}

/// The persisted cue sheet document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CueSheetFile {
    pub cues: Vec<CueRecord>,
}

impl CueSheetFile {
    /// Flatten a sheet. Records follow the sheet's name order.
    pub fn from_sheet(sheet: &CueSheet, options: &DocumentOptions) -> Self {
        Self {
            cues: sheet
                .cues()
                .iter()
                .map(|cue| CueRecord::from_cue(cue, options.persist_ids))
                .collect(),
        }
    }

    /// Rebuild a sheet from the records.
    pub fn into_sheet(self) -> Result<CueSheet> {
        let mut seen = HashSet::new();
        let mut cues = Vec::with_capacity(self.cues.len());
        for record in self.cues {
            let cue = record.into_cue()?;
            if !seen.insert(cue.id()) {
                return Err(CueSheetError::Decode(format!(
                    "Duplicate cue id {}",
                    cue.id()
                )));
            }
            cues.push(cue);
        }
        Ok(CueSheet::from_cues(cues))
    }

    /// Serialize to JSON bytes.
    pub fn to_json(&self, options: &DocumentOptions) -> Result<Vec<u8>> {
        let result = if options.pretty {
            serde_json::to_vec_pretty(self)
        } else {
            serde_json::to_vec(self)
        };
        result.map_err(|e| CueSheetError::Encode(format!("Failed to serialize cue sheet: {}", e)))
    }

    /// Deserialize from JSON bytes.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        serde_json::from_slice(data)
            .map_err(|e| CueSheetError::Decode(format!("Invalid cue sheet document: {}", e)))
    }
}

/// Decode a cue sheet from document bytes.
pub fn load(data: &[u8]) -> Result<CueSheet> {
    CueSheetFile::from_json(data)?.into_sheet()
}

/// Encode a cue sheet with the default options.
pub fn save(sheet: &CueSheet) -> Result<Vec<u8>> {
    save_with(sheet, &DocumentOptions::default())
}

/// Encode a cue sheet.
pub fn save_with(sheet: &CueSheet, options: &DocumentOptions) -> Result<Vec<u8>> {
    CueSheetFile::from_sheet(sheet, options).to_json(options)
}

impl CueSheet {
    /// Load a cue sheet from a file path.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        let sheet = load(&data)?;
        info!(path = %path.display(), cues = sheet.len(), "Loaded cue sheet");
        Ok(sheet)
    }

    /// Save the cue sheet to a file path with the default options.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        self.save_to_file_with(path, &DocumentOptions::default())
    }

    /// Save the cue sheet to a file path.
    pub fn save_to_file_with(&self, path: &Path, options: &DocumentOptions) -> Result<()> {
        let data = save_with(self, options)?;
        std::fs::write(path, data)?;
        info!(path = %path.display(), cues = self.len(), "Saved cue sheet");
        Ok(())
    }
}
