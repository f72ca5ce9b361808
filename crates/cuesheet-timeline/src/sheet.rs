//! The cue sheet: an owned collection of cues with sorted indexes.

use cuesheet_core::{standard_compare, timescale, CueRange, CueSheetError, Result, Timecode};
use tracing::debug;

use crate::change::{CueField, ListenerId, Listeners, Outbox, SheetChange};
use crate::cue::{Cue, CueId};

/// All cues for one timeline.
///
/// The cue list is kept in name order. Start, end and range indexes are
/// rebuilt inside every mutating call, so they always reflect the current
/// cues.
#[derive(Debug, Clone)]
pub struct CueSheet {
    cues: Vec<Cue>,
    cue_starts: Vec<Timecode>,
    cue_ends: Vec<Timecode>,
    cue_times: Vec<CueRange>,
    /// Indices into `cues`, ascending by start. Ties keep name order.
    start_order: Vec<usize>,
    /// Scale used for seconds-based input.
    timescale: i32,
    listeners: Listeners,
    outbox: Outbox,
}

impl CueSheet {
    /// Create an empty cue sheet.
    pub fn new() -> Self {
        Self {
            cues: Vec::new(),
            cue_starts: Vec::new(),
            cue_ends: Vec::new(),
            cue_times: Vec::new(),
            start_order: Vec::new(),
            timescale: timescale::DEFAULT,
            listeners: Listeners::default(),
            outbox: Outbox::default(),
        }
    }

    /// Create an empty cue sheet.
    pub fn empty() -> Self {
        Self::new()
    }

    /// Create an empty cue sheet that converts seconds at `scale`.
    pub fn with_timescale(scale: i32) -> Result<Self> {
        if scale <= 0 {
            return Err(CueSheetError::InvalidTimescale(scale as i64));
        }
        Ok(Self {
            timescale: scale,
            ..Self::new()
        })
    }

    /// Build a sheet from existing cues.
    pub fn from_cues(cues: Vec<Cue>) -> Self {
        let mut sheet = Self {
            cues,
            ..Self::new()
        };
        sheet.recompute_cue_boundaries();
        sheet
    }

    // ── Mutation ────────────────────────────────────────────────

    /// Add a cue. Returns its id.
    pub fn insert(&mut self, cue: Cue) -> CueId {
        let id = cue.id();
        debug!(cue = %id, name = cue.name(), range = %cue.range(), "Inserting cue");
        self.cues.push(cue);
        self.recompute_cue_boundaries();
        self.notify(SheetChange::Inserted { id });
        id
    }

    /// Create and add a cue over `range`.
    pub fn insert_cue(&mut self, name: impl Into<String>, range: CueRange) -> CueId {
        self.insert(Cue::new(name, range))
    }

    /// Create and add a cue from start and end times.
    pub fn insert_cue_times(
        &mut self,
        name: impl Into<String>,
        start: Timecode,
        end: Timecode,
    ) -> Result<CueId> {
        let range = CueRange::new(start, end)?;
        Ok(self.insert_cue(name, range))
    }

    /// Create and add a cue from start and end seconds, converted at the
    /// sheet's timescale.
    pub fn insert_cue_seconds(
        &mut self,
        name: impl Into<String>,
        start: f64,
        end: f64,
    ) -> Result<CueId> {
        let range = CueRange::from_seconds(start, end, self.timescale)?;
        Ok(self.insert_cue(name, range))
    }

    /// Remove every cue equal to `cue`. Returns how many were removed.
    pub fn remove(&mut self, cue: &Cue) -> usize {
        self.remove_by_id(cue.id())
    }

    /// Remove every cue with this id. Returns how many were removed.
    pub fn remove_by_id(&mut self, id: CueId) -> usize {
        let before = self.cues.len();
        self.cues.retain(|cue| cue.id() != id);
        let count = before - self.cues.len();
        if count > 0 {
            debug!(cue = %id, count, "Removed cue");
            self.recompute_cue_boundaries();
            self.notify(SheetChange::Removed { id, count });
        }
        count
    }

    pub fn set_cue_name(&mut self, id: CueId, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        self.update(id, CueField::Name, |cue| {
            cue.set_name(name);
            Ok(())
        })
    }

    /// Move a cue's start. The cue is unchanged if the new start is not
    /// before its end.
    pub fn set_cue_start(&mut self, id: CueId, start: Timecode) -> Result<()> {
        self.update(id, CueField::Start, |cue| cue.set_start(start))
    }

    /// Move a cue's end. The cue is unchanged if the new end is not after its
    /// start.
    pub fn set_cue_end(&mut self, id: CueId, end: Timecode) -> Result<()> {
        self.update(id, CueField::End, |cue| cue.set_end(end))
    }

    fn update(
        &mut self,
        id: CueId,
        field: CueField,
        apply: impl FnOnce(&mut Cue) -> Result<()>,
    ) -> Result<()> {
        let cue = self
            .cues
            .iter_mut()
            .find(|cue| cue.id() == id)
            .ok_or_else(|| CueSheetError::NotFound(id.to_string()))?;
        apply(cue)?;
        self.recompute_cue_boundaries();
        self.notify(SheetChange::Updated { id, field });
        Ok(())
    }

    /// Replace all cues with those of `other`. Listeners registered on this
    /// sheet are kept and told about the reload.
    pub fn reload_from(&mut self, other: CueSheet) {
        self.cues = other.cues;
        self.recompute_cue_boundaries();
        let count = self.cues.len();
        self.notify(SheetChange::Reloaded { count });
    }

    /// Rebuild the start, end and range indexes and re-sort the cue list by
    /// name.
    pub fn recompute_cue_boundaries(&mut self) {
        self.cues.sort_by(|a, b| standard_compare(a.name(), b.name()));

        let mut starts: Vec<Timecode> = self.cues.iter().map(Cue::start).collect();
        starts.sort();
        let mut ends: Vec<Timecode> = self.cues.iter().map(Cue::end).collect();
        ends.sort();

        let cues = &self.cues;
        let mut order: Vec<usize> = (0..cues.len()).collect();
        order.sort_by(|&a, &b| cues[a].start().cmp(&cues[b].start()));

        self.cue_times = order.iter().map(|&i| cues[i].range()).collect();
        self.cue_starts = starts;
        self.cue_ends = ends;
        self.start_order = order;
        debug!(cues = self.cues.len(), "Recomputed cue boundaries");
    }

    // ── Change notification ─────────────────────────────────────

    /// Register a listener called after every change.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&SheetChange) + Send + Sync + 'static,
    ) -> ListenerId {
        self.listeners.add(Box::new(listener))
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    fn notify(&mut self, change: SheetChange) {
        if let Some(change) = self.outbox.post(change) {
            self.listeners.emit(&change);
        }
    }

    /// Buffer changes instead of delivering them until
    /// [`release_changes`](Self::release_changes).
    pub(crate) fn hold_changes(&mut self) {
        self.outbox.hold();
    }

    /// Stop buffering. Returns the buffered changes together with a handle
    /// that delivers them once the caller no longer borrows the sheet.
    pub(crate) fn release_changes(&mut self) -> (Vec<SheetChange>, Listeners) {
        (self.outbox.release(), self.listeners.share())
    }

    // ── Queries ─────────────────────────────────────────────────

    /// Cues in name order.
    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    /// Look up a cue by id.
    pub fn cue(&self, id: CueId) -> Option<&Cue> {
        self.cues.iter().find(|cue| cue.id() == id)
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// Scale used for seconds-based input.
    pub fn timescale(&self) -> i32 {
        self.timescale
    }

    /// Every cue start, ascending.
    pub fn cue_starts(&self) -> &[Timecode] {
        &self.cue_starts
    }

    /// Every cue end, ascending.
    pub fn cue_ends(&self) -> &[Timecode] {
        &self.cue_ends
    }

    /// Every cue range, ascending by start.
    pub fn cue_times(&self) -> &[CueRange] {
        &self.cue_times
    }

    fn by_start(&self) -> impl Iterator<Item = &Cue> + '_ {
        self.start_order.iter().map(move |&i| &self.cues[i])
    }

    /// Number of cues (in start order) whose start is at or before `time`.
    fn started_by(&self, time: Timecode) -> usize {
        self.start_order
            .partition_point(|&i| self.cues[i].start() <= time)
    }

    /// Cues ascending by start. Cues with the same start keep name order.
    pub fn sorted(&self) -> Vec<&Cue> {
        self.by_start().collect()
    }

    /// The cue covering `time`. When cues overlap, the one that starts
    /// earliest wins.
    ///
    /// A binary search bounds the candidates to cues started by `time`; those
    /// are then scanned in start order, so the worst case is linear.
    pub fn cue_at(&self, time: Timecode) -> Option<&Cue> {
        let candidates = self.started_by(time);
        self.start_order[..candidates]
            .iter()
            .map(|&i| &self.cues[i])
            .find(|cue| cue.contains(time))
    }

    /// The cue covering a time given in seconds.
    pub fn cue_at_seconds(&self, seconds: f64) -> Option<&Cue> {
        match Timecode::from_seconds(seconds, self.timescale) {
            Ok(time) => self.cue_at(time),
            Err(e) => {
                debug!(seconds, error = %e, "Cannot look up cue");
                None
            }
        }
    }

    /// First cue, in start order, that covers `time`.
    pub fn current_cue(&self, time: Timecode) -> Option<&Cue> {
        self.by_start().find(|cue| cue.contains(time))
    }

    /// The first cue starting strictly after `time`.
    pub fn next_cue(&self, time: Timecode) -> Option<&Cue> {
        let index = self.started_by(time);
        self.start_order.get(index).map(|&i| &self.cues[i])
    }

    /// The latest-starting cue whose start is at or before `time`.
    pub fn previous_cue(&self, time: Timecode) -> Option<&Cue> {
        let index = self.started_by(time).checked_sub(1)?;
        Some(&self.cues[self.start_order[index]])
    }
}

impl Default for CueSheet {
    fn default() -> Self {
        Self::new()
    }
}
