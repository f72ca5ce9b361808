//! Change notifications for cue sheets.
//!
//! Every mutation of a [`CueSheet`](crate::CueSheet) produces a
//! [`SheetChange`] that is delivered to the registered listeners after the
//! derived indexes have been recomputed, so a listener always observes a
//! consistent sheet state.
//!
//! Behind a [`SharedCueSheet`](crate::SharedCueSheet) the changes are
//! delivered after the write lock is released. Listeners may read the shared
//! sheet; they must not write to it or change subscriptions from inside the
//! callback.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::cue::CueId;

// ── Change events ───────────────────────────────────────────────

/// Which field of a cue an update touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueField {
    Name,
    Start,
    End,
}

/// A structural or in-place change to a cue sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetChange {
    /// A cue was added.
    Inserted { id: CueId },
    /// All cues with this id were removed.
    Removed { id: CueId, count: usize },
    /// A field of an existing cue changed.
    Updated { id: CueId, field: CueField },
    /// The whole cue collection was replaced.
    Reloaded { count: usize },
}

impl SheetChange {
    /// The cue this change concerns, if it concerns a single cue.
    pub fn cue_id(&self) -> Option<CueId> {
        match self {
            Self::Inserted { id } | Self::Removed { id, .. } | Self::Updated { id, .. } => {
                Some(*id)
            }
            Self::Reloaded { .. } => None,
        }
    }
}

// ── Listener registry ───────────────────────────────────────────

/// Handle returned by [`CueSheet::subscribe`](crate::CueSheet::subscribe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&SheetChange) + Send + Sync>;

type Entry = (ListenerId, Arc<Mutex<Listener>>);

#[derive(Default)]
struct Registry {
    next_id: u64,
    entries: Vec<Entry>,
}

/// Registered change listeners.
///
/// Cloning yields an empty registry: a cloned sheet starts without observers.
/// [`Listeners::share`] hands out a second handle to the same registry so
/// changes can be delivered without holding the sheet. The registry lock is
/// never held while a listener runs.
#[derive(Default)]
pub(crate) struct Listeners {
    registry: Arc<Mutex<Registry>>,
}

impl Listeners {
    pub(crate) fn add(&self, listener: Listener) -> ListenerId {
        let mut registry = self.registry.lock();
        let id = ListenerId(registry.next_id);
        registry.next_id += 1;
        registry.entries.push((id, Arc::new(Mutex::new(listener))));
        id
    }

    pub(crate) fn remove(&self, id: ListenerId) -> bool {
        let mut registry = self.registry.lock();
        let before = registry.entries.len();
        registry.entries.retain(|(entry_id, _)| *entry_id != id);
        registry.entries.len() != before
    }

    pub(crate) fn emit(&self, change: &SheetChange) {
        self.emit_all(std::slice::from_ref(change));
    }

    pub(crate) fn emit_all(&self, changes: &[SheetChange]) {
        if changes.is_empty() {
            return;
        }
        let targets: Vec<Arc<Mutex<Listener>>> = self
            .registry
            .lock()
            .entries
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for change in changes {
            for target in &targets {
                let mut listener = target.lock();
                (*listener)(change);
            }
        }
    }

    pub(crate) fn share(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.registry.lock().entries.len()
    }
}

/// Changes held back while a writer owns the sheet.
///
/// Like [`Listeners`], a clone starts empty.
#[derive(Debug, Default)]
pub(crate) struct Outbox {
    held: Option<Vec<SheetChange>>,
}

impl Outbox {
    pub(crate) fn hold(&mut self) {
        self.held.get_or_insert_with(Vec::new);
    }

    /// Buffer `change` while held, otherwise hand it back for delivery.
    pub(crate) fn post(&mut self, change: SheetChange) -> Option<SheetChange> {
        match &mut self.held {
            Some(held) => {
                held.push(change);
                None
            }
            None => Some(change),
        }
    }

    pub(crate) fn release(&mut self) -> Vec<SheetChange> {
        self.held.take().unwrap_or_default()
    }
}

impl Clone for Outbox {
    fn clone(&self) -> Self {
        Self::default()
    }
}

impl Clone for Listeners {
    fn clone(&self) -> Self {
        Self::default()
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.len())
            .finish()
    }
}
