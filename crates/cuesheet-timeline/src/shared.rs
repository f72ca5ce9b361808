//! Shared access to a cue sheet from several threads.
//!
//! A UI thread and a background loader can hold clones of the same
//! [`SharedCueSheet`]. Writers get exclusive access, so a mutation and the
//! index rebuild it triggers never interleave with a reader.
//!
//! Change listeners run after the write lock is released, so a listener can
//! read the sheet it observes.

use std::path::Path;
use std::sync::Arc;

use cuesheet_core::Result;
use parking_lot::RwLock;
use tracing::info;

use crate::sheet::CueSheet;

/// A cue sheet behind a reader-writer lock.
#[derive(Debug, Clone, Default)]
pub struct SharedCueSheet {
    inner: Arc<RwLock<CueSheet>>,
}

impl SharedCueSheet {
    pub fn new(sheet: CueSheet) -> Self {
        Self {
            inner: Arc::new(RwLock::new(sheet)),
        }
    }

    /// Run `f` with shared read access.
    pub fn read<R>(&self, f: impl FnOnce(&CueSheet) -> R) -> R {
        f(&self.inner.read())
    }

    /// Run `f` with exclusive write access. Changes made by `f` reach the
    /// listeners after the lock is released.
    pub fn write<R>(&self, f: impl FnOnce(&mut CueSheet) -> R) -> R {
        let (result, changes, listeners) = {
            let mut sheet = self.inner.write();
            sheet.hold_changes();
            let result = f(&mut sheet);
            let (changes, listeners) = sheet.release_changes();
            (result, changes, listeners)
        };
        listeners.emit_all(&changes);
        result
    }

    /// Swap in the cues of another sheet, keeping this sheet's listeners.
    pub fn replace(&self, sheet: CueSheet) {
        self.write(|current| current.reload_from(sheet));
    }

    /// Copy of the current state, without listeners.
    pub fn snapshot(&self) -> CueSheet {
        self.inner.read().clone()
    }

    /// Read and decode a file, then swap it in. The lock is only held for the
    /// swap. Returns the number of cues loaded.
    pub fn reload_from_file(&self, path: &Path) -> Result<usize> {
        let sheet = CueSheet::load_from_file(path)?;
        let count = sheet.len();
        self.replace(sheet);
        info!(path = %path.display(), cues = count, "Reloaded shared cue sheet");
        Ok(count)
    }

    /// Encode the current state and write it to `path`.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let snapshot = self.snapshot();
        snapshot.save_to_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cuesheet_core::{CueRange, Timecode};
    use std::sync::{mpsc, Mutex};
    use std::thread;
    use std::time::Duration;

    fn range(start: i64, end: i64) -> CueRange {
        CueRange::new(Timecode::new(start, 1), Timecode::new(end, 1)).unwrap()
    }

    #[test]
    fn test_concurrent_writers_and_readers() {
        let shared = SharedCueSheet::default();

        let writers: Vec<_> = (0..4)
            .map(|w| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for i in 0..25 {
                        let start = w * 100 + i;
                        shared.write(|sheet| {
                            sheet.insert_cue(format!("{}M{}", w, i), range(start, start + 1))
                        });
                    }
                })
            })
            .collect();

        let readers: Vec<_> = (0..2)
            .map(|_| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for _ in 0..50 {
                        shared.read(|sheet| {
                            assert_eq!(sheet.cue_starts().len(), sheet.len());
                            assert_eq!(sheet.cue_times().len(), sheet.len());
                        });
                    }
                })
            })
            .collect();

        for handle in writers.into_iter().chain(readers) {
            handle.join().unwrap();
        }

        assert_eq!(shared.read(|sheet| sheet.len()), 100);
        let starts = shared.read(|sheet| sheet.cue_starts().to_vec());
        assert!(starts.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_replace_notifies_existing_listeners() {
        let shared = SharedCueSheet::default();
        let seen = Arc::new(Mutex::new(0usize));
        let sink = Arc::clone(&seen);
        shared.write(|sheet| {
            sheet.subscribe(move |_| *sink.lock().unwrap() += 1);
        });

        let mut loaded = CueSheet::new();
        loaded.insert_cue("1M1", range(0, 4));
        shared.replace(loaded);

        assert_eq!(*seen.lock().unwrap(), 1);
        assert_eq!(shared.snapshot().len(), 1);
    }

    #[test]
    fn test_listener_reads_shared_sheet() {
        let shared = SharedCueSheet::default();
        let view = shared.clone();
        let lengths = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&lengths);
        shared.write(|sheet| {
            sheet.subscribe(move |_| {
                let len = view.read(|s| s.len());
                sink.lock().unwrap().push(len);
            });
        });

        let (done_tx, done_rx) = mpsc::channel();
        let writer = shared.clone();
        thread::spawn(move || {
            writer.write(|sheet| sheet.insert_cue("1M1", range(0, 4)));
            writer.replace(CueSheet::new());
            let _ = done_tx.send(());
        });

        assert!(done_rx.recv_timeout(Duration::from_secs(5)).is_ok());
        assert_eq!(*lengths.lock().unwrap(), vec![1, 0]);
    }

    #[test]
    fn test_file_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheet.cue");

        let shared = SharedCueSheet::default();
        shared.write(|sheet| {
            sheet.insert_cue("1M1", range(0, 4));
            sheet.insert_cue("1M2", range(4, 8));
        });
        shared.save_to_file(&path).unwrap();

        let other = SharedCueSheet::default();
        assert_eq!(other.reload_from_file(&path).unwrap(), 2);
        assert_eq!(other.read(|sheet| sheet.cues()[1].name().to_string()), "1M2");
        assert!(other.reload_from_file(&dir.path().join("nope.cue")).is_err());
    }
}
