//! Integration tests for the cue sheet.
//!
//! Exercises cross-crate interactions between cuesheet-core and
//! cuesheet-timeline.

use cuesheet_core::{timescale, CueRange, CueSheetError, Timecode};
use cuesheet_timeline::{
    load, save, Cue, CueId, CueSheet, CueSheetFile, DocumentOptions, SharedCueSheet,
    SheetChange,
};

// ── Helpers ────────────────────────────────────────────────────

fn secs(s: i64) -> Timecode {
    Timecode::new(s, 1)
}

fn range(start: i64, end: i64) -> CueRange {
    CueRange::new(secs(start), secs(end)).unwrap()
}

/// Reel with cue "A" over [0s, 10s) named "B" and cue "C" over [10s, 20s)
/// named "A", inserted A then C.
fn reel() -> (CueSheet, Cue, Cue) {
    let a = Cue::new("B", range(0, 10));
    let c = Cue::new("A", range(10, 20));
    let mut sheet = CueSheet::new();
    sheet.insert(a.clone());
    sheet.insert(c.clone());
    (sheet, a, c)
}

fn build_film() -> CueSheet {
    let mut sheet = CueSheet::new();
    sheet.insert_cue_seconds("1M1", 12.5, 95.0).unwrap();
    sheet.insert_cue_seconds("1M2", 110.0, 180.25).unwrap();
    sheet.insert_cue_seconds("1M10", 600.0, 640.0).unwrap();
    sheet.insert_cue_seconds("2M1", 1_200.0, 1_330.0).unwrap();
    sheet.insert_cue_seconds("1M3", 300.0, 420.0).unwrap();
    sheet
}

// ── Ordering & navigation ──────────────────────────────────────

#[test]
fn name_order_and_start_order_differ() {
    let (sheet, a, c) = reel();
    assert_eq!(sheet.cues(), &[c.clone(), a.clone()]);

    let sorted: Vec<&Cue> = sheet.sorted();
    assert_eq!(sorted, vec![&a, &c]);
}

#[test]
fn reel_navigation() {
    let (sheet, a, c) = reel();
    assert_eq!(sheet.next_cue(secs(5)), Some(&c));
    assert_eq!(sheet.previous_cue(secs(5)), Some(&a));
    // at or after every start, the latest-starting cue is previous
    assert_eq!(sheet.previous_cue(secs(15)), Some(&c));
    assert_eq!(sheet.current_cue(secs(5)), Some(&a));
    assert_eq!(sheet.cue_at(secs(15)), Some(&c));
}

#[test]
fn next_and_previous_bracket_the_time() {
    let sheet = build_film();
    for tenth in -100..15_000 {
        let t = Timecode::new(tenth, 10);
        let next = sheet.next_cue(t);
        let previous = sheet.previous_cue(t);
        assert!(next.is_some() || previous.is_some());
        if let Some(next) = next {
            assert!(t < next.start());
        }
        if let Some(previous) = previous {
            assert!(previous.start() <= t);
        }
    }
}

#[test]
fn cue_names_sort_naturally() {
    let sheet = build_film();
    let names: Vec<&str> = sheet.cues().iter().map(Cue::name).collect();
    assert_eq!(names, vec!["1M1", "1M2", "1M3", "1M10", "2M1"]);
}

#[test]
fn point_lookup_across_scales() {
    let sheet = build_film();
    // 100 seconds at a 48 kHz audio scale: between 1M1 and 1M2
    assert!(sheet.cue_at(Timecode::new(4_800_000, 48_000)).is_none());
    // 150 seconds at 24 fps
    let hit = sheet.cue_at(Timecode::new(3_600, 24)).unwrap();
    assert_eq!(hit.name(), "1M2");
    assert_eq!(sheet.cue_at_seconds(150.0).map(Cue::name), Some("1M2"));
}

#[test]
fn empty_sheet_answers_nothing() {
    let sheet = CueSheet::empty();
    assert!(sheet.next_cue(secs(0)).is_none());
    assert!(sheet.previous_cue(secs(0)).is_none());
    assert!(sheet.current_cue(secs(0)).is_none());
    assert!(sheet.cue_at_seconds(0.0).is_none());
}

// ── Mutation & indexes ─────────────────────────────────────────

#[test]
fn indexes_follow_every_mutation() {
    let mut sheet = build_film();
    let check = |sheet: &CueSheet| {
        assert_eq!(sheet.cue_starts().len(), sheet.len());
        assert_eq!(sheet.cue_ends().len(), sheet.len());
        assert_eq!(sheet.cue_times().len(), sheet.len());
        assert!(sheet.cue_starts().windows(2).all(|w| w[0] <= w[1]));
        assert!(sheet.cue_ends().windows(2).all(|w| w[0] <= w[1]));
        assert!(sheet
            .cue_times()
            .windows(2)
            .all(|w| w[0].start() <= w[1].start()));
    };
    check(&sheet);

    let victim = sheet.cues()[2].clone();
    sheet.remove(&victim);
    check(&sheet);
    assert!(!sheet.cue_starts().contains(&victim.start()));

    let id = sheet.cues()[0].id();
    sheet.set_cue_start(id, secs(2_000)).unwrap_err();
    sheet.set_cue_end(id, secs(2_000)).unwrap();
    sheet.set_cue_start(id, secs(1_500)).unwrap();
    check(&sheet);
    assert_eq!(sheet.sorted().last().map(|c| c.id()), Some(id));
}

#[test]
fn rejected_update_reports_and_preserves() {
    let (mut sheet, a, _) = reel();
    let err = sheet.set_cue_start(a.id(), secs(10)).unwrap_err();
    assert!(matches!(err, CueSheetError::InvertedRange { .. }));
    assert_eq!(sheet.cue(a.id()).unwrap().range(), range(0, 10));
}

#[test]
fn example_cue_extends_indefinitely() {
    let mut sheet = CueSheet::new();
    let example = sheet.insert(Cue::example());
    let far = Timecode::from_seconds(86_400.0, timescale::MAX_RESOLUTION).unwrap();
    assert_eq!(sheet.cue_at(far).map(Cue::id), Some(example));
    assert!(sheet.cue_ends()[0].is_indefinite());
}

// ── Persistence ────────────────────────────────────────────────

#[test]
fn document_roundtrip_keeps_cue_data() {
    let sheet = build_film();
    let bytes = save(&sheet).unwrap();
    let loaded = load(&bytes).unwrap();

    let key = |c: &Cue| {
        (
            c.name().to_string(),
            c.start().ticks(),
            c.start().scale(),
            c.end().ticks(),
            c.end().scale(),
        )
    };
    let before: Vec<_> = sheet.cues().iter().map(key).collect();
    let after: Vec<_> = loaded.cues().iter().map(key).collect();
    assert_eq!(before, after);

    let again = CueSheetFile::from_json(&save(&loaded).unwrap()).unwrap();
    assert_eq!(again, CueSheetFile::from_json(&bytes).unwrap());
}

#[test]
fn legacy_document_loads() {
    let doc = serde_json::json!({
        "cues": [
            { "name": "1M1", "startTime": 0, "startTimescale": 600,
              "endTime": 5400, "endTimescale": 600 },
            { "name": "1M2", "startTime": 9_000_000_000i64, "startTimescale": 1_000_000_000,
              "endTime": 12_000_000_000i64, "endTimescale": 1_000_000_000 }
        ]
    });
    let sheet = load(&serde_json::to_vec(&doc).unwrap()).unwrap();
    assert_eq!(sheet.len(), 2);
    assert_eq!(sheet.cue_at(secs(10)).map(Cue::name), Some("1M2"));
    assert_eq!(sheet.previous_cue(secs(8)).map(Cue::name), Some("1M1"));
}

#[test]
fn shared_sheet_reload_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("film.cue");
    build_film()
        .save_to_file_with(
            &path,
            &DocumentOptions {
                pretty: false,
                persist_ids: true,
            },
        )
        .unwrap();

    let shared = SharedCueSheet::default();
    let reloads = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = std::sync::Arc::clone(&reloads);
    shared.write(|sheet| {
        sheet.subscribe(move |change| sink.lock().unwrap().push(change.clone()));
    });

    assert_eq!(shared.reload_from_file(&path).unwrap(), 5);
    assert_eq!(
        *reloads.lock().unwrap(),
        vec![SheetChange::Reloaded { count: 5 }]
    );

    let ids: Vec<CueId> = shared.read(|s| s.cues().iter().map(Cue::id).collect());
    let on_disk = CueSheet::load_from_file(&path).unwrap();
    let disk_ids: Vec<CueId> = on_disk.cues().iter().map(Cue::id).collect();
    assert_eq!(ids, disk_ids);
}
