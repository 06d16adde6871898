//! Persistence tests: the on-disk JSON format and the atomic write behaviour.

use dx_novelty::{DxCode, PatientMap, Visit};
use std::fs;

fn visit(raw: &[i64]) -> Visit {
    raw.iter().copied().map(DxCode::new).collect()
}

fn sample_map() -> PatientMap {
    [
        (1, vec![visit(&[3, 1, 1, 2]), visit(&[2, 3]), visit(&[4])]),
        (7, vec![]),
        (42, vec![visit(&[]), visit(&[5]), visit(&[5])]),
    ]
    .into_iter()
    .collect()
}

#[test]
fn save_then_load_returns_an_equal_map() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("visits.json");

    let map = sample_map();
    map.save(&path).unwrap();
    let loaded = PatientMap::load(&path).unwrap();
    assert_eq!(loaded, map);
}

#[test]
fn saved_file_is_pretty_printed_with_string_keys() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("visits.json");

    sample_map().save(&path).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    // Patient IDs are JSON object keys, so they come out as strings.
    assert!(text.contains("\"1\":"));
    assert!(text.contains("\"42\":"));
    // serde_json's pretty printer uses 2-space indentation.
    assert!(text.contains("\n  \"1\""));
    assert!(text.ends_with('\n'));
}

#[test]
fn save_leaves_no_temporary_file_behind() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("visits.json");

    sample_map().save(&path).unwrap();
    assert!(!dir.path().join("visits.json.tmp").exists());
}

#[test]
fn failed_save_removes_the_temporary_file() {
    let dir = tempfile::tempdir().unwrap();
    // A directory at the destination makes the final rename fail.
    let dest = dir.path().join("visits.json");
    fs::create_dir(&dest).unwrap();

    assert!(sample_map().save(&dest).is_err());
    assert!(!dir.path().join("visits.json.tmp").exists());
}

#[test]
fn load_fails_on_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = PatientMap::load(dir.path().join("nope.json")).unwrap_err();
    assert!(err.to_string().contains("nope.json"));
}

#[test]
fn load_fails_on_malformed_input() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(&path, "{\"1\": [[1, 2], \"not a visit\"]}").unwrap();
    assert!(PatientMap::load(&path).is_err());
}

#[test]
fn filter_then_save_round_trips_the_filtered_shape() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("filtered.json");

    let filtered = sample_map().keep_new_per_visit();
    filtered.save(&path).unwrap();
    let loaded = PatientMap::load(&path).unwrap();

    assert_eq!(loaded, filtered);
    assert_eq!(
        loaded.visits_for_patient(1),
        Some(&[visit(&[1, 2, 3]), visit(&[]), visit(&[4])][..])
    );
    assert_eq!(loaded.visits_for_patient(7), Some(&[][..]));
    assert_eq!(
        loaded.visits_for_patient(42),
        Some(&[visit(&[]), visit(&[5]), visit(&[])][..])
    );
}
