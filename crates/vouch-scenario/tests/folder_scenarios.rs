//! Folder comparisons driven through the scenario facade.

use std::fs;

use tempfile::TempDir;
use vouch_scenario::{Format, Scenario, ScenarioError};

fn folder(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (name, content) in files {
        fs::write(dir.path().join(name), content).unwrap();
    }
    dir
}

#[test]
fn expected_json_found_among_candidates() {
    let dir = folder(&[
        ("001.json", r#"{"order": {"id": 1, "ts": "a"}}"#),
        ("002.json", r#"{"order": {"id": 2, "ts": "b"}}"#),
    ]);
    let mut s = Scenario::new();
    s.set_var("Folder", dir.path().display().to_string()).unwrap();
    s.set_var("OrderId", 2).unwrap();
    s.set_tolerant_keys(["ts"]).unwrap();
    s.load_expected(Format::Json, r#"{"order": {"id": {OrderId}, "ts": "zzz"}}"#).unwrap();

    let found = s.compare_folder(Format::Json, "{Folder}", "$.order").unwrap();
    assert!(found.file.ends_with("002.json"));
    assert_eq!(found.tried, 2);
}

#[test]
fn xml_field_found_among_candidates() {
    let dir = folder(&[
        ("a.xml", "<msg><status>pending</status></msg>"),
        ("b.xml", "<msg><status>sent</status></msg>"),
    ]);
    let s = Scenario::new();
    let found = s
        .assert_folder_field(
            Format::Xml,
            &dir.path().display().to_string(),
            "$.msg.status",
            "sent",
            "string",
        )
        .unwrap();
    assert!(found.file.ends_with("b.xml"));
}

#[test]
fn no_candidate_matches() {
    let dir = folder(&[("a.json", r#"{"v": 1}"#)]);
    let mut s = Scenario::new();
    s.load_expected(Format::Json, r#"{"v": 2}"#).unwrap();
    let err = s
        .compare_folder(Format::Json, &dir.path().display().to_string(), "$")
        .unwrap_err();
    assert!(matches!(
        err,
        ScenarioError::Diff(vouch_diff::DiffError::NoMatchingDocument { candidates: 1, .. })
    ));
}

#[test]
fn payload_files_load_through_expansion() {
    let dir = folder(&[("expected.json", r#"{"user": "{User}"}"#)]);
    let mut s = Scenario::new();
    s.set_var("User", "ada").unwrap();
    s.load_expected_file(Format::Json, &dir.path().join("expected.json")).unwrap();
    s.load_actual(Format::Json, r#"{"user": "ada"}"#).unwrap();
    assert!(s.compare(Format::Json, "$").unwrap().is_empty());
}
