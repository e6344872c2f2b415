use std::fs;
use std::path::PathBuf;

use assert_matches::assert_matches;

use cdc_places::error::PlacesError;
use cdc_places::validate::{PREVIEW_ROWS, check, validate};

fn write_fixture(dir: &tempfile::TempDir, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn accepts_header_with_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(
        &dir,
        "ok.csv",
        b"StateAbbr,CountyName,OBESITY_CrudePrev\nAL,Autauga,35.1\n",
    );

    assert!(validate(&path));
    let report = check(&path).unwrap();
    assert_eq!(report.columns, 3);
    assert_eq!(report.rows_checked, 1);
}

#[test]
fn preview_stops_after_fixed_row_count() {
    let dir = tempfile::tempdir().unwrap();
    let mut content = String::from("a,b\n");
    for i in 0..50 {
        content.push_str(&format!("{i},{}\n", i * 2));
    }
    // A ragged row past the preview window is not inspected.
    content.push_str("1,2,3\n");
    let path = write_fixture(&dir, "long.csv", content.as_bytes());

    let report = check(&path).unwrap();
    assert_eq!(report.rows_checked, PREVIEW_ROWS);
}

#[test]
fn rejects_empty_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "empty.csv", b"");

    assert!(!validate(&path));
    assert_matches!(check(&path), Err(PlacesError::Validation(_)));
}

#[test]
fn rejects_binary_garbage() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(
        &dir,
        "garbage.csv",
        &[0x00, 0xff, 0xfe, 0x9c, 0x00, 0x01, 0x80, 0x81, 0x0a, 0xc3, 0x28, 0x00, 0x0a],
    );

    assert!(!validate(&path));
}

#[test]
fn rejects_header_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "header.csv", b"StateAbbr,CountyName\n");

    assert!(!validate(&path));
}

#[test]
fn rejects_ragged_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "ragged.csv", b"a,b,c\n1,2,3\n4,5\n");

    assert!(!validate(&path));
}

#[test]
fn rejects_missing_file() {
    let dir = tempfile::tempdir().unwrap();

    assert!(!validate(&dir.path().join("absent.csv")));
}
