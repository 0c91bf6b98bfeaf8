//! Tests for base name / extension handling

use std::path::PathBuf;

use crate::util::PathSpec;

#[test]
fn test_from_filename_splits_last_dot() {
    let spec = PathSpec::from_filename("logs/app.log", "txt");
    assert_eq!(spec.base(), "logs/app");
    assert_eq!(spec.extension(), "log");
}

#[test]
fn test_from_filename_uses_last_of_several_dots() {
    let spec = PathSpec::from_filename("logs/app.2024.json", "txt");
    assert_eq!(spec.base(), "logs/app.2024");
    assert_eq!(spec.extension(), "json");
}

#[test]
fn test_from_filename_without_extension_uses_default() {
    let spec = PathSpec::from_filename("logs/app", "log");
    assert_eq!(spec.base(), "logs/app");
    assert_eq!(spec.extension(), "log");
}

#[test]
fn test_from_filename_ignores_dot_in_directory() {
    let spec = PathSpec::from_filename("var.d/logs/app", "log");
    assert_eq!(spec.base(), "var.d/logs/app");
    assert_eq!(spec.extension(), "log");

    let spec = PathSpec::from_filename("C:\\var.d\\app", "txt");
    assert_eq!(spec.base(), "C:\\var.d\\app");
    assert_eq!(spec.extension(), "txt");
}

#[test]
fn test_indexed_zero_is_live_file() {
    let spec = PathSpec::new("logs/app", "log");
    assert_eq!(spec.indexed(0), PathBuf::from("logs/app.log"));
    assert_eq!(spec.indexed(0), spec.path());
}

#[test]
fn test_indexed_inserts_index_before_extension() {
    let spec = PathSpec::new("logs/app", "log");
    assert_eq!(spec.indexed(1), PathBuf::from("logs/app.1.log"));
    assert_eq!(spec.indexed(12), PathBuf::from("logs/app.12.log"));
}

#[test]
fn test_display() {
    let spec = PathSpec::from_filename("app.txt", "log");
    assert_eq!(spec.to_string(), "app.txt");
}
