use std::fs;

use caption_engine::{ensure_output_dir, prepare_scratch_dir, AtomicFileWriter, NewFile};
use tempfile::TempDir;

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("out");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn output_dir_keeps_existing_files() {
    let temp = TempDir::new().unwrap();
    let existing = temp.path().join("Talk.txt");
    fs::write(&existing, "kept").unwrap();

    ensure_output_dir(temp.path()).unwrap();
    assert_eq!(fs::read_to_string(existing).unwrap(), "kept");
}

#[test]
fn scratch_dir_is_recreated_empty() {
    let temp = TempDir::new().unwrap();
    let scratch = temp.path().join("tmp");
    fs::create_dir_all(scratch.join("nested")).unwrap();
    fs::write(scratch.join("old.vtt"), "WEBVTT").unwrap();

    prepare_scratch_dir(&scratch).unwrap();

    assert!(scratch.is_dir());
    assert_eq!(fs::read_dir(&scratch).unwrap().count(), 0);
}

#[test]
fn file_in_place_of_output_dir_is_rejected() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    assert!(ensure_output_dir(&file_path).is_err());
}

#[test]
fn atomic_write_replaces_existing() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("doc.txt", "hello").unwrap();
    assert_eq!(first.file_name().unwrap(), "doc.txt");
    assert_eq!(fs::read_to_string(&first).unwrap(), "hello");

    let second = writer.write("doc.txt", "world").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "world");
}

#[test]
fn write_new_keeps_existing_file() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());
    let target = temp.path().join("doc.txt");

    assert_eq!(
        writer.write_new("doc.txt", "first").unwrap(),
        NewFile::Created(target.clone())
    );
    assert_eq!(
        writer.write_new("doc.txt", "second").unwrap(),
        NewFile::AlreadyExists(target.clone())
    );
    assert_eq!(fs::read_to_string(&target).unwrap(), "first");
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
}

#[test]
fn no_partial_file_on_error() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    let result = writer.write("doc.txt", "data");
    assert!(result.is_err());
    assert!(!file_path.with_file_name("doc.txt").exists());
}
