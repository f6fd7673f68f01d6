// End-to-end organizer runs against a temporary folder tree

use caretaker::core::organizer::prune_empty_directories;
use caretaker::core::{CategoryRules, FileOrganizer, MoveOutcome};
use std::fs;
use tempfile::TempDir;

fn organizer() -> FileOrganizer {
    FileOrganizer::new(CategoryRules::default())
}

#[test]
fn test_organize_sorts_files_by_category() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("downloads");
    let dest = temp.path().join("organized");
    fs::create_dir(&source).unwrap();
    fs::write(source.join("a.jpg"), b"jpg").unwrap();
    fs::write(source.join("b.txt"), b"txt").unwrap();
    fs::write(source.join("c.unknownext"), b"???").unwrap();

    let report = organizer().organize(&source, &dest);

    assert_eq!(report.moved_count(), 3);
    assert_eq!(report.failed_count(), 0);
    assert!(dest.join("Images").join("a.jpg").is_file());
    assert!(dest.join("Documents").join("b.txt").is_file());
    assert!(dest.join("Other").join("c.unknownext").is_file());
    assert_eq!(fs::read_dir(&source).unwrap().count(), 0);

    // Nothing left to do on a second pass
    let again = organizer().organize(&source, &dest);
    assert_eq!(again.moved_count(), 0);
    assert!(again.records.is_empty());
}

#[test]
fn test_organize_keeps_both_files_on_collision() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("in");
    let dest = temp.path().join("out");
    fs::create_dir(&source).unwrap();
    fs::create_dir_all(dest.join("Documents")).unwrap();
    fs::write(dest.join("Documents").join("notes.txt"), b"old").unwrap();
    fs::write(dest.join("Documents").join("notes_1.txt"), b"older").unwrap();
    fs::write(source.join("notes.txt"), b"new").unwrap();

    let report = organizer().organize(&source, &dest);

    assert_eq!(report.moved_count(), 1);
    let record = &report.records[0];
    assert_eq!(record.outcome, MoveOutcome::Moved);
    assert_eq!(record.destination, dest.join("Documents").join("notes_2.txt"));
    assert_eq!(fs::read(dest.join("Documents").join("notes.txt")).unwrap(), b"old");
    assert_eq!(fs::read(dest.join("Documents").join("notes_2.txt")).unwrap(), b"new");
}

#[test]
fn test_organize_ignores_subdirectories() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("in");
    let dest = temp.path().join("out");
    fs::create_dir_all(source.join("nested")).unwrap();
    fs::write(source.join("nested").join("song.mp3"), b"mp3").unwrap();
    fs::write(source.join("song.mp3"), b"mp3").unwrap();

    let report = organizer().organize(&source, &dest);

    assert_eq!(report.moved_count(), 1);
    assert!(dest.join("Audio").join("song.mp3").is_file());
    assert!(source.join("nested").join("song.mp3").is_file());
}

#[test]
fn test_organize_missing_source_reports_it() {
    let temp = TempDir::new().unwrap();
    let report = organizer().organize(&temp.path().join("nope"), &temp.path().join("out"));

    assert!(report.source_missing);
    assert_eq!(report.moved_count(), 0);
    assert!(!temp.path().join("out").exists());
}

#[test]
fn test_custom_rules_are_honoured() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("in");
    let dest = temp.path().join("out");
    fs::create_dir(&source).unwrap();
    fs::write(source.join("main.RS"), b"fn main() {}").unwrap();
    fs::write(source.join("photo.jpg"), b"jpg").unwrap();

    let rules = CategoryRules::new(vec![("Rust", vec![".rs"])]).unwrap();
    let report = FileOrganizer::new(rules).organize(&source, &dest);

    assert_eq!(report.moved_count(), 2);
    assert!(dest.join("Rust").join("main.RS").is_file());
    assert!(dest.join("Other").join("photo.jpg").is_file());
}

#[test]
fn test_prune_removes_nested_empty_folders_only() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join("a").join("b").join("c")).unwrap();
    fs::create_dir_all(root.join("keep")).unwrap();
    fs::write(root.join("keep").join("leftover.txt"), b"x").unwrap();

    let removed = prune_empty_directories(root);

    assert_eq!(removed.len(), 3);
    assert!(!root.join("a").exists());
    assert!(root.join("keep").join("leftover.txt").is_file());
    assert!(root.exists());
}
