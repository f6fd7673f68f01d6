use caretaker::core::renamer::bulk_rename;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_bulk_rename_suffix_pattern() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("a.txt"), b"a").unwrap();
    fs::write(temp.path().join("b.txt"), b"b").unwrap();
    fs::write(temp.path().join("c.log"), b"c").unwrap();

    let report = bulk_rename(temp.path(), "*.txt", ".md").unwrap();

    assert_eq!(report.renamed_count(), 2);
    assert!(temp.path().join("a.md").is_file());
    assert!(temp.path().join("b.md").is_file());
    assert!(temp.path().join("c.log").is_file());
    assert!(!temp.path().join("a.txt").exists());
}

#[test]
fn test_bulk_rename_in_folder_with_glob_characters() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("shots [2026] *raw?");
    fs::create_dir(&dir).unwrap();
    fs::write(dir.join("IMG_1.jpg"), b"1").unwrap();

    let report = bulk_rename(&dir, "IMG_*", "trip_").unwrap();

    assert_eq!(report.renamed_count(), 1);
    assert!(report.failed.is_empty());
    assert_eq!(fs::read(dir.join("trip_1.jpg")).unwrap(), b"1");
}

#[test]
fn test_bulk_rename_missing_folder_is_error() {
    let temp = TempDir::new().unwrap();
    assert!(bulk_rename(&temp.path().join("nope"), "IMG_*", "x").is_err());
}
