// Backup snapshots and retention against temporary folders

use caretaker::core::BackupReplicator;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_tree(root: &Path) {
    fs::create_dir_all(root.join("sub")).unwrap();
    fs::write(root.join("top.txt"), b"top").unwrap();
    fs::write(root.join("sub").join("inner.txt"), b"inner").unwrap();
}

#[test]
fn test_snapshot_copies_whole_tree() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("Documents");
    let backups = temp.path().join("Backups");
    write_tree(&source);

    let replicator = BackupReplicator::new(vec![source.clone()], backups.clone());
    let report = replicator.snapshot(true);

    assert_eq!(report.created.len(), 1);
    let snapshot = &report.created[0];
    assert_eq!(snapshot.source_name, "Documents");
    assert!(snapshot
        .path
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("Documents_"));
    assert_eq!(fs::read(snapshot.path.join("sub").join("inner.txt")).unwrap(), b"inner");
    assert!(source.join("top.txt").is_file());
}

#[test]
fn test_snapshot_without_timestamp_overwrites_in_place() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("data");
    let backups = temp.path().join("backups");
    write_tree(&source);
    let replicator = BackupReplicator::new(vec![source.clone()], backups.clone());

    let first = replicator.snapshot(false);
    fs::write(source.join("top.txt"), b"changed").unwrap();
    let second = replicator.snapshot(false);

    assert_eq!(first.created_paths(), vec![backups.join("data")]);
    assert_eq!(second.created_paths(), vec![backups.join("data")]);
    assert_eq!(fs::read_dir(&backups).unwrap().count(), 1);
    assert_eq!(fs::read(backups.join("data").join("top.txt")).unwrap(), b"changed");
    assert_eq!(
        fs::read(backups.join("data").join("sub").join("inner.txt")).unwrap(),
        b"inner"
    );
}

#[test]
fn test_backup_root_inside_source_is_not_copied() {
    let temp = TempDir::new().unwrap();
    let home = temp.path().join("home");
    let backups = home.join("Backups");
    write_tree(&home);

    let replicator = BackupReplicator::new(vec![home.clone()], backups.clone());
    let first = replicator.snapshot(false);

    assert!(first.failed.is_empty());
    assert_eq!(first.created_paths(), vec![backups.join("home")]);
    assert_eq!(fs::read(backups.join("home").join("top.txt")).unwrap(), b"top");
    assert!(!backups.join("home").join("Backups").exists());

    // Earlier snapshots stay out of later ones
    let second = replicator.snapshot(true);
    assert!(second.failed.is_empty());
    let stamped = &second.created[0].path;
    assert!(stamped.join("sub").join("inner.txt").is_file());
    assert!(!stamped.join("Backups").exists());
}

#[test]
fn test_missing_source_is_skipped() {
    let temp = TempDir::new().unwrap();
    let present = temp.path().join("present");
    let missing = temp.path().join("missing");
    write_tree(&present);

    let replicator = BackupReplicator::new(
        vec![missing.clone(), present],
        temp.path().join("backups"),
    );
    let report = replicator.snapshot(false);

    assert_eq!(report.created.len(), 1);
    assert_eq!(report.skipped, vec![missing]);
    assert!(report.failed.is_empty());
}

#[test]
fn test_cleanup_zero_days_removes_every_snapshot() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("docs");
    let backups = temp.path().join("backups");
    write_tree(&source);
    fs::create_dir_all(&backups).unwrap();
    fs::write(backups.join("keep-me.txt"), b"not a snapshot").unwrap();

    let replicator = BackupReplicator::new(vec![source], backups.clone());
    replicator.snapshot(false);

    let report = replicator.cleanup(0);

    assert_eq!(report.removed_count(), 1);
    assert!(!backups.join("docs").exists());
    assert!(backups.join("keep-me.txt").is_file());
}

#[test]
fn test_cleanup_keeps_recent_snapshots() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("docs");
    write_tree(&source);

    let replicator = BackupReplicator::new(vec![source], temp.path().join("backups"));
    replicator.snapshot(true);

    let report = replicator.cleanup(30);

    assert_eq!(report.removed_count(), 0);
    assert_eq!(fs::read_dir(temp.path().join("backups")).unwrap().count(), 1);
}

#[test]
fn test_cleanup_missing_backup_root_is_noop() {
    let temp = TempDir::new().unwrap();
    let replicator = BackupReplicator::new(Vec::new(), temp.path().join("never-created"));

    let report = replicator.cleanup(0);

    assert_eq!(report.removed_count(), 0);
    assert!(report.failed.is_empty());
}
