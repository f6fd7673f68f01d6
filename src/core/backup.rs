//! Directory backups with retention
//!
//! Each run copies every configured source tree into
//! `backup_root/<name>_<YYYYMMDD_HHMMSS>` (or `backup_root/<name>` when
//! timestamps are disabled). Copies merge into an existing destination and
//! overwrite colliding files; they are not atomic.

use chrono::{DateTime, Local};
use log::{error, info, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use walkdir::WalkDir;

/// Format of the snapshot directory suffix
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// A source tree copied by one backup run
#[derive(Debug, Clone)]
pub struct BackupSnapshot {
    pub source_name: String,
    /// Empty when timestamping is disabled
    pub timestamp_label: String,
    pub path: PathBuf,
    pub created_at: DateTime<Local>,
}

#[derive(Debug, Default)]
pub struct BackupReport {
    pub created: Vec<BackupSnapshot>,
    /// Sources that did not exist
    pub skipped: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

impl BackupReport {
    pub fn created_paths(&self) -> Vec<PathBuf> {
        self.created.iter().map(|s| s.path.clone()).collect()
    }
}

#[derive(Debug, Default)]
pub struct CleanupReport {
    pub removed: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

impl CleanupReport {
    pub fn removed_count(&self) -> usize {
        self.removed.len()
    }
}

/// Mirrors source directories into snapshot directories under a backup root
#[derive(Debug, Clone)]
pub struct BackupReplicator {
    sources: Vec<PathBuf>,
    backup_root: PathBuf,
}

impl BackupReplicator {
    pub fn new(sources: Vec<PathBuf>, backup_root: PathBuf) -> Self {
        Self {
            sources,
            backup_root,
        }
    }

    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    pub fn backup_root(&self) -> &Path {
        &self.backup_root
    }

    /// Snapshot every source using the current local time
    pub fn snapshot(&self, with_timestamp: bool) -> BackupReport {
        self.snapshot_at(Local::now(), with_timestamp)
    }

    /// Snapshot every source, labelling directories with `now`
    pub fn snapshot_at(&self, now: DateTime<Local>, with_timestamp: bool) -> BackupReport {
        let mut report = BackupReport::default();
        let label = if with_timestamp {
            now.format(TIMESTAMP_FORMAT).to_string()
        } else {
            String::new()
        };

        if let Err(e) = fs::create_dir_all(&self.backup_root) {
            error!(
                "Cannot create backup directory {}: {}",
                self.backup_root.display(),
                e
            );
            for source in &self.sources {
                report.failed.push((source.clone(), e.to_string()));
            }
            return report;
        }

        for source in &self.sources {
            if !source.is_dir() {
                warn!("Source directory {} does not exist", source.display());
                report.skipped.push(source.clone());
                continue;
            }

            let Some(name) = source.file_name().map(|n| n.to_string_lossy().to_string()) else {
                let detail = "source has no directory name".to_string();
                error!("Backup failed for {}: {}", source.display(), detail);
                report.failed.push((source.clone(), detail));
                continue;
            };

            let dir_name = if label.is_empty() {
                name.clone()
            } else {
                format!("{}_{}", name, label)
            };
            let destination = self.backup_root.join(dir_name);

            match copy_tree_excluding(source, &destination, &self.backup_root) {
                Ok(files) => {
                    info!(
                        "Backup created: {} ({} files)",
                        destination.display(),
                        files
                    );
                    report.created.push(BackupSnapshot {
                        source_name: name,
                        timestamp_label: label.clone(),
                        path: destination,
                        created_at: now,
                    });
                }
                Err(e) => {
                    error!("Backup failed for {}: {}", source.display(), e);
                    report.failed.push((source.clone(), e.to_string()));
                }
            }
        }

        report
    }

    /// Remove snapshot directories whose age has reached `retention_days`
    ///
    /// `cleanup(0)` removes every snapshot.
    pub fn cleanup(&self, retention_days: u64) -> CleanupReport {
        self.cleanup_at(SystemTime::now(), retention_days)
    }

    pub fn cleanup_at(&self, now: SystemTime, retention_days: u64) -> CleanupReport {
        let mut report = CleanupReport::default();
        let window = Duration::from_secs(retention_days.saturating_mul(SECS_PER_DAY));

        let entries = match fs::read_dir(&self.backup_root) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(
                    "Backup directory {} is not readable: {}",
                    self.backup_root.display(),
                    e
                );
                return report;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            if !metadata.is_dir() {
                continue;
            }

            let modified = metadata.modified().unwrap_or(now);
            // A timestamp in the future counts as age zero
            let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
            if age < window {
                continue;
            }

            match fs::remove_dir_all(&path) {
                Ok(()) => {
                    info!("Removed old backup: {}", path.display());
                    report.removed.push(path);
                }
                Err(e) => {
                    error!("Error removing {}: {}", path.display(), e);
                    report.failed.push((path, e.to_string()));
                }
            }
        }

        info!("Removed {} old backups", report.removed_count());
        report
    }
}

/// Recursively copy `source` into `destination`, overwriting existing files
///
/// Returns the number of files copied. A `destination` inside `source` is
/// not walked.
pub fn copy_tree(source: &Path, destination: &Path) -> io::Result<usize> {
    copy_tree_excluding(source, destination, destination)
}

/// [`copy_tree`] that also skips everything under `exclude`
pub fn copy_tree_excluding(source: &Path, destination: &Path, exclude: &Path) -> io::Result<usize> {
    let mut copied = 0;
    fs::create_dir_all(destination)?;

    let root = fs::canonicalize(source)?;
    let exclude = fs::canonicalize(exclude).unwrap_or_else(|_| exclude.to_path_buf());
    let walker = WalkDir::new(&root)
        .min_depth(1)
        .into_iter()
        .filter_entry(|e| !e.path().starts_with(&exclude));

    for entry in walker {
        let entry = entry.map_err(io::Error::other)?;
        let relative = entry
            .path()
            .strip_prefix(&root)
            .map_err(io::Error::other)?;
        let target = destination.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }

    Ok(copied)
}
