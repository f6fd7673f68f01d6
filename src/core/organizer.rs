//! File organizer for download-style inbox directories
//!
//! Moves every regular file found directly inside a source directory into a
//! category folder under an organized root, and prunes directories left empty.
//!
//! # Examples
//!
//! ```no_run
//! use caretaker::core::organizer::FileOrganizer;
//! use std::path::Path;
//!
//! let organizer = FileOrganizer::default();
//! let report = organizer.organize(Path::new("/home/me/Downloads"), Path::new("/home/me/Organized"));
//! println!("Moved {} files ({} failed)", report.moved_count(), report.failed_count());
//! ```

use crate::core::categories::CategoryRules;
use log::{error, info, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Outcome of moving a single file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    Failed(String),
}

/// One file processed by [`FileOrganizer::organize`]
#[derive(Debug, Clone)]
pub struct MoveRecord {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub category: String,
    pub outcome: MoveOutcome,
}

impl MoveRecord {
    pub fn is_moved(&self) -> bool {
        self.outcome == MoveOutcome::Moved
    }
}

/// Per-file results of one organize run
#[derive(Debug, Default)]
pub struct OrganizeReport {
    /// The source directory did not exist; nothing was attempted
    pub source_missing: bool,
    pub records: Vec<MoveRecord>,
}

impl OrganizeReport {
    pub fn moved_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_moved()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.records.len() - self.moved_count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &MoveRecord> {
        self.records.iter().filter(|r| !r.is_moved())
    }
}

/// Classifies files by extension and relocates them
#[derive(Debug, Clone, Default)]
pub struct FileOrganizer {
    rules: CategoryRules,
}

impl FileOrganizer {
    pub fn new(rules: CategoryRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &CategoryRules {
        &self.rules
    }

    /// Move every regular file directly inside `source_dir` into
    /// `dest_root/<category>/`
    ///
    /// Files are processed in name order. A failure on one file is recorded
    /// and the batch continues.
    pub fn organize(&self, source_dir: &Path, dest_root: &Path) -> OrganizeReport {
        let mut report = OrganizeReport::default();

        if !source_dir.is_dir() {
            error!("Source directory {} does not exist", source_dir.display());
            report.source_missing = true;
            return report;
        }

        let mut files = match list_files(source_dir) {
            Ok(files) => files,
            Err(e) => {
                error!("Failed to read {}: {}", source_dir.display(), e);
                return report;
            }
        };
        files.sort();

        for source in files {
            let category = self.rules.category_for_path(&source).to_string();
            let category_dir = dest_root.join(&category);
            let file_name = source.file_name().map(PathBuf::from).unwrap_or_default();

            if let Err(e) = fs::create_dir_all(&category_dir) {
                error!("Error creating {}: {}", category_dir.display(), e);
                report.records.push(MoveRecord {
                    destination: category_dir.join(&file_name),
                    source,
                    category,
                    outcome: MoveOutcome::Failed(e.to_string()),
                });
                continue;
            }

            let destination = unique_destination(&category_dir, &source);
            let outcome = match move_file(&source, &destination) {
                Ok(()) => {
                    info!("Moved {} to {}", file_name.display(), category);
                    MoveOutcome::Moved
                }
                Err(e) => {
                    error!("Error moving {}: {}", file_name.display(), e);
                    MoveOutcome::Failed(e.to_string())
                }
            };

            report.records.push(MoveRecord {
                source,
                destination,
                category,
                outcome,
            });
        }

        info!("Organized {} files", report.moved_count());
        if report.failed_count() > 0 {
            warn!("{} files could not be moved", report.failed_count());
        }
        report
    }

    /// Remove directories below `root` that are empty once their own
    /// children have been pruned. `root` itself is kept.
    pub fn prune_empty_directories(&self, root: &Path) -> Vec<PathBuf> {
        prune_empty_directories(root)
    }
}

/// Post-order removal of empty directories below `root`
///
/// Removal failures (a file appeared, permissions) are ignored.
pub fn prune_empty_directories(root: &Path) -> Vec<PathBuf> {
    let mut removed = Vec::new();
    prune_recursive(root, &mut removed);
    removed
}

fn prune_recursive(dir: &Path, removed: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if !file_type.is_dir() {
            continue;
        }

        let path = entry.path();
        prune_recursive(&path, removed);

        let is_empty = fs::read_dir(&path)
            .map(|mut it| it.next().is_none())
            .unwrap_or(false);
        if is_empty && fs::remove_dir(&path).is_ok() {
            info!("Removed empty folder: {}", path.display());
            removed.push(path);
        }
    }
}

/// First free path in `dir` for `source`'s file name: `name.ext`, then
/// `name_1.ext`, `name_2.ext`, ...
pub fn unique_destination(dir: &Path, source: &Path) -> PathBuf {
    let file_name = source.file_name().unwrap_or_default();
    let mut candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let suffix = source
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut counter = 1u32;
    while candidate.exists() {
        candidate = dir.join(format!("{}_{}{}", stem, counter, suffix));
        counter += 1;
    }
    candidate
}

fn list_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    Ok(files)
}

/// Rename, falling back to copy + remove when the rename cannot cross
/// filesystems
fn move_file(source: &Path, destination: &Path) -> io::Result<()> {
    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            if fs::copy(source, destination).is_err() {
                return Err(rename_err);
            }
            if let Err(e) = fs::remove_file(source) {
                // Keep exactly one copy of the file
                let _ = fs::remove_file(destination);
                return Err(e);
            }
            Ok(())
        }
    }
}
