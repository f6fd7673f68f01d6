// Bulk file renaming by glob pattern

use crate::error::{CaretakerError, Result};
use log::{error, info};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct RenameReport {
    pub renamed: Vec<(PathBuf, PathBuf)>,
    pub failed: Vec<(PathBuf, String)>,
}

impl RenameReport {
    pub fn renamed_count(&self) -> usize {
        self.renamed.len()
    }
}

/// Rename files in `dir` matching `pattern` (e.g. `IMG_*`)
///
/// The pattern with its `*` wildcards removed is the literal text replaced by
/// `replacement` in each matching file name. Existing files are never
/// overwritten; such collisions are reported as failures.
pub fn bulk_rename(dir: &Path, pattern: &str, replacement: &str) -> Result<RenameReport> {
    let literal = pattern.replace('*', "");
    if literal.is_empty() {
        return Err(CaretakerError::other(format!(
            "Pattern '{}' has no literal text to replace",
            pattern
        )));
    }
    if !dir.is_dir() {
        return Err(CaretakerError::invalid_path(format!(
            "{} is not a directory",
            dir.display()
        )));
    }

    let escaped_dir = glob::Pattern::escape(&dir.to_string_lossy());
    let full_pattern = format!("{}/{}", escaped_dir.trim_end_matches('/'), pattern);
    let matches = glob::glob(&full_pattern)
        .map_err(|e| CaretakerError::other(format!("Invalid pattern '{}': {}", pattern, e)))?;

    let mut report = RenameReport::default();
    for entry in matches {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                report.failed.push((e.path().to_path_buf(), e.to_string()));
                continue;
            }
        };
        if !path.is_file() {
            continue;
        }

        let Some(name) = path.file_name().map(|n| n.to_string_lossy().to_string()) else {
            continue;
        };
        let new_name = name.replace(&literal, replacement);
        if new_name == name || new_name.is_empty() {
            continue;
        }

        let new_path = path.with_file_name(&new_name);
        if new_path.exists() {
            let detail = format!("{} already exists", new_path.display());
            error!("Error renaming {}: {}", name, detail);
            report.failed.push((path, detail));
            continue;
        }

        match fs::rename(&path, &new_path) {
            Ok(()) => {
                info!("Renamed {} to {}", name, new_name);
                report.renamed.push((path, new_path));
            }
            Err(e) => {
                error!("Error renaming {}: {}", name, e);
                report.failed.push((path, e.to_string()));
            }
        }
    }

    Ok(report)
}
