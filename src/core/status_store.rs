// Last-known health snapshot persisted as a single JSON object

use crate::core::health::HealthSnapshot;
use crate::error::Result;
use log::error;
use std::fs;
use std::path::{Path, PathBuf};

/// JSON file holding the latest monitoring pass, keyed by target name
#[derive(Debug, Clone)]
pub struct StatusStore {
    path: PathBuf,
}

impl StatusStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the previous snapshot
    ///
    /// A missing file is an empty snapshot. A corrupt or unreadable file is
    /// logged and also treated as empty.
    pub fn load(&self) -> HealthSnapshot {
        if !self.path.exists() {
            return HealthSnapshot::new();
        }

        match self.try_load() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!("Error loading status from {}: {}", self.path.display(), e);
                HealthSnapshot::new()
            }
        }
    }

    fn try_load(&self) -> Result<HealthSnapshot> {
        let data = fs::read(&self.path)?;
        if data.is_empty() {
            return Ok(HealthSnapshot::new());
        }
        Ok(serde_json::from_slice(&data)?)
    }

    /// Replace the stored snapshot with `snapshot`
    ///
    /// The JSON is written to a sibling temp file and renamed into place, so
    /// readers see either the old or the new pass, never a mix.
    pub fn save(&self, snapshot: &HealthSnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let data = serde_json::to_vec_pretty(snapshot)?;
        let tmp = self.tmp_path();
        fs::write(&tmp, data)?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "status.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
