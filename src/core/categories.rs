//! Extension based file categories
//!
//! A [`CategoryRules`] set maps category labels to the file extensions they
//! claim. Rules are static configuration: they are validated once when built
//! and never change afterwards.

use crate::error::{CaretakerError, Result};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Category used for files whose extension no rule claims
pub const OTHER_CATEGORY: &str = "Other";

const DEFAULT_RULES: &[(&str, &[&str])] = &[
    ("Images", &["jpg", "jpeg", "png", "gif", "bmp", "tiff", "svg"]),
    ("Documents", &["pdf", "doc", "docx", "txt", "rtf", "odt"]),
    ("Spreadsheets", &["xls", "xlsx", "csv", "ods"]),
    ("Presentations", &["ppt", "pptx", "odp"]),
    ("Videos", &["mp4", "avi", "mkv", "mov", "wmv", "flv", "webm"]),
    ("Audio", &["mp3", "wav", "flac", "aac", "ogg", "wma"]),
    ("Archives", &["zip", "rar", "7z", "tar", "gz", "bz2"]),
    ("Code", &["py", "js", "html", "css", "java", "cpp", "c", "php"]),
];

/// Ordered category rules with a precomputed extension index
#[derive(Debug, Clone)]
pub struct CategoryRules {
    rules: Vec<(String, Vec<String>)>,
    index: HashMap<String, usize>,
}

impl CategoryRules {
    /// Build a rule set, rejecting overlapping extensions and the reserved
    /// `Other` label
    pub fn new<I, S, E>(rules: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<E>)>,
        S: Into<String>,
        E: AsRef<str>,
    {
        let mut normalized: Vec<(String, Vec<String>)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for (label, extensions) in rules {
            let label = label.into();
            if label.trim().is_empty() {
                return Err(CaretakerError::config("Category name cannot be empty"));
            }
            if label.eq_ignore_ascii_case(OTHER_CATEGORY) {
                return Err(CaretakerError::config(format!(
                    "'{}' is reserved for unmatched files",
                    OTHER_CATEGORY
                )));
            }

            let position = normalized.len();
            let mut exts = Vec::new();
            for ext in extensions {
                let ext = normalize_extension(ext.as_ref());
                if ext.is_empty() {
                    continue;
                }
                if let Some(&owner) = index.get(&ext) {
                    return Err(CaretakerError::config(format!(
                        "Extension '.{}' is claimed by both '{}' and '{}'",
                        ext, normalized[owner].0, label
                    )));
                }
                index.insert(ext.clone(), position);
                exts.push(ext);
            }
            normalized.push((label, exts));
        }

        Ok(Self {
            rules: normalized,
            index,
        })
    }

    /// Build from a config map of label -> extensions
    pub fn from_map(map: &BTreeMap<String, Vec<String>>) -> Result<Self> {
        Self::new(map.iter().map(|(k, v)| (k.clone(), v.clone())))
    }

    /// Category for an extension (with or without leading dot)
    pub fn category_for_extension(&self, extension: &str) -> &str {
        let ext = normalize_extension(extension);
        match self.index.get(&ext) {
            Some(&i) => &self.rules[i].0,
            None => OTHER_CATEGORY,
        }
    }

    /// Category for a file path, based on its final extension
    pub fn category_for_path(&self, path: &Path) -> &str {
        match path.extension() {
            Some(ext) => self.category_for_extension(&ext.to_string_lossy()),
            None => OTHER_CATEGORY,
        }
    }

    /// All category labels in rule order, without `Other`
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|(label, _)| label.as_str())
    }

    pub fn extensions(&self, category: &str) -> Option<&[String]> {
        self.rules
            .iter()
            .find(|(label, _)| label == category)
            .map(|(_, exts)| exts.as_slice())
    }
}

impl Default for CategoryRules {
    fn default() -> Self {
        let mut rules = Vec::with_capacity(DEFAULT_RULES.len());
        let mut index = HashMap::new();
        for (position, (label, exts)) in DEFAULT_RULES.iter().enumerate() {
            for ext in exts.iter() {
                index.insert((*ext).to_string(), position);
            }
            rules.push((
                (*label).to_string(),
                exts.iter().map(|e| (*e).to_string()).collect(),
            ));
        }
        Self { rules, index }
    }
}

fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}
