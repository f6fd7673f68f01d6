use crate::core::categories::CategoryRules;
use crate::core::health::Target;
use crate::core::scheduler::trigger::{parse_time, parse_weekday};
use crate::error::{CaretakerError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// Environment variable pointing at an alternate config file
pub const CONFIG_ENV: &str = "CARETAKER_CONFIG";

/// Environment fallback for `smtp.password`
pub const SMTP_PASSWORD_ENV: &str = "CARETAKER_SMTP_PASSWORD";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub organizer: OrganizerSettings,
    #[serde(default)]
    pub backup: BackupSettings,
    #[serde(default)]
    pub monitor: MonitorSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smtp: Option<SmtpSettings>,
    #[serde(default)]
    pub notify: NotifySettings,
    #[serde(default)]
    pub schedule: ScheduleSettings,
    #[serde(default)]
    pub system_report: SystemReportSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizerSettings {
    pub enabled: bool,
    pub source_dir: PathBuf,
    pub organized_dir: PathBuf,
    /// Replaces the built-in category rules when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<BTreeMap<String, Vec<String>>>,
}

impl Default for OrganizerSettings {
    fn default() -> Self {
        let home = home_dir();
        Self {
            enabled: false,
            source_dir: home.join("Downloads"),
            organized_dir: home.join("Organized"),
            categories: None,
        }
    }
}

impl OrganizerSettings {
    pub fn rules(&self) -> Result<CategoryRules> {
        match &self.categories {
            Some(map) => CategoryRules::from_map(map),
            None => Ok(CategoryRules::default()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupSettings {
    pub enabled: bool,
    pub sources: Vec<PathBuf>,
    pub backup_dir: PathBuf,
    pub with_timestamp: bool,
    /// Snapshots older than this are removed after each backup run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention_days: Option<u64>,
}

impl Default for BackupSettings {
    fn default() -> Self {
        let home = home_dir();
        Self {
            enabled: false,
            sources: vec![home.join("Documents")],
            backup_dir: home.join("Backups"),
            with_timestamp: true,
            retention_days: Some(30),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSettings {
    pub enabled: bool,
    pub targets: Vec<Target>,
    pub timeout_secs: u64,
    pub status_file: PathBuf,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            targets: Vec::new(),
            timeout_secs: 10,
            status_file: data_dir().join("website_status.json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpSettings {
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Sender mailbox; defaults to `username`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default = "default_smtp_timeout")]
    pub timeout_secs: u64,
}

fn default_smtp_port() -> u16 {
    587
}

fn default_smtp_timeout() -> u64 {
    30
}

impl SmtpSettings {
    pub fn sender(&self) -> &str {
        self.from.as_deref().unwrap_or(&self.username)
    }

    /// Config value first, then `CARETAKER_SMTP_PASSWORD`
    pub fn resolved_password(&self) -> Option<String> {
        self.password
            .clone()
            .or_else(|| env::var(SMTP_PASSWORD_ENV).ok())
            .filter(|p| !p.is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifySettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    /// Mail a summary whenever a scheduled task fails
    pub on_failure: bool,
    /// Mail an alert when a monitored target goes from UP to DOWN
    pub alert_on_down: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleSettings {
    pub poll_interval_secs: u64,
    pub organize_at: String,
    pub backup_weekday: String,
    pub backup_at: String,
    pub monitor_every_minutes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_report_every_minutes: Option<u64>,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: 60,
            organize_at: "02:00".to_string(),
            backup_weekday: "sunday".to_string(),
            backup_at: "03:00".to_string(),
            monitor_every_minutes: 30,
            system_report_every_minutes: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemReportSettings {
    pub csv_path: PathBuf,
}

impl Default for SystemReportSettings {
    fn default() -> Self {
        Self {
            csv_path: data_dir().join("system_report.csv"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Config {
    /// Load from `$CARETAKER_CONFIG` or the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    /// Load from an explicit path; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let data = fs::read(path)?;
        if data.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(Config::default());
        }

        serde_json::from_slice(&data).map_err(|e| {
            CaretakerError::config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        if let Ok(path) = env::var(CONFIG_ENV) {
            if !path.is_empty() {
                return Ok(PathBuf::from(path));
            }
        }

        let config_dir = dirs::config_dir()
            .ok_or_else(|| CaretakerError::config("Could not determine config directory"))?;

        Ok(config_dir.join("caretaker").join("config.json"))
    }

    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.schedule.poll_interval_secs)
    }

    /// Check everything that would otherwise fail at run time
    pub fn validate(&self) -> Result<()> {
        self.organizer.rules()?;

        parse_time(&self.schedule.organize_at)?;
        parse_time(&self.schedule.backup_at)?;
        parse_weekday(&self.schedule.backup_weekday)?;

        if self.schedule.poll_interval_secs == 0 {
            return Err(CaretakerError::config("schedule.poll_interval_secs must be > 0"));
        }
        if self.schedule.monitor_every_minutes == 0 {
            return Err(CaretakerError::config("schedule.monitor_every_minutes must be > 0"));
        }
        if self.schedule.system_report_every_minutes == Some(0) {
            return Err(CaretakerError::config(
                "schedule.system_report_every_minutes must be > 0",
            ));
        }
        if self.backup.retention_days == Some(0) {
            return Err(CaretakerError::config(
                "backup.retention_days must be > 0 (omit it to keep every backup)",
            ));
        }
        if self.monitor.timeout_secs == 0 {
            return Err(CaretakerError::config("monitor.timeout_secs must be > 0"));
        }

        let mut names = HashSet::new();
        for target in &self.monitor.targets {
            if !names.insert(target.name.as_str()) {
                return Err(CaretakerError::config(format!(
                    "Duplicate monitor target name '{}'",
                    target.name
                )));
            }
            validate_target_url(&target.url)?;
        }

        if let Some(smtp) = &self.smtp {
            if smtp.host.trim().is_empty() {
                return Err(CaretakerError::config("smtp.host cannot be empty"));
            }
        }

        Ok(())
    }
}

fn validate_target_url(value: &str) -> Result<()> {
    let url = Url::parse(value)
        .map_err(|e| CaretakerError::config(format!("Invalid target URL '{}': {}", value, e)))?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(()),
        _ => Err(CaretakerError::config(format!(
            "Target URL '{}' must be http(s) with a host",
            value
        ))),
    }
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("caretaker"))
        .unwrap_or_else(|| PathBuf::from("."))
}
