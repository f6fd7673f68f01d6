//! HTTP uptime probes
//!
//! A probe is a single blocking GET with a caller supplied timeout. Any HTTP
//! response counts as UP; transport errors (DNS, connect, TLS, timeout) are
//! DOWN. Probes never retry: the scheduler re-runs the monitoring job.

use crate::core::status_store::StatusStore;
use crate::error::Result;
use chrono::{DateTime, Local};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

/// Latest record per target name
pub type HealthSnapshot = BTreeMap<String, HealthRecord>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    Up,
    Down,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStatus::Up => write!(f, "UP"),
            HealthStatus::Down => write!(f, "DOWN"),
        }
    }
}

/// Result of probing one target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthRecord {
    pub name: String,
    pub url: String,
    pub status: HealthStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// Seconds until the response headers arrived
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Local>,
}

impl HealthRecord {
    pub fn is_up(&self) -> bool {
        self.status == HealthStatus::Up
    }
}

/// A monitored endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub name: String,
    pub url: String,
}

impl Target {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// A target whose status differs between two snapshots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub name: String,
    pub previous: HealthStatus,
    pub current: HealthStatus,
}

impl StatusChange {
    pub fn went_down(&self) -> bool {
        self.previous == HealthStatus::Up && self.current == HealthStatus::Down
    }
}

pub struct HealthChecker {
    client: reqwest::blocking::Client,
    store: StatusStore,
    timeout: Duration,
}

impl HealthChecker {
    pub fn new(store: StatusStore, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("caretaker/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            store,
            timeout,
        })
    }

    pub fn store(&self) -> &StatusStore {
        &self.store
    }

    /// Probe one URL with the given timeout
    pub fn probe(&self, name: &str, url: &str, timeout: Duration) -> HealthRecord {
        let started = Instant::now();
        let result = self.client.get(url).timeout(timeout).send();
        let elapsed = started.elapsed().as_secs_f64();

        match result {
            Ok(response) => HealthRecord {
                name: name.to_string(),
                url: url.to_string(),
                status: HealthStatus::Up,
                status_code: Some(response.status().as_u16()),
                response_time: Some(elapsed),
                error: None,
                timestamp: Local::now(),
            },
            Err(e) => HealthRecord {
                name: name.to_string(),
                url: url.to_string(),
                status: HealthStatus::Down,
                status_code: None,
                response_time: None,
                error: Some(error_chain(&e)),
                timestamp: Local::now(),
            },
        }
    }

    /// Probe every target and persist the full pass, replacing the previous
    /// snapshot
    pub fn probe_all(&self, targets: &[Target]) -> HealthSnapshot {
        let mut results = HealthSnapshot::new();

        for target in targets {
            info!("Checking {} ({})", target.name, target.url);
            let record = self.probe(&target.name, &target.url, self.timeout);

            if record.is_up() {
                info!(
                    "{} is UP (Response time: {:.3}s)",
                    target.name,
                    record.response_time.unwrap_or_default()
                );
            } else {
                warn!(
                    "{} is DOWN - {}",
                    target.name,
                    record.error.as_deref().unwrap_or("Unknown error")
                );
            }
            results.insert(target.name.clone(), record);
        }

        if let Err(e) = self.store.save(&results) {
            error!(
                "Error saving status to {}: {}",
                self.store.path().display(),
                e
            );
        }
        results
    }

    /// Load the previous pass, probe everything, and report status changes
    pub fn probe_all_with_changes(&self, targets: &[Target]) -> (HealthSnapshot, Vec<StatusChange>) {
        let previous = self.store.load();
        let current = self.probe_all(targets);
        let changes = transitions(&previous, &current);
        (current, changes)
    }
}

/// Targets present in both snapshots whose status changed
pub fn transitions(previous: &HealthSnapshot, current: &HealthSnapshot) -> Vec<StatusChange> {
    current
        .iter()
        .filter_map(|(name, record)| {
            let before = previous.get(name)?;
            (before.status != record.status).then(|| StatusChange {
                name: name.clone(),
                previous: before.status,
                current: record.status,
            })
        })
        .collect()
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
