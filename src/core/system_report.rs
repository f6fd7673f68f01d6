//! System resource usage report
//!
//! Samples CPU, memory and root-disk usage and appends one row per sample to
//! a CSV file for historical tracking.

use crate::error::Result;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::path::Path;
use sysinfo::{CpuRefreshKind, Disks, MemoryRefreshKind, RefreshKind, System};

#[derive(Debug, Clone, Default, Serialize)]
pub struct MemoryUsage {
    pub total: u64,
    pub available: u64,
    pub percent: f32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DiskUsage {
    pub total: u64,
    pub free: u64,
    pub percent: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemReport {
    pub timestamp: DateTime<Local>,
    pub cpu_percent: f32,
    pub memory: MemoryUsage,
    pub disk: DiskUsage,
}

/// One CSV row
#[derive(Debug, Serialize)]
struct ReportRow {
    timestamp: String,
    cpu_percent: f32,
    memory_percent: f32,
    disk_percent: f32,
}

impl SystemReport {
    /// Sample the current machine
    ///
    /// Blocks for `sysinfo::MINIMUM_CPU_UPDATE_INTERVAL` so CPU usage has two
    /// data points.
    pub fn collect() -> Self {
        let refresh_kind = RefreshKind::nothing()
            .with_cpu(CpuRefreshKind::nothing().with_cpu_usage())
            .with_memory(MemoryRefreshKind::everything());
        let mut system = System::new_with_specifics(refresh_kind);

        std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
        system.refresh_cpu_usage();
        system.refresh_memory();

        let total = system.total_memory();
        let available = system.available_memory();
        let memory = MemoryUsage {
            total,
            available,
            percent: used_percent(total, available),
        };

        Self {
            timestamp: Local::now(),
            cpu_percent: system.global_cpu_usage(),
            memory,
            disk: root_disk_usage(),
        }
    }

    /// Append this report to `csv_path`, writing the header for a new file
    pub fn append_csv(&self, csv_path: &Path) -> Result<()> {
        let file_exists = csv_path.exists() && fs::metadata(csv_path)?.len() > 0;
        if let Some(parent) = csv_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(csv_path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(!file_exists)
            .from_writer(file);

        writer.serialize(ReportRow {
            timestamp: self.timestamp.to_rfc3339(),
            cpu_percent: self.cpu_percent,
            memory_percent: self.memory.percent,
            disk_percent: self.disk.percent,
        })?;
        writer.flush()?;
        Ok(())
    }
}

/// Disk mounted at `/` (or the largest disk when there is none, e.g. Windows)
fn root_disk_usage() -> DiskUsage {
    let disks = Disks::new_with_refreshed_list();
    let disk = disks
        .list()
        .iter()
        .find(|d| d.mount_point() == Path::new("/"))
        .or_else(|| disks.list().iter().max_by_key(|d| d.total_space()));

    match disk {
        Some(disk) => {
            let total = disk.total_space();
            let free = disk.available_space();
            DiskUsage {
                total,
                free,
                percent: used_percent(total, free),
            }
        }
        None => DiskUsage::default(),
    }
}

fn used_percent(total: u64, available: u64) -> f32 {
    if total == 0 {
        return 0.0;
    }
    let used = total.saturating_sub(available);
    (used as f64 / total as f64 * 100.0) as f32
}
