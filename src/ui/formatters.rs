use crate::core::health::HealthStatus;
use chrono::NaiveDateTime;
use colored::{ColoredString, Colorize};

/// Format file size in human-readable format (B, KB, MB, GB)
pub fn format_size(size: u64) -> String {
    if size < 1024 {
        format!("{}B", size)
    } else if size < 1024 * 1024 {
        format!("{:.1}KB", size as f64 / 1024.0)
    } else if size < 1024 * 1024 * 1024 {
        format!("{:.1}MB", size as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.1}GB", size as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

pub fn format_naive(time: NaiveDateTime) -> String {
    time.format("%Y-%m-%d %H:%M").to_string()
}

/// Latency in milliseconds below one second, seconds above
pub fn format_latency(seconds: Option<f64>) -> String {
    match seconds {
        Some(s) if s < 1.0 => format!("{:.0}ms", s * 1000.0),
        Some(s) => format!("{:.2}s", s),
        None => "-".to_string(),
    }
}

pub fn format_status(status: HealthStatus) -> ColoredString {
    match status {
        HealthStatus::Up => "UP".green().bold(),
        HealthStatus::Down => "DOWN".red().bold(),
    }
}
