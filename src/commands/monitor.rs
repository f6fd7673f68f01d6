use crate::core::{Config, HealthChecker, HealthSnapshot, StatusStore};
use crate::ui::{format_latency, format_status};
use anyhow::{Context, Result};
use colored::Colorize;
use std::time::Duration;

/// One monitoring pass over every configured target
pub fn execute(_matches: &clap::ArgMatches, config: &Config) -> Result<()> {
    let targets = &config.monitor.targets;
    if targets.is_empty() {
        println!("{}", "No monitor targets configured.".yellow());
        println!(
            "{}",
            "Add {\"name\": ..., \"url\": ...} entries to monitor.targets in the config file."
                .dimmed()
        );
        return Ok(());
    }

    let store = StatusStore::new(config.monitor.status_file.clone());
    let checker = HealthChecker::new(store, Duration::from_secs(config.monitor.timeout_secs))
        .context("Failed to create HTTP client")?;

    println!(
        "{}",
        format!("Checking {} target(s)...", targets.len()).cyan().bold()
    );
    println!();

    let (snapshot, changes) = checker.probe_all_with_changes(targets);
    print_snapshot(&snapshot);

    if !changes.is_empty() {
        println!();
        println!("{}", "Status changes since last pass:".white().bold());
        for change in &changes {
            println!(
                "  {} {} → {}",
                change.name,
                format_status(change.previous),
                format_status(change.current)
            );
        }
    }

    println!();
    println!(
        "{} {}",
        "Status saved to".dimmed(),
        checker.store().path().display().to_string().dimmed()
    );
    Ok(())
}

/// Print the last persisted snapshot without probing
pub fn status(config: &Config) -> Result<()> {
    let store = StatusStore::new(config.monitor.status_file.clone());
    let snapshot = store.load();

    if snapshot.is_empty() {
        println!(
            "{}",
            "No status recorded yet. Run 'caretaker monitor' first.".yellow()
        );
        return Ok(());
    }

    print_snapshot(&snapshot);
    Ok(())
}

fn print_snapshot(snapshot: &HealthSnapshot) {
    let name_width = snapshot
        .keys()
        .map(|k| k.chars().count())
        .max()
        .unwrap_or(4)
        .max(4);

    let header = format!(
        "  {:<width$}  {:<6}  {:<5}  {:<8}  {}",
        "NAME",
        "STATUS",
        "CODE",
        "LATENCY",
        "CHECKED",
        width = name_width
    );
    println!("{}", header.white().bold());

    for (name, record) in snapshot {
        let code = record
            .status_code
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string());
        let status = format!("{:<6}", record.status.to_string());
        let status = if record.is_up() {
            status.green().bold()
        } else {
            status.red().bold()
        };

        println!(
            "  {:<width$}  {}  {:<5}  {:<8}  {}",
            name,
            status,
            code,
            format_latency(record.response_time),
            record.timestamp.format("%Y-%m-%d %H:%M").to_string().dimmed(),
            width = name_width
        );
        if let Some(error) = &record.error {
            println!("  {:<width$}  {}", "", error.red().dimmed(), width = name_width);
        }
    }
}
