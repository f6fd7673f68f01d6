use crate::core::system_report::SystemReport;
use crate::core::Config;
use crate::ui::format_size;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

pub fn execute(matches: &clap::ArgMatches, config: &Config) -> Result<()> {
    let csv_path = matches
        .get_one::<PathBuf>("csv")
        .cloned()
        .unwrap_or_else(|| config.system_report.csv_path.clone());

    println!("{}", "Sampling system usage...".dimmed());
    let report = SystemReport::collect();

    println!();
    println!("{}", "System Report".white().bold());
    println!("  {:<8} {:.1}%", "CPU", report.cpu_percent);
    println!(
        "  {:<8} {:.1}% ({} available of {})",
        "Memory",
        report.memory.percent,
        format_size(report.memory.available),
        format_size(report.memory.total)
    );
    println!(
        "  {:<8} {:.1}% ({} free of {})",
        "Disk",
        report.disk.percent,
        format_size(report.disk.free),
        format_size(report.disk.total)
    );

    report
        .append_csv(&csv_path)
        .with_context(|| format!("Failed to write {}", csv_path.display()))?;

    println!();
    println!(
        "{} {}",
        "Appended to".dimmed(),
        csv_path.display().to_string().dimmed()
    );
    Ok(())
}
