use crate::core::{BackupReplicator, Config};
use anyhow::{Context, Result};
use colored::Colorize;

pub fn execute(matches: &clap::ArgMatches, config: &Config) -> Result<()> {
    let replicator = BackupReplicator::new(
        config.backup.sources.clone(),
        config.backup.backup_dir.clone(),
    );

    match matches.subcommand() {
        Some(("cleanup", sub_matches)) => cleanup(sub_matches, config, &replicator),
        _ => snapshot(matches, config, &replicator),
    }
}

fn snapshot(matches: &clap::ArgMatches, config: &Config, replicator: &BackupReplicator) -> Result<()> {
    if replicator.sources().is_empty() {
        println!("{}", "No backup sources configured.".yellow());
        println!("{}", "Add paths to backup.sources in the config file.".dimmed());
        return Ok(());
    }

    let with_timestamp = config.backup.with_timestamp && !matches.get_flag("no-timestamp");

    println!(
        "{} {}",
        "Backing up into".cyan().bold(),
        replicator.backup_root().display().to_string().white()
    );
    println!();

    let report = replicator.snapshot(with_timestamp);

    for snapshot in &report.created {
        println!("  {} {}", "✓".green(), snapshot.path.display());
    }
    for source in &report.skipped {
        println!(
            "  {} {} {}",
            "-".yellow(),
            source.display(),
            "(missing, skipped)".dimmed()
        );
    }
    for (source, detail) in &report.failed {
        println!(
            "  {} {} {}",
            "✗".red(),
            source.display(),
            format!("({})", detail).red().dimmed()
        );
    }

    println!();
    println!(
        "{} {}",
        "Backups created:".green().bold(),
        report.created.len().to_string().yellow().bold()
    );

    Ok(())
}

fn cleanup(matches: &clap::ArgMatches, config: &Config, replicator: &BackupReplicator) -> Result<()> {
    let days = matches
        .get_one::<u64>("days")
        .copied()
        .or(config.backup.retention_days)
        .context("No retention given: pass --days or set backup.retention_days")?;

    println!(
        "{}",
        format!("Removing backups older than {} days...", days).cyan()
    );

    let report = replicator.cleanup(days);
    for path in &report.removed {
        println!("  {} {}", "✓".green(), path.display());
    }
    for (path, detail) in &report.failed {
        println!(
            "  {} {} {}",
            "✗".red(),
            path.display(),
            format!("({})", detail).red().dimmed()
        );
    }

    println!();
    println!(
        "{} {}",
        "Removed".green().bold(),
        format!("{} old backup(s)", report.removed_count()).yellow().bold()
    );

    Ok(())
}
