use crate::core::{Config, FileOrganizer, MoveOutcome};
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

pub fn execute(matches: &clap::ArgMatches, config: &Config) -> Result<()> {
    let source = matches
        .get_one::<PathBuf>("source")
        .cloned()
        .unwrap_or_else(|| config.organizer.source_dir.clone());
    let dest = matches
        .get_one::<PathBuf>("dest")
        .cloned()
        .unwrap_or_else(|| config.organizer.organized_dir.clone());
    let prune = !matches.get_flag("no-prune");

    let rules = config
        .organizer
        .rules()
        .context("Invalid organizer categories")?;
    let organizer = FileOrganizer::new(rules);

    println!(
        "{} {} {} {}",
        "Organizing".cyan().bold(),
        source.display().to_string().white(),
        "into".cyan(),
        dest.display().to_string().white()
    );
    println!();

    let report = organizer.organize(&source, &dest);

    if report.source_missing {
        println!(
            "{}",
            format!("Source directory {} does not exist.", source.display()).yellow()
        );
        return Ok(());
    }

    if report.records.is_empty() {
        println!("{}", "Nothing to organize.".green());
        return Ok(());
    }

    for record in &report.records {
        let name = record
            .source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        match &record.outcome {
            MoveOutcome::Moved => println!(
                "  {} {} {} {}",
                "✓".green(),
                name,
                "→".dimmed(),
                record.category.cyan()
            ),
            MoveOutcome::Failed(detail) => println!(
                "  {} {} {}",
                "✗".red(),
                name,
                format!("({})", detail).red().dimmed()
            ),
        }
    }

    if prune {
        let removed = organizer.prune_empty_directories(&dest);
        if !removed.is_empty() {
            println!();
            println!(
                "{} {}",
                "Removed empty folders:".dimmed(),
                removed.len().to_string().dimmed()
            );
        }
    }

    println!();
    println!(
        "{} {} {}",
        "Organized".green().bold(),
        report.moved_count().to_string().yellow().bold(),
        "files".green().bold()
    );
    if report.failed_count() > 0 {
        println!(
            "{}",
            format!("{} files could not be moved", report.failed_count()).red()
        );
    }

    Ok(())
}
