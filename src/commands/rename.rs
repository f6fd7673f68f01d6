use crate::core::renamer::bulk_rename;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

pub fn execute(matches: &clap::ArgMatches) -> Result<()> {
    let dir = matches
        .get_one::<PathBuf>("dir")
        .context("Directory argument is required")?;
    let pattern = matches
        .get_one::<String>("pattern")
        .context("Pattern argument is required")?;
    let replacement = matches
        .get_one::<String>("replacement")
        .context("Replacement argument is required")?;

    let report = bulk_rename(dir, pattern, replacement)?;

    for (from, to) in &report.renamed {
        println!(
            "  {} {} {} {}",
            "✓".green(),
            from.file_name().unwrap_or_default().to_string_lossy(),
            "→".dimmed(),
            to.file_name().unwrap_or_default().to_string_lossy().cyan()
        );
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
        "Renamed".green().bold(),
        format!("{} file(s)", report.renamed_count()).yellow().bold()
    );
    Ok(())
}
