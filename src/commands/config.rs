use super::config_path;
use crate::core::Config;
use crate::ui;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

pub fn execute(matches: &clap::ArgMatches, explicit: Option<&Path>) -> Result<()> {
    match matches.subcommand() {
        Some(("init", sub_matches)) => init(sub_matches, explicit),
        Some(("show", _)) => show(explicit),
        Some(("path", _)) => path(explicit),
        _ => {
            println!("Use 'caretaker config --help' for more information.");
            Ok(())
        }
    }
}

/// Write a default config file
fn init(matches: &clap::ArgMatches, explicit: Option<&Path>) -> Result<()> {
    let path = config_path(explicit)?;

    if path.exists() && !matches.get_flag("force") {
        let prompt = format!("{} already exists. Overwrite it?", path.display());
        if !ui::confirm(&prompt)? {
            println!("{}", "Config left unchanged.".yellow());
            return Ok(());
        }
    }

    Config::default()
        .save_to(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    ui::success(&format!("✓ Default config written to {}", path.display()));
    println!(
        "{}",
        "Each job is disabled until you set its \"enabled\" flag to true.".dimmed()
    );
    Ok(())
}

/// Print the effective config, defaults filled in
fn show(explicit: Option<&Path>) -> Result<()> {
    let path = config_path(explicit)?;
    let config = Config::load_from(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;

    if !path.exists() {
        println!(
            "{}",
            format!("# {} not found, showing defaults", path.display()).dimmed()
        );
    }

    let mut shown = config.clone();
    if let Some(smtp) = shown.smtp.as_mut() {
        if smtp.password.is_some() {
            smtp.password = Some("********".to_string());
        }
    }
    println!("{}", serde_json::to_string_pretty(&shown)?);

    if let Err(e) = config.validate() {
        println!();
        ui::warn(&format!("config is invalid: {}", e));
    }
    Ok(())
}

fn path(explicit: Option<&Path>) -> Result<()> {
    let path = config_path(explicit)?;
    println!("{}", path.display());
    Ok(())
}
