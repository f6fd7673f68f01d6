use crate::core::scheduler::{TaskOutcome, TaskRun};
use crate::core::{Automation, Config};
use crate::ui::format_naive;
use anyhow::{anyhow, Context, Result};
use chrono::Local;
use colored::Colorize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub fn execute(matches: &clap::ArgMatches, config: &Config) -> Result<()> {
    let automation = Automation::new(config.clone()).context("Invalid configuration")?;
    let mut scheduler = automation
        .scheduler()
        .context("Failed to set up scheduled tasks")?;

    if scheduler.tasks().is_empty() {
        println!("{}", "No tasks enabled.".yellow());
        println!(
            "{}",
            "Enable organizer, backup or monitor in the config file.".dimmed()
        );
        return Ok(());
    }

    if matches.get_flag("once") {
        println!("{}", "Running all tasks once...".cyan().bold());
        println!();
        let runs = scheduler.run_all(Local::now().naive_local());
        print_runs(&runs);
        return Ok(());
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();

    ctrlc::set_handler(move || {
        println!();
        println!("{}", "Shutdown requested...".yellow().bold());
        println!(
            "{}",
            "Stopping after the current task finishes.".dimmed()
        );
        shutdown_clone.store(true, Ordering::Relaxed);
    })
    .map_err(|e| anyhow!("Failed to set Ctrl+C handler: {}", e))?;

    scheduler.prime(Local::now().naive_local());
    println!("{}", "Scheduled tasks:".white().bold());
    for task in scheduler.tasks() {
        println!(
            "  {:<14} {:<24} {}",
            task.name().cyan(),
            task.trigger().to_string(),
            task.next_run()
                .map(|t| format!("next {}", format_naive(t)))
                .unwrap_or_default()
                .dimmed()
        );
    }
    println!();
    println!("{}", "Press Ctrl+C to stop".dimmed());

    scheduler.run_until(&shutdown);
    Ok(())
}

/// List configured jobs and their next firing time
pub fn list(config: &Config) -> Result<()> {
    let automation = Automation::new(config.clone()).context("Invalid configuration")?;
    let mut scheduler = automation
        .scheduler_with::<lettre::transport::stub::StubTransport>(None)
        .context("Failed to set up scheduled tasks")?;
    scheduler.prime(Local::now().naive_local());

    if scheduler.tasks().is_empty() {
        println!("{}", "No tasks enabled.".yellow());
        return Ok(());
    }

    println!(
        "{}",
        format!("{:<14} {:<24} {}", "TASK", "TRIGGER", "NEXT RUN").white().bold()
    );
    for task in scheduler.tasks() {
        let next = task.next_run().map(format_naive).unwrap_or_default();
        println!("{:<14} {:<24} {}", task.name(), task.trigger().to_string(), next);
    }
    println!();
    println!(
        "{}",
        format!(
            "Polling every {}s",
            scheduler.poll_interval().as_secs()
        )
        .dimmed()
    );
    Ok(())
}

fn print_runs(runs: &[TaskRun]) {
    for run in runs {
        match &run.outcome {
            TaskOutcome::Success(report) => {
                println!("  {} {:<14} {}", "✓".green(), run.task, report.summary);
                for artifact in &report.artifacts {
                    println!("      {}", artifact.dimmed());
                }
            }
            TaskOutcome::Failure(detail) => {
                println!("  {} {:<14} {}", "✗".red(), run.task, detail.red());
            }
        }
    }
}
