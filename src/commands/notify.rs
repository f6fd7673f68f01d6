use crate::core::{Config, Notifier};
use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use std::path::PathBuf;

pub fn execute(matches: &clap::ArgMatches, config: &Config) -> Result<()> {
    match matches.subcommand() {
        Some(("test", sub_matches)) => send_test(sub_matches, config),
        _ => {
            println!("Use 'caretaker notify --help' for more information.");
            Ok(())
        }
    }
}

fn send_test(matches: &clap::ArgMatches, config: &Config) -> Result<()> {
    let smtp = config
        .smtp
        .as_ref()
        .ok_or_else(|| anyhow!("No smtp section in the config file"))?;
    let to = matches
        .get_one::<String>("to")
        .cloned()
        .or_else(|| config.notify.to.clone())
        .context("No recipient: pass --to or set notify.to")?;
    let attachments: Vec<PathBuf> = matches
        .get_many::<PathBuf>("attach")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    for path in &attachments {
        if !path.is_file() {
            println!(
                "{}",
                format!("⚠️  Attachment {} not found, it will be skipped", path.display()).yellow()
            );
        }
    }

    let notifier = Notifier::smtp(smtp).context("Failed to configure SMTP transport")?;

    println!(
        "{} {} {}",
        "Sending test message via".cyan(),
        format!("{}:{}", smtp.host, smtp.port).white(),
        format!("to {}", to).cyan()
    );

    let body = format!(
        "This is a test message from caretaker {}.\n\nIf you can read this, notifications are configured correctly.\n",
        env!("CARGO_PKG_VERSION")
    );
    if notifier.send(&to, "caretaker test message", &body, &attachments) {
        println!("{}", "✓ Message sent".green());
        Ok(())
    } else {
        Err(anyhow!("Message could not be sent (see log for details)"))
    }
}
