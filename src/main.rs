use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;

use caretaker::commands;

fn build_cli() -> Command {
    Command::new("caretaker")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Scheduled housekeeping: file organizing, backups and website monitoring")
        .disable_version_flag(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Config file (defaults to $CARETAKER_CONFIG or the user config dir)")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable debug logging")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only log warnings and errors")
                .action(ArgAction::SetTrue)
                .conflicts_with("verbose")
                .global(true),
        )
        .subcommand(
            Command::new("organize")
                .about("Move files from the source folder into category folders")
                .arg(
                    Arg::new("source")
                        .long("source")
                        .value_name("DIR")
                        .help("Folder to organize (overrides organizer.source_dir)")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("dest")
                        .long("dest")
                        .value_name("DIR")
                        .help("Destination root (overrides organizer.organized_dir)")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("no-prune")
                        .long("no-prune")
                        .help("Keep empty folders left in the destination")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("backup")
                .about("Copy configured sources into the backup folder")
                .arg(
                    Arg::new("no-timestamp")
                        .long("no-timestamp")
                        .help("Write to <backup_dir>/<name> instead of a timestamped folder")
                        .action(ArgAction::SetTrue),
                )
                .subcommand(
                    Command::new("cleanup")
                        .about("Delete backups older than the retention window")
                        .arg(
                            Arg::new("days")
                                .long("days")
                                .value_name("N")
                                .help("Retention window in days (overrides backup.retention_days)")
                                .value_parser(clap::value_parser!(u64)),
                        ),
                ),
        )
        .subcommand(Command::new("monitor").about("Probe every monitor target once and save the status"))
        .subcommand(Command::new("status").about("Show the last saved monitor status"))
        .subcommand(
            Command::new("notify")
                .about("Email notifications (use 'caretaker notify --help' for subcommands)")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(
                    Command::new("test")
                        .about("Send a test message through the configured SMTP server")
                        .arg(
                            Arg::new("to")
                                .long("to")
                                .value_name("ADDRESS")
                                .help("Recipient (defaults to notify.to)"),
                        )
                        .arg(
                            Arg::new("attach")
                                .long("attach")
                                .value_name("FILE")
                                .help("File to attach; may be repeated")
                                .value_parser(clap::value_parser!(PathBuf))
                                .action(ArgAction::Append),
                        ),
                ),
        )
        .subcommand(
            Command::new("rename")
                .about("Rename files in a folder by replacing a literal substring")
                .arg(
                    Arg::new("dir")
                        .help("Folder containing the files")
                        .required(true)
                        .index(1)
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("pattern")
                        .help("Text to replace; '*' wildcards are ignored")
                        .required(true)
                        .index(2),
                )
                .arg(
                    Arg::new("replacement")
                        .help("Replacement text")
                        .required(true)
                        .index(3),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Sample CPU, memory and disk usage and append it to a CSV file")
                .arg(
                    Arg::new("csv")
                        .long("csv")
                        .value_name("FILE")
                        .help("CSV file (overrides system_report.csv_path)")
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("run")
                .about("Run the scheduler until interrupted")
                .arg(
                    Arg::new("once")
                        .long("once")
                        .help("Run every enabled task once and exit")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("schedule").about("List scheduled tasks and their next run"))
        .subcommand(
            Command::new("config")
                .about("Manage the config file (use 'caretaker config --help' for subcommands)")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(
                    Command::new("init")
                        .about("Write a default config file")
                        .arg(
                            Arg::new("force")
                                .short('f')
                                .long("force")
                                .help("Overwrite without asking")
                                .action(ArgAction::SetTrue),
                        ),
                )
                .subcommand(Command::new("show").about("Print the effective config"))
                .subcommand(Command::new("path").about("Print the config file location")),
        )
        .subcommand(Command::new("version").about("Shows version information"))
}

fn log_level(matches: &clap::ArgMatches) -> log::LevelFilter {
    if matches.get_flag("verbose") {
        log::LevelFilter::Debug
    } else if matches.get_flag("quiet") {
        log::LevelFilter::Warn
    } else {
        log::LevelFilter::Info
    }
}

fn main() -> Result<()> {
    let matches = build_cli().get_matches();
    let level = log_level(&matches);
    let config_arg = matches.get_one::<PathBuf>("config").map(PathBuf::as_path);

    match matches.subcommand() {
        Some(("version", _)) => {
            commands::version()?;
            return Ok(());
        }
        Some(("config", sub_matches)) => {
            caretaker::init_logging(level, None);
            return commands::config::execute(sub_matches, config_arg);
        }
        Some(("rename", sub_matches)) => {
            caretaker::init_logging(level, None);
            return commands::rename::execute(sub_matches);
        }
        None => {
            println!("Welcome to caretaker!");
            println!("Use 'caretaker --help' for more information.");
            return Ok(());
        }
        _ => {}
    }

    let config = commands::load_config(config_arg)?;
    caretaker::init_logging(level, config.logging.file.as_deref());

    match matches.subcommand() {
        Some(("organize", sub_matches)) => commands::organize::execute(sub_matches, &config)?,
        Some(("backup", sub_matches)) => commands::backup::execute(sub_matches, &config)?,
        Some(("monitor", sub_matches)) => commands::monitor::execute(sub_matches, &config)?,
        Some(("status", _)) => commands::monitor::status(&config)?,
        Some(("notify", sub_matches)) => commands::notify::execute(sub_matches, &config)?,
        Some(("report", sub_matches)) => commands::report::execute(sub_matches, &config)?,
        Some(("run", sub_matches)) => commands::run::execute(sub_matches, &config)?,
        Some(("schedule", _)) => commands::run::list(&config)?,
        _ => {
            println!("Use 'caretaker --help' for more information.");
        }
    }

    Ok(())
}
