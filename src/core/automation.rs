//! Scheduled housekeeping jobs built from [`Config`]
//!
//! Each enabled config section becomes one scheduler task:
//!
//! ```text
//! Scheduler (poll every 60s)
//!   ├── organize       daily 02:00      FileOrganizer + prune
//!   ├── backup         Sunday 03:00     BackupReplicator + retention → backup report mail
//!   ├── monitor        every 30 min     HealthChecker → StatusStore, alert on UP→DOWN
//!   └── system-report  optional         SystemReport → CSV
//! ```

use crate::core::backup::BackupReplicator;
use crate::core::config::Config;
use crate::core::health::{HealthChecker, Target};
use crate::core::notifier::{Notifier, SummaryItem};
use crate::core::organizer::FileOrganizer;
use crate::core::scheduler::{Scheduler, TaskOutcome, TaskReport, Trigger};
use crate::core::status_store::StatusStore;
use crate::core::system_report::SystemReport;
use crate::error::Result;
use lettre::{SmtpTransport, Transport};
use log::{info, warn};
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

pub const ORGANIZE_TASK: &str = "organize";
pub const BACKUP_TASK: &str = "backup";
pub const MONITOR_TASK: &str = "monitor";
pub const SYSTEM_REPORT_TASK: &str = "system-report";

/// Mail recipient plus the transport used to reach it
pub struct Mailer<T> {
    pub notifier: Rc<Notifier<T>>,
    pub to: String,
}

impl<T> Clone for Mailer<T> {
    fn clone(&self) -> Self {
        Self {
            notifier: Rc::clone(&self.notifier),
            to: self.to.clone(),
        }
    }
}

pub struct Automation {
    config: Config,
}

impl Automation {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// SMTP mailer when both `smtp` and `notify.to` are configured
    pub fn smtp_mailer(&self) -> Result<Option<Mailer<SmtpTransport>>> {
        match (&self.config.smtp, &self.config.notify.to) {
            (Some(smtp), Some(to)) => Ok(Some(Mailer {
                notifier: Rc::new(Notifier::smtp(smtp)?),
                to: to.clone(),
            })),
            _ => Ok(None),
        }
    }

    /// Scheduler with every enabled job, mailing through SMTP
    pub fn scheduler(&self) -> Result<Scheduler> {
        let mailer = self.smtp_mailer()?;
        self.scheduler_with(mailer)
    }

    /// Scheduler with every enabled job, mailing through `mailer`
    pub fn scheduler_with<T>(&self, mailer: Option<Mailer<T>>) -> Result<Scheduler>
    where
        T: Transport + 'static,
        T::Error: fmt::Display,
    {
        let config = &self.config;
        let schedule = &config.schedule;
        let mut scheduler = Scheduler::new(config.poll_interval());

        if config.organizer.enabled {
            let organizer = FileOrganizer::new(config.organizer.rules()?);
            scheduler.register(
                ORGANIZE_TASK,
                Trigger::daily_at(&schedule.organize_at)?,
                organize_job(
                    organizer,
                    config.organizer.source_dir.clone(),
                    config.organizer.organized_dir.clone(),
                ),
            )?;
        }

        if config.backup.enabled {
            let replicator = BackupReplicator::new(
                config.backup.sources.clone(),
                config.backup.backup_dir.clone(),
            );
            scheduler.register(
                BACKUP_TASK,
                Trigger::weekly_at(&schedule.backup_weekday, &schedule.backup_at)?,
                backup_job(
                    replicator,
                    config.backup.with_timestamp,
                    config.backup.retention_days,
                    mailer.clone(),
                ),
            )?;
        }

        if config.monitor.enabled {
            let checker = HealthChecker::new(
                StatusStore::new(config.monitor.status_file.clone()),
                Duration::from_secs(config.monitor.timeout_secs),
            )?;
            let alerts = if config.notify.alert_on_down {
                mailer.clone()
            } else {
                None
            };
            scheduler.register(
                MONITOR_TASK,
                Trigger::every_minutes(schedule.monitor_every_minutes)?,
                monitor_job(checker, config.monitor.targets.clone(), alerts),
            )?;
        }

        if let Some(minutes) = schedule.system_report_every_minutes {
            scheduler.register(
                SYSTEM_REPORT_TASK,
                Trigger::every_minutes(minutes)?,
                system_report_job(config.system_report.csv_path.clone()),
            )?;
        }

        if config.notify.on_failure {
            if let Some(mailer) = mailer {
                scheduler.on_outcome(move |run| {
                    if let TaskOutcome::Failure(detail) = &run.outcome {
                        mailer.notifier.send_summary(
                            &mailer.to,
                            &format!("Task failed: {}", run.task),
                            &[SummaryItem::failed(run.task.clone(), detail.clone())],
                        );
                    }
                });
            }
        }

        info!("Automation tasks scheduled successfully");
        Ok(scheduler)
    }
}

/// Organize the source directory, then prune empty folders in the output
pub fn organize_job(
    organizer: FileOrganizer,
    source: PathBuf,
    dest: PathBuf,
) -> impl FnMut() -> TaskOutcome {
    move || {
        info!("Starting file organization...");
        let report = organizer.organize(&source, &dest);
        if report.source_missing {
            return TaskOutcome::failure(format!(
                "Source directory {} does not exist",
                source.display()
            ));
        }
        let pruned = organizer.prune_empty_directories(&dest);

        let artifacts = report
            .records
            .iter()
            .filter(|r| r.is_moved())
            .map(|r| r.destination.display().to_string())
            .collect();
        TaskOutcome::Success(
            TaskReport::new(format!(
                "moved {} files, {} failed, pruned {} folders",
                report.moved_count(),
                report.failed_count(),
                pruned.len()
            ))
            .with_artifacts(artifacts),
        )
    }
}

/// Snapshot all sources, apply retention, mail the backup report
pub fn backup_job<T>(
    replicator: BackupReplicator,
    with_timestamp: bool,
    retention_days: Option<u64>,
    mailer: Option<Mailer<T>>,
) -> impl FnMut() -> TaskOutcome
where
    T: Transport,
    T::Error: fmt::Display,
{
    move || {
        info!("Starting backup task...");
        let report = replicator.snapshot(with_timestamp);
        let paths = report.created_paths();

        // A zero window would delete the snapshots just written
        let removed = match retention_days {
            Some(0) => {
                warn!("Retention of 0 days ignored; keeping all backups");
                0
            }
            Some(days) => replicator.cleanup(days).removed_count(),
            None => 0,
        };

        if !paths.is_empty() {
            if let Some(mailer) = &mailer {
                if !mailer.notifier.send_backup_report(&mailer.to, &paths) {
                    warn!("Backup report could not be delivered to {}", mailer.to);
                }
            }
        }

        if paths.is_empty() && !replicator.sources().is_empty() {
            return TaskOutcome::failure(format!(
                "no backups created ({} skipped, {} failed)",
                report.skipped.len(),
                report.failed.len()
            ));
        }

        TaskOutcome::Success(
            TaskReport::new(format!(
                "{} backups created, {} skipped, {} failed, {} old removed",
                paths.len(),
                report.skipped.len(),
                report.failed.len(),
                removed
            ))
            .with_artifacts(paths.iter().map(|p| p.display().to_string()).collect()),
        )
    }
}

/// Probe every target; alert on targets that just went down
pub fn monitor_job<T>(
    checker: HealthChecker,
    targets: Vec<Target>,
    alerts: Option<Mailer<T>>,
) -> impl FnMut() -> TaskOutcome
where
    T: Transport,
    T::Error: fmt::Display,
{
    move || {
        info!("Starting website monitoring...");
        let (snapshot, changes) = checker.probe_all_with_changes(&targets);
        let up = snapshot.values().filter(|r| r.is_up()).count();
        let down = snapshot.len() - up;

        let went_down: Vec<SummaryItem> = changes
            .iter()
            .filter(|c| c.went_down())
            .filter_map(|c| snapshot.get(&c.name))
            .map(|r| {
                SummaryItem::failed(
                    format!("{} ({})", r.name, r.url),
                    r.error.clone().unwrap_or_else(|| "unreachable".to_string()),
                )
            })
            .collect();

        if !went_down.is_empty() {
            if let Some(mailer) = &alerts {
                mailer
                    .notifier
                    .send_summary(&mailer.to, "Website Alert", &went_down);
            }
        }

        TaskOutcome::success(format!("{} up, {} down", up, down))
    }
}

pub fn system_report_job(csv_path: PathBuf) -> impl FnMut() -> TaskOutcome {
    move || {
        let report = SystemReport::collect();
        match report.append_csv(&csv_path) {
            Ok(()) => TaskOutcome::Success(
                TaskReport::new(format!(
                    "cpu {:.1}%, memory {:.1}%, disk {:.1}%",
                    report.cpu_percent, report.memory.percent, report.disk.percent
                ))
                .with_artifacts(vec![csv_path.display().to_string()]),
            ),
            Err(e) => TaskOutcome::failure(format!(
                "Cannot write {}: {}",
                csv_path.display(),
                e
            )),
        }
    }
}
