// Scheduled jobs assembled from config, mailing through the stub transport

use caretaker::core::automation::{backup_job, Mailer, BACKUP_TASK, MONITOR_TASK, ORGANIZE_TASK};
use caretaker::core::health::Target;
use caretaker::core::{Automation, BackupReplicator, Config, Notifier};
use chrono::{NaiveDate, NaiveDateTime};
use lettre::transport::stub::StubTransport;
use std::fs;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::rc::Rc;
use std::thread;
use tempfile::TempDir;

/// Answer `count` requests on `listener` with 200 OK, then close it
fn answer(listener: TcpListener, count: usize) {
    thread::spawn(move || {
        for stream in listener.incoming().take(count) {
            let Ok(mut stream) = stream else {
                continue;
            };
            let mut buf = [0u8; 4096];
            let mut request = Vec::new();
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            let _ = stream
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        }
    });
}

fn monitor_config(temp: &TempDir, url: &str, alert_on_down: bool) -> Config {
    let mut config = Config::default();
    config.monitor.enabled = true;
    config.monitor.targets = vec![Target::new("api", url)];
    config.monitor.timeout_secs = 1;
    config.monitor.status_file = temp.path().join("status.json");
    config.notify.alert_on_down = alert_on_down;
    config
}

fn alert_count(notifier: &Notifier<StubTransport>) -> usize {
    notifier
        .transport()
        .messages()
        .iter()
        .filter(|(_, raw)| raw.contains("Website Alert"))
        .count()
}

fn noon() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, 10)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

fn stub_mailer() -> Mailer<StubTransport> {
    Mailer {
        notifier: Rc::new(Notifier::new(
            StubTransport::new_ok(),
            "caretaker@example.com".parse().unwrap(),
        )),
        to: "ops@example.com".to_string(),
    }
}

fn config_in(temp: &TempDir) -> Config {
    let mut config = Config::default();
    config.organizer.enabled = true;
    config.organizer.source_dir = temp.path().join("downloads");
    config.organizer.organized_dir = temp.path().join("organized");
    config.backup.enabled = true;
    config.backup.sources = vec![temp.path().join("documents")];
    config.backup.backup_dir = temp.path().join("backups");
    config.backup.retention_days = None;
    config.notify.on_failure = true;
    config
}

#[test]
fn test_run_all_organizes_backs_up_and_reports() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("downloads")).unwrap();
    fs::write(temp.path().join("downloads").join("photo.png"), b"png").unwrap();
    fs::create_dir_all(temp.path().join("documents")).unwrap();
    fs::write(temp.path().join("documents").join("cv.pdf"), b"pdf").unwrap();

    let mailer = stub_mailer();
    let notifier = Rc::clone(&mailer.notifier);
    let automation = Automation::new(config_in(&temp)).unwrap();
    let mut scheduler = automation.scheduler_with(Some(mailer)).unwrap();

    let names: Vec<&str> = scheduler.tasks().iter().map(|t| t.name()).collect();
    assert_eq!(names, vec![ORGANIZE_TASK, BACKUP_TASK]);

    let runs = scheduler.run_all(noon());

    assert!(runs.iter().all(|r| r.outcome.is_success()));
    assert!(temp.path().join("organized").join("Images").join("photo.png").is_file());
    assert_eq!(fs::read_dir(temp.path().join("backups")).unwrap().count(), 1);

    let messages = notifier.transport().messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].1.contains("Backup Report"));
}

#[test]
fn test_failed_job_triggers_failure_mail() {
    let temp = TempDir::new().unwrap();
    let mut config = config_in(&temp);
    config.backup.enabled = false;

    let mailer = stub_mailer();
    let notifier = Rc::clone(&mailer.notifier);
    let automation = Automation::new(config).unwrap();
    let mut scheduler = automation.scheduler_with(Some(mailer)).unwrap();

    // Source folder was never created
    let run = scheduler.run_task(ORGANIZE_TASK, noon()).unwrap();

    assert!(!run.outcome.is_success());
    let messages = notifier.transport().messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].1.contains("Task failed: organize"));
}

#[test]
fn test_invalid_config_is_rejected() {
    let mut config = Config::default();
    config.schedule.backup_weekday = "someday".to_string();

    assert!(Automation::new(config).is_err());
}

#[test]
fn test_target_going_down_sends_one_alert() {
    let temp = TempDir::new().unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/", listener.local_addr().unwrap());
    answer(listener, 1);

    let mailer = stub_mailer();
    let notifier = Rc::clone(&mailer.notifier);
    let automation = Automation::new(monitor_config(&temp, &url, true)).unwrap();
    let mut scheduler = automation.scheduler_with(Some(mailer)).unwrap();

    let first = scheduler.run_task(MONITOR_TASK, noon()).unwrap();
    assert!(first.outcome.is_success());
    assert_eq!(alert_count(&notifier), 0);

    // The listener is gone after one answer
    scheduler.run_task(MONITOR_TASK, noon()).unwrap();
    assert_eq!(alert_count(&notifier), 1);
    assert!(notifier.transport().messages()[0].1.contains("api"));

    // Still down: no repeat alert
    scheduler.run_task(MONITOR_TASK, noon()).unwrap();
    assert_eq!(alert_count(&notifier), 1);
}

#[test]
fn test_no_alert_when_disabled() {
    let temp = TempDir::new().unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/", listener.local_addr().unwrap());
    answer(listener, 1);

    let mailer = stub_mailer();
    let notifier = Rc::clone(&mailer.notifier);
    let automation = Automation::new(monitor_config(&temp, &url, false)).unwrap();
    let mut scheduler = automation.scheduler_with(Some(mailer)).unwrap();

    scheduler.run_task(MONITOR_TASK, noon()).unwrap();
    scheduler.run_task(MONITOR_TASK, noon()).unwrap();

    assert!(notifier.transport().messages().is_empty());
}

#[test]
fn test_recovery_sends_no_alert() {
    let temp = TempDir::new().unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/", listener.local_addr().unwrap());

    let mailer = stub_mailer();
    let notifier = Rc::clone(&mailer.notifier);
    let automation = Automation::new(monitor_config(&temp, &url, true)).unwrap();
    let mut scheduler = automation.scheduler_with(Some(mailer)).unwrap();

    // Nobody accepts yet, so the first probe times out
    scheduler.run_task(MONITOR_TASK, noon()).unwrap();
    let stored = fs::read_to_string(temp.path().join("status.json")).unwrap();
    assert!(stored.contains("DOWN"));

    // The stale connection from the first probe is answered first
    answer(listener, 2);
    scheduler.run_task(MONITOR_TASK, noon()).unwrap();
    let stored = fs::read_to_string(temp.path().join("status.json")).unwrap();
    assert!(stored.contains("UP"));

    assert!(notifier.transport().messages().is_empty());
}

#[test]
fn test_zero_retention_keeps_new_snapshot() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("docs");
    let backups = temp.path().join("backups");
    fs::create_dir_all(&source).unwrap();
    fs::write(source.join("cv.pdf"), b"pdf").unwrap();

    let mailer = stub_mailer();
    let notifier = Rc::clone(&mailer.notifier);
    let mut job = backup_job(
        BackupReplicator::new(vec![source], backups.clone()),
        true,
        Some(0),
        Some(mailer),
    );

    let outcome = job();

    assert!(outcome.is_success());
    assert_eq!(fs::read_dir(&backups).unwrap().count(), 1);
    assert_eq!(notifier.transport().messages().len(), 1);
}
