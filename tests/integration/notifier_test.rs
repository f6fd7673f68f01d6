// Notifier delivery through lettre's stub transport

use caretaker::core::{Notifier, SummaryItem};
use lettre::message::Mailbox;
use lettre::transport::stub::StubTransport;
use std::fs;
use tempfile::TempDir;

fn sender() -> Mailbox {
    "Caretaker <caretaker@example.com>".parse().unwrap()
}

#[test]
fn test_send_delivers_message_with_attachment() {
    let temp = TempDir::new().unwrap();
    let attachment = temp.path().join("report.csv");
    fs::write(&attachment, "timestamp,cpu_percent\n").unwrap();

    let notifier = Notifier::new(StubTransport::new_ok(), sender());
    let sent = notifier.send(
        "ops@example.com",
        "Nightly report",
        "See attached.",
        &[attachment],
    );

    assert!(sent);
    let messages = notifier.transport().messages();
    assert_eq!(messages.len(), 1);
    let (envelope, raw) = &messages[0];
    assert_eq!(envelope.to().len(), 1);
    assert!(raw.contains("Subject: Nightly report"));
    assert!(raw.contains("report.csv"));
    assert!(raw.contains("See attached."));
}

#[test]
fn test_missing_attachment_is_skipped() {
    let temp = TempDir::new().unwrap();
    let notifier = Notifier::new(StubTransport::new_ok(), sender());

    let sent = notifier.send(
        "ops@example.com",
        "No files",
        "Body",
        &[temp.path().join("does-not-exist.log")],
    );

    assert!(sent);
    let messages = notifier.transport().messages();
    assert_eq!(messages.len(), 1);
    assert!(!messages[0].1.contains("does-not-exist.log"));
}

#[test]
fn test_transport_error_returns_false() {
    let notifier = Notifier::new(StubTransport::new_error(), sender());

    assert!(!notifier.send("ops@example.com", "Subject", "Body", &[]));
}

#[test]
fn test_invalid_recipient_returns_false() {
    let notifier = Notifier::new(StubTransport::new_ok(), sender());

    assert!(!notifier.send("not an address", "Subject", "Body", &[]));
    assert!(notifier.transport().messages().is_empty());
}

#[test]
fn test_summary_subject_carries_date() {
    let notifier = Notifier::new(StubTransport::new_ok(), sender());
    let items = vec![
        SummaryItem::ok("/backups/docs_20260310_030000"),
        SummaryItem::failed("/home/me/Music", "permission denied"),
    ];

    assert!(notifier.send_summary("ops@example.com", "Backup Report", &items));

    let messages = notifier.transport().messages();
    let raw = &messages[0].1;
    let today = chrono::Local::now().format("%Y-%m-%d").to_string();
    assert!(raw.contains(&format!("Subject: Backup Report - {}", today)));
    assert!(raw.contains("Succeeded: 1"));
    assert!(raw.contains("permission denied"));
}
