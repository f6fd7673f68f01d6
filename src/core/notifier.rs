//! E-mail notifications
//!
//! [`Notifier`] builds `multipart/mixed` messages and hands them to any
//! [`lettre::Transport`]. Sending never fails loudly: problems are logged and
//! reported as `false`.

use crate::core::config::SmtpSettings;
use crate::error::{CaretakerError, Result};
use chrono::{DateTime, Local};
use lettre::message::header::{ContentTransferEncoding, ContentType};
use lettre::message::{Attachment, Body, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use log::{error, info};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// One line of a summary report
#[derive(Debug, Clone)]
pub struct SummaryItem {
    pub label: String,
    pub success: bool,
    pub detail: Option<String>,
}

impl SummaryItem {
    pub fn ok(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            success: true,
            detail: None,
        }
    }

    pub fn failed(label: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            success: false,
            detail: Some(detail.into()),
        }
    }
}

/// Mail sender bound to a transport
pub struct Notifier<T = SmtpTransport> {
    transport: T,
    from: Mailbox,
}

impl Notifier<SmtpTransport> {
    /// SMTP relay with STARTTLS and credential login
    pub fn smtp(settings: &SmtpSettings) -> Result<Self> {
        let password = settings.resolved_password().ok_or_else(|| {
            CaretakerError::config("SMTP password missing (set smtp.password or CARETAKER_SMTP_PASSWORD)")
        })?;
        let from = parse_mailbox(settings.sender())?;

        let transport = SmtpTransport::starttls_relay(&settings.host)
            .map_err(|e| CaretakerError::mail(format!("Invalid SMTP host {}: {}", settings.host, e)))?
            .port(settings.port)
            .credentials(Credentials::new(settings.username.clone(), password))
            .timeout(Some(Duration::from_secs(settings.timeout_secs)))
            .build();

        Ok(Self { transport, from })
    }
}

impl<T> Notifier<T>
where
    T: Transport,
    T::Error: fmt::Display,
{
    pub fn new(transport: T, from: Mailbox) -> Self {
        Self { transport, from }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send a plain-text message with optional attachments
    ///
    /// Attachments that are not readable files are skipped.
    /// Returns `false` when the message cannot be built or delivered.
    pub fn send(&self, to: &str, subject: &str, body: &str, attachments: &[PathBuf]) -> bool {
        let message = match self.build_message(to, subject, body, attachments) {
            Ok(message) => message,
            Err(e) => {
                error!("Failed to send email: {}", e);
                return false;
            }
        };

        match self.transport.send(&message) {
            Ok(_) => {
                info!("Email sent successfully to {}", to);
                true
            }
            Err(e) => {
                error!("Failed to send email: {}", e);
                false
            }
        }
    }

    pub fn build_message(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        attachments: &[PathBuf],
    ) -> Result<Message> {
        let mut parts = MultiPart::mixed().singlepart(SinglePart::plain(body.to_string()));

        for path in attachments {
            if let Some(part) = attachment_part(path)? {
                parts = parts.singlepart(part);
            }
        }

        Message::builder()
            .from(self.from.clone())
            .to(parse_mailbox(to)?)
            .subject(subject)
            .multipart(parts)
            .map_err(|e| CaretakerError::mail(e.to_string()))
    }

    /// Fixed-layout report: title, timestamp, tally, one line per item
    pub fn send_summary(&self, to: &str, title: &str, items: &[SummaryItem]) -> bool {
        let now = Local::now();
        let subject = format!("{} - {}", title, now.format("%Y-%m-%d"));
        let body = format_summary(title, items, now);
        self.send(to, &subject, &body, &[])
    }

    pub fn send_backup_report(&self, to: &str, backup_paths: &[PathBuf]) -> bool {
        let items: Vec<SummaryItem> = backup_paths
            .iter()
            .map(|p| SummaryItem::ok(p.display().to_string()))
            .collect();
        self.send_summary(to, "Backup Report", &items)
    }
}

/// Render the summary body for [`Notifier::send_summary`]
pub fn format_summary(title: &str, items: &[SummaryItem], now: DateTime<Local>) -> String {
    let succeeded = items.iter().filter(|i| i.success).count();
    let failed = items.len() - succeeded;
    let status = if !items.is_empty() && failed == 0 {
        "Success"
    } else {
        "Failed"
    };

    let mut body = String::new();
    body.push_str(title);
    body.push('\n');
    body.push_str(&"=".repeat(title.chars().count()));
    body.push_str("\n\n");
    body.push_str(&format!("Date: {}\n\n", now.format("%Y-%m-%d %H:%M:%S")));
    body.push_str(&format!("Status: {}\n", status));
    body.push_str(&format!("Succeeded: {}\n", succeeded));
    body.push_str(&format!("Failed: {}\n\n", failed));

    if !items.is_empty() {
        body.push_str("Items:\n");
        for item in items {
            match (&item.detail, item.success) {
                (Some(detail), false) => {
                    body.push_str(&format!("• {} (FAILED: {})\n", item.label, detail))
                }
                (_, false) => body.push_str(&format!("• {} (FAILED)\n", item.label)),
                (Some(detail), true) => body.push_str(&format!("• {} ({})\n", item.label, detail)),
                (None, true) => body.push_str(&format!("• {}\n", item.label)),
            }
        }
        body.push('\n');
    }

    body.push_str("This is an automated message from caretaker.\n");
    body
}

fn attachment_part(path: &Path) -> Result<Option<SinglePart>> {
    if !path.is_file() {
        return Ok(None);
    }
    let Ok(content) = fs::read(path) else {
        return Ok(None);
    };

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "attachment".to_string());
    let content_type = ContentType::parse("application/octet-stream")
        .map_err(|e| CaretakerError::mail(e.to_string()))?;
    let body = Body::new_with_encoding(content, ContentTransferEncoding::Base64)
        .map_err(|_| CaretakerError::mail(format!("Cannot encode {}", filename)))?;

    Ok(Some(Attachment::new(filename).body(body, content_type)))
}

fn parse_mailbox(address: &str) -> Result<Mailbox> {
    address
        .parse::<Mailbox>()
        .map_err(|e| CaretakerError::mail(format!("Invalid address '{}': {}", address, e)))
}
