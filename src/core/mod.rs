// Core business logic module

pub mod automation;
pub mod backup;
pub mod categories;
pub mod config;
pub mod health;
pub mod notifier;
pub mod organizer;
pub mod renamer;
pub mod scheduler;
pub mod status_store;
pub mod system_report;

// Re-export commonly used items
pub use automation::Automation;
pub use backup::{BackupReplicator, BackupReport, BackupSnapshot, CleanupReport};
pub use categories::{CategoryRules, OTHER_CATEGORY};
pub use config::Config;
pub use health::{HealthChecker, HealthRecord, HealthSnapshot, HealthStatus, Target};
pub use notifier::{Notifier, SummaryItem};
pub use organizer::{FileOrganizer, MoveOutcome, MoveRecord, OrganizeReport};
pub use scheduler::{Scheduler, TaskOutcome, Trigger};
pub use status_store::StatusStore;
