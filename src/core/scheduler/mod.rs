//! Single-threaded task scheduler: triggers, task bodies and the poll loop.

pub mod runner;
pub mod task;
pub mod trigger;

pub use runner::{Scheduler, DEFAULT_POLL_INTERVAL};
pub use task::{ScheduledTask, TaskOutcome, TaskReport, TaskRun, TaskState};
pub use trigger::Trigger;
