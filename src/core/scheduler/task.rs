//! Scheduled task definitions

use super::trigger::Trigger;
use chrono::NaiveDateTime;
use std::fmt;

/// What a task body produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskReport {
    pub summary: String,
    /// Paths or identifiers produced by the run (backups, moved files, ...)
    pub artifacts: Vec<String>,
}

impl TaskReport {
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            artifacts: Vec::new(),
        }
    }

    pub fn with_artifacts(mut self, artifacts: Vec<String>) -> Self {
        self.artifacts = artifacts;
        self
    }
}

/// Result of one task execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Success(TaskReport),
    Failure(String),
}

impl TaskOutcome {
    pub fn success(summary: impl Into<String>) -> Self {
        TaskOutcome::Success(TaskReport::new(summary))
    }

    pub fn failure(detail: impl Into<String>) -> Self {
        TaskOutcome::Failure(detail.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Success(_))
    }
}

impl<E: fmt::Display> From<Result<TaskReport, E>> for TaskOutcome {
    fn from(result: Result<TaskReport, E>) -> Self {
        match result {
            Ok(report) => TaskOutcome::Success(report),
            Err(e) => TaskOutcome::Failure(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Idle,
    Due,
    Running,
    /// Last run failed; the task becomes due again at its next trigger time
    Failed,
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TaskState::Idle => "idle",
            TaskState::Due => "due",
            TaskState::Running => "running",
            TaskState::Failed => "failed",
        };
        f.write_str(label)
    }
}

pub type TaskAction = Box<dyn FnMut() -> TaskOutcome>;

/// A named trigger bound to an action
pub struct ScheduledTask {
    pub(crate) name: String,
    pub(crate) trigger: Trigger,
    pub(crate) action: TaskAction,
    pub(crate) state: TaskState,
    pub(crate) next_run: Option<NaiveDateTime>,
    pub(crate) last_run_at: Option<NaiveDateTime>,
    pub(crate) last_outcome: Option<TaskOutcome>,
}

impl ScheduledTask {
    pub fn new(name: impl Into<String>, trigger: Trigger, action: TaskAction) -> Self {
        Self {
            name: name.into(),
            trigger,
            action,
            state: TaskState::Idle,
            next_run: None,
            last_run_at: None,
            last_outcome: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn trigger(&self) -> Trigger {
        self.trigger
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    pub fn next_run(&self) -> Option<NaiveDateTime> {
        self.next_run
    }

    /// Completion time of the last successful run
    pub fn last_run_at(&self) -> Option<NaiveDateTime> {
        self.last_run_at
    }

    pub fn last_outcome(&self) -> Option<&TaskOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        self.next_run.is_some_and(|next| next <= now)
    }
}

impl fmt::Debug for ScheduledTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledTask")
            .field("name", &self.name)
            .field("trigger", &self.trigger)
            .field("state", &self.state)
            .field("next_run", &self.next_run)
            .field("last_run_at", &self.last_run_at)
            .finish()
    }
}

/// Record of one executed task, handed to the outcome hook
#[derive(Debug, Clone)]
pub struct TaskRun {
    pub task: String,
    pub started_at: NaiveDateTime,
    pub finished_at: NaiveDateTime,
    pub outcome: TaskOutcome,
}
