//! Poll-driven scheduler loop
//!
//! One thread wakes every poll interval, finds due tasks and runs them to
//! completion, one at a time, in registration order. A task body that fails
//! or panics is logged and the loop carries on.

use super::task::{ScheduledTask, TaskAction, TaskOutcome, TaskRun, TaskState};
use super::trigger::Trigger;
use crate::error::{CaretakerError, Result};
use chrono::{Duration as ChronoDuration, Local, NaiveDateTime};
use log::{error, info, warn};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Default polling cadence
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Longest uninterrupted sleep while waiting for the next tick
const SLEEP_SLICE: Duration = Duration::from_millis(250);

type OutcomeHook = Box<dyn FnMut(&TaskRun)>;

pub struct Scheduler {
    tasks: Vec<ScheduledTask>,
    poll_interval: Duration,
    last_tick: Option<NaiveDateTime>,
    on_outcome: Option<OutcomeHook>,
}

impl Scheduler {
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            tasks: Vec::new(),
            poll_interval,
            last_tick: None,
            on_outcome: None,
        }
    }

    /// Append a task; names must be unique
    pub fn register<F>(&mut self, name: &str, trigger: Trigger, action: F) -> Result<&mut Self>
    where
        F: FnMut() -> TaskOutcome + 'static,
    {
        if self.task(name).is_some() {
            return Err(CaretakerError::schedule(format!(
                "Task '{}' is already registered",
                name
            )));
        }
        let action: TaskAction = Box::new(action);
        self.tasks.push(ScheduledTask::new(name, trigger, action));
        info!("Scheduled '{}' ({})", name, trigger);
        Ok(self)
    }

    /// Called with every finished run, successful or not
    pub fn on_outcome<F>(&mut self, hook: F) -> &mut Self
    where
        F: FnMut(&TaskRun) + 'static,
    {
        self.on_outcome = Some(Box::new(hook));
        self
    }

    pub fn tasks(&self) -> &[ScheduledTask] {
        &self.tasks
    }

    pub fn task(&self, name: &str) -> Option<&ScheduledTask> {
        self.tasks.iter().find(|t| t.name == name)
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn last_tick(&self) -> Option<NaiveDateTime> {
        self.last_tick
    }

    /// Compute first firing times for tasks that have none yet
    pub fn prime(&mut self, now: NaiveDateTime) {
        for task in &mut self.tasks {
            if task.next_run.is_none() {
                task.next_run = Some(task.trigger.next_after(now));
            }
        }
    }

    /// Run every task due at `now`, in registration order
    pub fn tick(&mut self, now: NaiveDateTime) -> Vec<TaskRun> {
        self.prime(now);

        let due: Vec<usize> = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_due(now))
            .map(|(i, _)| i)
            .collect();
        self.mark_due(&due);

        let runs = self.execute_indices(&due, now);
        self.last_tick = Some(now);
        runs
    }

    /// Tick with the local wall clock
    pub fn run_pending(&mut self) -> Vec<TaskRun> {
        self.tick(Local::now().naive_local())
    }

    /// Run every registered task once regardless of its trigger
    pub fn run_all(&mut self, now: NaiveDateTime) -> Vec<TaskRun> {
        let all: Vec<usize> = (0..self.tasks.len()).collect();
        self.mark_due(&all);
        self.execute_indices(&all, now)
    }

    /// Run a single task by name regardless of its trigger
    pub fn run_task(&mut self, name: &str, now: NaiveDateTime) -> Option<TaskRun> {
        let index = self.tasks.iter().position(|t| t.name == name)?;
        self.mark_due(&[index]);
        self.execute_indices(&[index], now).pop()
    }

    /// Poll until `shutdown` is set
    ///
    /// The flag is checked between sleep slices and between ticks, never in
    /// the middle of a task body. A tick that overruns the poll interval is
    /// followed immediately by the next tick; missed trigger times collapse
    /// into that one run.
    pub fn run_until(&mut self, shutdown: &AtomicBool) {
        info!(
            "Starting scheduler ({} tasks, polling every {}s)",
            self.tasks.len(),
            self.poll_interval.as_secs()
        );

        while !shutdown.load(Ordering::Relaxed) {
            let started = Instant::now();
            self.run_pending();
            let elapsed = started.elapsed();

            if elapsed >= self.poll_interval {
                warn!(
                    "Tick took {:.1}s, longer than the {}s poll interval",
                    elapsed.as_secs_f64(),
                    self.poll_interval.as_secs()
                );
                continue;
            }
            sleep_unless(self.poll_interval - elapsed, shutdown);
        }

        info!("Scheduler stopped");
    }

    fn mark_due(&mut self, indices: &[usize]) {
        for &i in indices {
            self.tasks[i].state = TaskState::Due;
        }
    }

    fn execute_indices(&mut self, indices: &[usize], now: NaiveDateTime) -> Vec<TaskRun> {
        let tick_started = Instant::now();
        let mut runs = Vec::with_capacity(indices.len());

        for &i in indices {
            let started_at = offset(now, tick_started.elapsed());
            let task = &mut self.tasks[i];
            let outcome = run_body(task);
            let finished_at = offset(now, tick_started.elapsed());

            task.next_run = Some(task.trigger.next_after(finished_at));
            match &outcome {
                TaskOutcome::Success(report) => {
                    info!("Task '{}' completed: {}", task.name, report.summary);
                    task.state = TaskState::Idle;
                    task.last_run_at = Some(finished_at);
                }
                TaskOutcome::Failure(detail) => {
                    error!("Task '{}' failed: {}", task.name, detail);
                    task.state = TaskState::Failed;
                }
            }
            task.last_outcome = Some(outcome.clone());

            let run = TaskRun {
                task: task.name.clone(),
                started_at,
                finished_at,
                outcome,
            };
            if let Some(hook) = self.on_outcome.as_mut() {
                hook(&run);
            }
            runs.push(run);
        }

        runs
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

fn run_body(task: &mut ScheduledTask) -> TaskOutcome {
    task.state = TaskState::Running;
    match panic::catch_unwind(AssertUnwindSafe(|| (task.action)())) {
        Ok(outcome) => outcome,
        Err(payload) => TaskOutcome::Failure(format!("panicked: {}", panic_message(&*payload))),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn offset(base: NaiveDateTime, elapsed: Duration) -> NaiveDateTime {
    ChronoDuration::from_std(elapsed)
        .ok()
        .and_then(|d| base.checked_add_signed(d))
        .unwrap_or(base)
}

fn sleep_unless(total: Duration, shutdown: &AtomicBool) {
    let deadline = Instant::now() + total;
    while !shutdown.load(Ordering::Relaxed) {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        thread::sleep(SLEEP_SLICE.min(deadline - now));
    }
}
