// Scheduler behaviour driven with explicit clock values

use caretaker::core::scheduler::{TaskReport, TaskState};
use caretaker::core::{Scheduler, TaskOutcome, Trigger};
use chrono::{NaiveDate, NaiveDateTime};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

fn at(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, 10)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

#[test]
fn test_due_tasks_run_in_registration_order() {
    let order = Rc::new(RefCell::new(Vec::new()));
    let mut scheduler = Scheduler::new(Duration::from_secs(60));

    for name in ["first", "second", "third"] {
        let order = Rc::clone(&order);
        scheduler
            .register(name, Trigger::daily_at("02:00").unwrap(), move || {
                order.borrow_mut().push(name);
                TaskOutcome::success("ok")
            })
            .unwrap();
    }

    scheduler.prime(at(1, 0));
    assert!(scheduler.tick(at(1, 59)).is_empty());

    let runs = scheduler.tick(at(2, 0));
    assert_eq!(runs.len(), 3);
    assert_eq!(*order.borrow(), vec!["first", "second", "third"]);

    // Not due again until tomorrow
    assert!(scheduler.tick(at(2, 1)).is_empty());
    assert_eq!(
        scheduler.task("first").unwrap().next_run(),
        Some(at(2, 0) + chrono::Duration::days(1))
    );
}

#[test]
fn test_failure_and_panic_do_not_stop_other_tasks() {
    let ran = Rc::new(RefCell::new(0));
    let mut scheduler = Scheduler::default();
    let every = Trigger::every_minutes(5).unwrap();

    scheduler
        .register("fails", every, || TaskOutcome::failure("disk full"))
        .unwrap();
    scheduler
        .register("panics", every, || -> TaskOutcome { panic!("boom") })
        .unwrap();
    let counter = Rc::clone(&ran);
    scheduler
        .register("works", every, move || {
            *counter.borrow_mut() += 1;
            TaskOutcome::success("fine")
        })
        .unwrap();

    scheduler.prime(at(10, 0));
    let runs = scheduler.tick(at(10, 5));

    assert_eq!(runs.len(), 3);
    assert_eq!(*ran.borrow(), 1);
    assert!(!runs[0].outcome.is_success());
    match &runs[1].outcome {
        TaskOutcome::Failure(detail) => assert!(detail.contains("boom")),
        other => panic!("expected failure, got {:?}", other),
    }
    assert!(runs[2].outcome.is_success());

    let fails = scheduler.task("fails").unwrap();
    assert_eq!(fails.state(), TaskState::Failed);
    assert!(fails.last_run_at().is_none());
    assert!(fails.next_run().unwrap() > at(10, 5));

    let works = scheduler.task("works").unwrap();
    assert_eq!(works.state(), TaskState::Idle);
    assert!(works.last_run_at().is_some());
}

#[test]
fn test_missed_runs_coalesce_into_one() {
    let ran = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&ran);
    let mut scheduler = Scheduler::default();
    scheduler
        .register("monitor", Trigger::every_minutes(30).unwrap(), move || {
            *counter.borrow_mut() += 1;
            TaskOutcome::success("checked")
        })
        .unwrap();

    scheduler.prime(at(8, 0));
    // Three intervals pass without a tick
    let runs = scheduler.tick(at(9, 40));

    assert_eq!(runs.len(), 1);
    assert_eq!(*ran.borrow(), 1);
    assert!(scheduler.tick(at(9, 41)).is_empty());
}

#[test]
fn test_outcome_hook_sees_every_run() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let mut scheduler = Scheduler::default();
    scheduler
        .register("ok", Trigger::every_minutes(1).unwrap(), || {
            TaskOutcome::Success(TaskReport::new("done").with_artifacts(vec!["a".to_string()]))
        })
        .unwrap();
    scheduler
        .register("bad", Trigger::every_minutes(1).unwrap(), || {
            TaskOutcome::failure("nope")
        })
        .unwrap();
    scheduler.on_outcome(move |run| {
        sink.borrow_mut()
            .push((run.task.clone(), run.outcome.is_success()));
    });

    let runs = scheduler.run_all(at(12, 0));

    assert_eq!(runs.len(), 2);
    assert_eq!(
        *seen.borrow(),
        vec![("ok".to_string(), true), ("bad".to_string(), false)]
    );
    assert!(runs.iter().all(|r| r.finished_at >= r.started_at));
}

#[test]
fn test_run_task_by_name() {
    let mut scheduler = Scheduler::default();
    scheduler
        .register("backup", Trigger::weekly_at("sunday", "03:00").unwrap(), || {
            TaskOutcome::success("copied")
        })
        .unwrap();

    let run = scheduler.run_task("backup", at(12, 0)).unwrap();
    assert!(run.outcome.is_success());
    assert!(scheduler.run_task("missing", at(12, 0)).is_none());
}

#[test]
fn test_duplicate_names_are_rejected() {
    let mut scheduler = Scheduler::default();
    let trigger = Trigger::every_minutes(1).unwrap();
    scheduler
        .register("job", trigger, || TaskOutcome::success("a"))
        .unwrap();

    assert!(scheduler
        .register("job", trigger, || TaskOutcome::success("b"))
        .is_err());
    assert_eq!(scheduler.tasks().len(), 1);
}
