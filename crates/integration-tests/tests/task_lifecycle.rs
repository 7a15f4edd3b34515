//! Task lifecycle through the processor
//!
//! Store + orchestrator + processor wired together with scripted adapters.

mod common;

use jetsite_core::application::TaskIntake;
use jetsite_core::domain::{TaskPayload, TaskStatus};
use jetsite_core::port::command_runner::mocks::{MockResponse, ScriptedCommandRunner};
use jetsite_core::port::credential_provider::mocks::StaticCredentials;
use jetsite_core::port::{QueuedTask, TaskStore};
use std::path::PathBuf;
use std::sync::Arc;

fn work_dir() -> PathBuf {
    PathBuf::from("/work")
}

#[tokio::test]
async fn test_pending_task_completes() {
    let store = common::store();
    let runner = Arc::new(ScriptedCommandRunner::with_responses([MockResponse::ok(
        "Repository created",
    )]));
    let processor = common::processor(
        store.clone(),
        runner.clone(),
        Arc::new(StaticCredentials::valid("gho_abc")),
        &work_dir(),
        PathBuf::from("fork.ps1"),
    );
    let id = store.add(TaskPayload::new("react", "demo"));

    assert!(processor.process_next_task().await.unwrap());

    let task = store.get(&id).unwrap();
    assert_eq!(task.status, TaskStatus::Completed);
    let result = task.result.unwrap();
    assert_eq!(result.exit_code, Some(0));
    assert_eq!(result.stdout, "Repository created");
    assert!(task.error.is_none());
    assert!(!processor.is_processing());
    assert_eq!(runner.call_count(), 1);
}

#[tokio::test]
async fn test_missing_token_fails_without_spawn() {
    let store = common::store();
    let runner = Arc::new(ScriptedCommandRunner::new());
    let processor = common::processor(
        store.clone(),
        runner.clone(),
        Arc::new(StaticCredentials::missing()),
        &work_dir(),
        PathBuf::from("fork.ps1"),
    );
    let id = store.add(TaskPayload::new("react", "demo"));

    assert!(processor.process_next_task().await.unwrap());

    let task = store.get(&id).unwrap();
    assert_eq!(task.status, TaskStatus::Failed);
    assert!(task.error.unwrap().contains("authentication"));
    assert!(task.result.is_none());
    assert_eq!(runner.call_count(), 0);
}

#[tokio::test]
async fn test_script_failure_records_stderr() {
    let store = common::store();
    let runner = Arc::new(ScriptedCommandRunner::with_responses([MockResponse::fail(
        1,
        "template not found",
    )]));
    let processor = common::processor(
        store.clone(),
        runner,
        Arc::new(StaticCredentials::valid("gho_abc")),
        &work_dir(),
        PathBuf::from("fork.ps1"),
    );
    let id = store.add(TaskPayload::new("missing", "demo"));

    processor.process_next_task().await.unwrap();

    let task = store.get(&id).unwrap();
    assert_eq!(task.status, TaskStatus::Failed);
    let error = task.error.unwrap();
    assert!(error.contains("template not found"));
    assert!(error.contains("code 1"));
}

#[tokio::test]
async fn test_tasks_drain_in_fifo_order_one_per_tick() {
    let store = common::store();
    let runner = Arc::new(ScriptedCommandRunner::new());
    let processor = common::processor(
        store.clone(),
        runner.clone(),
        Arc::new(StaticCredentials::valid("gho_abc")),
        &work_dir(),
        PathBuf::from("fork.ps1"),
    );
    let first = store.add(TaskPayload::new("react", "first"));
    let second = store.add(TaskPayload::new("react", "second"));

    processor.process_next_task().await.unwrap();
    assert_eq!(store.get(&first).unwrap().status, TaskStatus::Completed);
    assert_eq!(store.get(&second).unwrap().status, TaskStatus::Pending);

    processor.process_next_task().await.unwrap();
    assert_eq!(store.get(&second).unwrap().status, TaskStatus::Completed);

    assert!(!processor.process_next_task().await.unwrap());

    let names: Vec<_> = runner
        .calls()
        .iter()
        .map(|spec| {
            let at = spec.args.iter().position(|a| a == "-name").unwrap();
            spec.args[at + 1].clone()
        })
        .collect();
    assert_eq!(names, vec!["first", "second"]);
}

#[tokio::test]
async fn test_overlapping_tick_is_skipped() {
    let store = common::store();
    let runner = Arc::new(common::GatedRunner::default());
    let processor = common::processor(
        store.clone(),
        runner.clone(),
        Arc::new(StaticCredentials::valid("gho_abc")),
        &work_dir(),
        PathBuf::from("fork.ps1"),
    );
    let first = store.add(TaskPayload::new("react", "first"));
    let second = store.add(TaskPayload::new("react", "second"));

    let background = Arc::clone(&processor);
    let in_flight = tokio::spawn(async move { background.process_next_task().await });
    runner.started.notified().await;

    assert!(processor.is_processing());
    assert!(!processor.process_next_task().await.unwrap());
    assert_eq!(store.counts().processing, 1);
    assert_eq!(store.get(&second).unwrap().status, TaskStatus::Pending);

    runner.release.notify_one();
    assert!(in_flight.await.unwrap().unwrap());
    assert_eq!(store.get(&first).unwrap().status, TaskStatus::Completed);
    assert!(!processor.is_processing());
}

#[tokio::test]
async fn test_panic_fails_only_that_task() {
    let store = common::store();
    let processor = common::processor(
        store.clone(),
        Arc::new(common::PanickingRunner::default()),
        Arc::new(StaticCredentials::valid("gho_abc")),
        &work_dir(),
        PathBuf::from("fork.ps1"),
    );
    let doomed = store.add(TaskPayload::new("react", "doomed"));
    let fine = store.add(TaskPayload::new("react", "fine"));

    assert!(processor.process_next_task().await.unwrap());
    let task = store.get(&doomed).unwrap();
    assert_eq!(task.status, TaskStatus::Failed);
    assert_eq!(task.error.as_deref(), Some("Task execution panicked"));
    assert!(!processor.is_processing());

    assert!(processor.process_next_task().await.unwrap());
    assert_eq!(store.get(&fine).unwrap().status, TaskStatus::Completed);
}

#[tokio::test]
async fn test_unvalidated_queue_task_fails_when_driven() {
    let store = common::store();
    let runner = Arc::new(ScriptedCommandRunner::new());
    let processor = common::processor(
        store.clone(),
        runner.clone(),
        Arc::new(StaticCredentials::valid("gho_abc")),
        &work_dir(),
        PathBuf::from("fork.ps1"),
    );
    let intake = TaskIntake::new(store.clone());
    let id = intake.accept_queued(QueuedTask {
        id: Some("remote-1".to_string()),
        payload: TaskPayload::new("react", ""),
    });
    assert_eq!(store.get(&id).unwrap().status, TaskStatus::Pending);

    processor.process_next_task().await.unwrap();

    let task = store.get(&id).unwrap();
    assert_eq!(task.status, TaskStatus::Failed);
    assert!(task.error.unwrap().contains("template and name"));
    assert_eq!(runner.call_count(), 0);
}

#[tokio::test]
async fn test_processing_never_exceeds_one_under_concurrent_ticks() {
    let store = common::store();
    let runner = Arc::new(ScriptedCommandRunner::new());
    let processor = common::processor(
        store.clone(),
        runner,
        Arc::new(StaticCredentials::valid("gho_abc")),
        &work_dir(),
        PathBuf::from("fork.ps1"),
    );
    for i in 0..10 {
        store.add(TaskPayload::new("react", format!("demo-{}", i)));
    }

    let mut handles = Vec::new();
    for _ in 0..10 {
        let p = Arc::clone(&processor);
        let s = store.clone();
        handles.push(tokio::spawn(async move {
            let processed = p.process_next_task().await.unwrap();
            assert!(s.counts().processing <= 1);
            processed
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    while processor.process_next_task().await.unwrap() {}
    let counts = store.counts();
    assert_eq!(counts.completed, 10);
    assert_eq!(counts.processing, 0);
    assert_eq!(counts.pending, 0);
}
