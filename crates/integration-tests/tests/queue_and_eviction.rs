//! External queue intake and stale-task eviction

mod common;

use chrono::Duration;
use jetsite_core::application::{EvictionScheduler, QueuePoller, TaskIntake};
use jetsite_core::domain::{StatusUpdate, TaskPayload, TaskStatus};
use jetsite_core::port::id_provider::mocks::SequentialIdProvider;
use jetsite_core::port::queue_source::mocks::StaticQueueSource;
use jetsite_core::port::time_provider::mocks::ManualClock;
use jetsite_core::port::{QueueError, QueuedTask, TaskStore};
use jetsite_infra_memory::InMemoryTaskStore;
use std::sync::Arc;

fn queued(id: Option<&str>, name: &str) -> QueuedTask {
    QueuedTask {
        id: id.map(str::to_string),
        payload: TaskPayload::new("react", name),
    }
}

#[tokio::test]
async fn test_poll_stores_and_acknowledges() {
    let store = common::store();
    let source = Arc::new(StaticQueueSource::new(vec![
        queued(Some("r-1"), "one"),
        queued(None, "two"),
        queued(Some("r-3"), "three"),
    ]));
    let poller = QueuePoller::new(source.clone(), Arc::new(TaskIntake::new(store.clone())));

    assert_eq!(poller.poll().await, 3);

    let names: Vec<_> = store
        .list(Some(TaskStatus::Pending), None)
        .into_iter()
        .map(|t| t.payload.name)
        .collect();
    assert_eq!(names, vec!["one", "two", "three"]);
    assert_eq!(source.acked(), vec!["r-1", "r-3"]);
}

#[tokio::test]
async fn test_failed_ack_keeps_task() {
    let store = common::store();
    let source = Arc::new(
        StaticQueueSource::new(vec![queued(Some("r-1"), "one"), queued(Some("r-2"), "two")])
            .fail_ack("r-1"),
    );
    let poller = QueuePoller::new(source.clone(), Arc::new(TaskIntake::new(store.clone())));

    assert_eq!(poller.poll().await, 2);
    assert_eq!(store.counts().pending, 2);
    assert_eq!(source.acked(), vec!["r-2"]);
}

#[tokio::test]
async fn test_fetch_failure_is_swallowed() {
    let store = common::store();
    let source = Arc::new(StaticQueueSource::failing(QueueError::Status(503)));
    let poller = QueuePoller::new(source, Arc::new(TaskIntake::new(store.clone())));

    assert_eq!(poller.poll().await, 0);
    assert_eq!(store.counts().total, 0);
}

#[test]
fn test_sweep_evicts_only_old_terminal_tasks() {
    let clock = Arc::new(ManualClock::at_epoch_secs(1_700_000_000));
    let store: Arc<dyn TaskStore> = Arc::new(InMemoryTaskStore::new(
        Arc::new(SequentialIdProvider::new()),
        clock.clone(),
    ));

    let failed = store.add(TaskPayload::new("react", "failed"));
    store.set_status(&failed, StatusUpdate::Processing).unwrap();
    store
        .set_status(&failed, StatusUpdate::Failed("boom".to_string()))
        .unwrap();
    let waiting = store.add(TaskPayload::new("react", "waiting"));

    let scheduler = EvictionScheduler::new(store.clone());
    assert_eq!(scheduler.sweep(), 0);

    clock.advance(Duration::hours(24) + Duration::seconds(1));
    assert_eq!(scheduler.sweep(), 1);
    assert!(store.get(&failed).is_none());
    assert!(store.get(&waiting).is_some());
}
