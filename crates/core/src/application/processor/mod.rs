// Task Processor - drain loop with the global single-flight guard

pub mod constants;
mod shutdown;
mod single_flight;

pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};
pub use single_flight::{SingleFlight, SingleFlightGuard};

use crate::application::orchestrator::TaskOrchestrator;
use crate::domain::{StatusUpdate, Task, TaskResult};
use crate::error::{Result, TaskError};
use crate::port::TaskStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, warn};

const PANIC_MESSAGE: &str = "Task execution panicked";

/// Takes one pending task per tick and drives it to a terminal status
pub struct TaskProcessor {
    store: Arc<dyn TaskStore>,
    orchestrator: Arc<TaskOrchestrator>,
    flight: SingleFlight,
}

impl TaskProcessor {
    pub fn new(store: Arc<dyn TaskStore>, orchestrator: Arc<TaskOrchestrator>) -> Self {
        Self {
            store,
            orchestrator,
            flight: SingleFlight::new(),
        }
    }

    /// Whether a task is currently being driven
    pub fn is_processing(&self) -> bool {
        self.flight.is_busy()
    }

    /// Run the drain loop until shutdown is requested
    pub async fn run(&self, mut shutdown: ShutdownToken, every: Duration) {
        info!(interval_secs = every.as_secs(), "Task processor started");
        let mut tick = interval(every);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    if let Err(e) = self.process_next_task().await {
                        error!(error = %e, "Task processor error");
                    }
                }
                _ = shutdown.wait() => {
                    info!("Task processor shutting down");
                    break;
                }
            }
        }
    }

    /// Drive the oldest pending task, if any.
    ///
    /// Returns `Ok(false)` when another drive holds the slot or nothing is
    /// pending. The slot is released on every exit path.
    pub async fn process_next_task(&self) -> Result<bool> {
        let Some(_guard) = self.flight.try_acquire() else {
            return Ok(false);
        };

        let Some(task) = self.store.next_pending() else {
            return Ok(false);
        };

        if !self.store.set_status(&task.id, StatusUpdate::Processing)? {
            warn!(task_id = %task.id, "Task vanished before processing");
            return Ok(false);
        }
        info!(task_id = %task.id, name = %task.payload.name, "Processing task");

        let update = match self.execute_isolated(task.clone()).await {
            Ok(result) => {
                info!(task_id = %task.id, exit_code = ?result.exit_code, "Task completed");
                StatusUpdate::Completed(result)
            }
            Err(e) => {
                error!(task_id = %task.id, kind = e.kind(), error = %e, "Task failed");
                StatusUpdate::Failed(e.to_string())
            }
        };

        self.store.set_status(&task.id, update)?;
        Ok(true)
    }

    /// Run the orchestration on its own tokio task so a panic fails only `task`
    async fn execute_isolated(&self, task: Task) -> std::result::Result<TaskResult, FailureReason> {
        let orchestrator = Arc::clone(&self.orchestrator);
        let handle = tokio::spawn(async move { orchestrator.execute(&task).await });

        match handle.await {
            Ok(outcome) => outcome.map_err(FailureReason::Task),
            Err(join_err) => {
                if join_err.is_panic() {
                    error!(error = ?join_err, "Task execution panicked");
                } else {
                    error!(error = ?join_err, "Task execution cancelled");
                }
                Err(FailureReason::Panicked)
            }
        }
    }
}

/// Why a drive ended in `failed`
enum FailureReason {
    Task(TaskError),
    Panicked,
}

impl FailureReason {
    fn kind(&self) -> &'static str {
        match self {
            FailureReason::Task(e) => e.kind(),
            FailureReason::Panicked => "panic",
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::Task(e) => write!(f, "{}", e),
            FailureReason::Panicked => f.write_str(PANIC_MESSAGE),
        }
    }
}
