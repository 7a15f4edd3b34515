// Queue Poller - feeds the task store from the remote queue

use crate::application::intake::TaskIntake;
use crate::application::processor::ShutdownToken;
use crate::port::QueueSource;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

pub struct QueuePoller {
    source: Arc<dyn QueueSource>,
    intake: Arc<TaskIntake>,
}

impl QueuePoller {
    pub fn new(source: Arc<dyn QueueSource>, intake: Arc<TaskIntake>) -> Self {
        Self { source, intake }
    }

    /// Fetch once and store every returned task.
    ///
    /// Fetch failures are logged and yield zero. Acknowledgment is
    /// best-effort: a failed ack does not undo the insert.
    pub async fn poll(&self) -> usize {
        let batch = match self.source.fetch().await {
            Ok(batch) => batch,
            Err(e) => {
                warn!(error = %e, "Queue poll failed");
                return 0;
            }
        };

        if batch.is_empty() {
            debug!("Queue empty");
            return 0;
        }

        let received = batch.len();
        for queued in batch {
            let remote_id = queued.id.clone();
            self.intake.accept_queued(queued);

            if let Some(remote_id) = remote_id {
                if let Err(e) = self.source.acknowledge(&remote_id).await {
                    warn!(remote_id = %remote_id, error = %e, "Queue acknowledgment failed");
                }
            }
        }

        info!(received, "Tasks received from queue");
        received
    }

    /// Poll every `every` until shutdown
    pub async fn run(&self, mut shutdown: ShutdownToken, every: Duration) {
        info!(interval_secs = every.as_secs(), "Queue poller started");
        let mut tick = interval(every);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    self.poll().await;
                }
                _ = shutdown.wait() => {
                    info!("Queue poller shutting down");
                    break;
                }
            }
        }
    }
}
