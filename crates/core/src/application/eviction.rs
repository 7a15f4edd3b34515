// Eviction Scheduler
// Periodically drops terminal tasks past the retention window

use crate::application::processor::constants::{EVICTION_INTERVAL, TASK_RETENTION_HOURS};
use crate::application::processor::ShutdownToken;
use crate::port::TaskStore;
use chrono::Duration as RetentionWindow;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant};
use tracing::info;

pub struct EvictionScheduler {
    store: Arc<dyn TaskStore>,
    retention: RetentionWindow,
    every: Duration,
}

impl EvictionScheduler {
    /// Hourly sweep with the 24h retention window
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self {
            store,
            retention: RetentionWindow::hours(TASK_RETENTION_HOURS),
            every: EVICTION_INTERVAL,
        }
    }

    pub fn with_interval(mut self, every: Duration) -> Self {
        self.every = every;
        self
    }

    /// One sweep; returns the number of evicted tasks
    pub fn sweep(&self) -> usize {
        let evicted = self.store.evict_stale(self.retention);
        if evicted > 0 {
            info!(evicted, "Evicted stale tasks");
        }
        evicted
    }

    /// Sweep every interval until shutdown (first sweep after one interval)
    pub async fn run(&self, mut shutdown: ShutdownToken) {
        info!(
            interval_secs = self.every.as_secs(),
            retention_hours = self.retention.num_hours(),
            "Eviction scheduler started"
        );
        let mut tick = interval_at(Instant::now() + self.every, self.every);

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    self.sweep();
                }
                _ = shutdown.wait() => {
                    info!("Eviction scheduler shutting down");
                    break;
                }
            }
        }
    }
}
