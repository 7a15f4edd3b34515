// Scheduling constants (no magic values)
use std::time::Duration;

/// Default cadence of the task-drain tick (30s)
pub const DEFAULT_DRAIN_INTERVAL: Duration = Duration::from_secs(30);

/// Cadence of the stale-task eviction sweep (1h)
pub const EVICTION_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// How long terminal tasks are kept after their last update (24h)
pub const TASK_RETENTION_HOURS: i64 = 24;

/// Default cadence of the external queue poll (10s)
pub const DEFAULT_QUEUE_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// How long shutdown waits for the periodic loops to return
pub const TIMER_STOP_GRACE: Duration = Duration::from_secs(2);

/// Default page size for task listings
pub const DEFAULT_LIST_LIMIT: usize = 50;

/// Programs that must be installed for any task to run
pub const REQUIRED_TOOLS: [&str; 2] = ["gh", "git"];

/// Editor launched by the template script unless skipped
pub const EDITOR_PROGRAM: &str = "code";
