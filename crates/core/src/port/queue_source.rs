// Queue Source Port
// Remote endpoint that hands out externally queued repository requests

use crate::domain::TaskPayload;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One task description fetched from the remote queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedTask {
    /// Remote identity, acknowledged after the task is stored
    #[serde(default)]
    pub id: Option<String>,

    #[serde(flatten)]
    pub payload: TaskPayload,
}

/// Queue transport errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected HTTP status: {0}")]
    Status(u16),

    #[error("Malformed queue response: {0}")]
    Decode(String),

    #[error("Invalid queue URL: {0}")]
    InvalidUrl(String),
}

#[async_trait]
pub trait QueueSource: Send + Sync {
    /// Fetch the currently queued task descriptions
    async fn fetch(&self) -> Result<Vec<QueuedTask>, QueueError>;

    /// Tell the remote queue a task was received
    async fn acknowledge(&self, remote_id: &str) -> Result<(), QueueError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashSet;
    use std::sync::{Mutex, PoisonError};

    /// Queue returning a fixed batch (or a fixed error) on every fetch
    pub struct StaticQueueSource {
        batch: Result<Vec<QueuedTask>, QueueError>,
        failing_acks: HashSet<String>,
        acked: Mutex<Vec<String>>,
    }

    impl StaticQueueSource {
        pub fn new(batch: Vec<QueuedTask>) -> Self {
            Self {
                batch: Ok(batch),
                failing_acks: HashSet::new(),
                acked: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(err: QueueError) -> Self {
            Self {
                batch: Err(err),
                failing_acks: HashSet::new(),
                acked: Mutex::new(Vec::new()),
            }
        }

        /// Make the acknowledgment of `remote_id` fail
        pub fn fail_ack(mut self, remote_id: impl Into<String>) -> Self {
            self.failing_acks.insert(remote_id.into());
            self
        }

        pub fn acked(&self) -> Vec<String> {
            self.acked
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }
    }

    #[async_trait]
    impl QueueSource for StaticQueueSource {
        async fn fetch(&self) -> Result<Vec<QueuedTask>, QueueError> {
            self.batch.clone()
        }

        async fn acknowledge(&self, remote_id: &str) -> Result<(), QueueError> {
            if self.failing_acks.contains(remote_id) {
                return Err(QueueError::Transport("connection reset".to_string()));
            }
            self.acked
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(remote_id.to_string());
            Ok(())
        }
    }
}
