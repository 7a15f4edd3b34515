// Remote queue client
// GET <url> -> {"tasks": [...]}, POST <url>/ack/<id> per received task

use crate::USER_AGENT;
use async_trait::async_trait;
use jetsite_core::port::{QueueError, QueueSource, QueuedTask};
use reqwest::header::{AUTHORIZATION, USER_AGENT as USER_AGENT_HEADER};
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

const API_KEY_HEADER: &str = "X-API-Key";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct QueueResponse {
    #[serde(default)]
    tasks: Vec<Value>,
}

/// Decode entries one at a time; a malformed entry is skipped, not the batch
fn decode_batch(entries: Vec<Value>) -> Vec<QueuedTask> {
    let total = entries.len();
    let tasks: Vec<QueuedTask> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value(entry) {
            Ok(task) => Some(task),
            Err(e) => {
                warn!(index, error = %e, "Skipping malformed queue entry");
                None
            }
        })
        .collect();
    debug!(received = total, accepted = tasks.len(), "Queue fetched");
    tasks
}

pub struct HttpQueueSource {
    client: reqwest::Client,
    url: String,
    api_key: String,
    bearer_token: Option<String>,
}

impl HttpQueueSource {
    /// `bearer_token` is sent as `Authorization: Bearer` on fetches when set
    pub fn new(
        url: impl Into<String>,
        api_key: impl Into<String>,
        bearer_token: Option<String>,
    ) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            url: url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            bearer_token: bearer_token.filter(|t| !t.is_empty()),
        })
    }

    /// `<url>/ack/<id>` with `id` escaped as a single path segment
    fn ack_url(&self, remote_id: &str) -> Result<Url, QueueError> {
        let invalid = |reason: String| QueueError::InvalidUrl(format!("{}: {}", self.url, reason));
        let mut url = Url::parse(&self.url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| invalid("cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["ack", remote_id]);
        Ok(url)
    }
}

fn transport(err: reqwest::Error) -> QueueError {
    QueueError::Transport(err.to_string())
}

#[async_trait]
impl QueueSource for HttpQueueSource {
    async fn fetch(&self) -> Result<Vec<QueuedTask>, QueueError> {
        let mut request = self
            .client
            .get(&self.url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(USER_AGENT_HEADER, USER_AGENT);
        if let Some(token) = &self.bearer_token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(QueueError::Status(status.as_u16()));
        }

        let body: QueueResponse = response
            .json()
            .await
            .map_err(|e| QueueError::Decode(e.to_string()))?;
        Ok(decode_batch(body.tasks))
    }

    async fn acknowledge(&self, remote_id: &str) -> Result<(), QueueError> {
        let response = self
            .client
            .post(self.ack_url(remote_id)?)
            .header(API_KEY_HEADER, &self.api_key)
            .header(USER_AGENT_HEADER, USER_AGENT)
            .body("{}")
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(QueueError::Status(status.as_u16()))
        }
    }
}
