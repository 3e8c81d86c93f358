//! One-shot WebSocket publisher announcing finished job ids.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::SinkExt;
use serde::Serialize;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::domain::ports::{JobCompletionNotifier, NotificationError};
use crate::domain::{JobCompletionNotice, JobId};

/// Budget for connect, send and close together.
pub const WEBSOCKET_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JobFinishedFrame {
    job_id: JobId,
}

fn frame_text(job_id: JobId) -> Result<String, NotificationError> {
    serde_json::to_string(&JobFinishedFrame { job_id })
        .map_err(|err| NotificationError::encoding(err.to_string()))
}

/// Notifier that connects, sends one text frame and closes.
pub struct WebSocketNotifier {
    url: String,
    timeout: Duration,
}

impl WebSocketNotifier {
    /// Publisher for `ws://` or `wss://` `url` with the default timeout.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: WEBSOCKET_TIMEOUT,
        }
    }

    /// Override the overall timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn publish(&self, text: String) -> Result<(), NotificationError> {
        let (mut socket, _response) = connect_async(self.url.as_str())
            .await
            .map_err(|err| NotificationError::transport(err.to_string()))?;
        socket
            .send(Message::text(text))
            .await
            .map_err(|err| NotificationError::transport(err.to_string()))?;
        socket
            .close(None)
            .await
            .map_err(|err| NotificationError::transport(err.to_string()))
    }
}

#[async_trait]
impl JobCompletionNotifier for WebSocketNotifier {
    async fn notify(&self, notice: &JobCompletionNotice) -> Result<(), NotificationError> {
        let text = frame_text(notice.job_id)?;
        tokio::time::timeout(self.timeout, self.publish(text))
            .await
            .map_err(|_| {
                NotificationError::transport(format!(
                    "websocket publish timed out after {} ms",
                    self.timeout.as_millis()
                ))
            })?
    }
}
