//! Notifier that forwards each notice to every configured channel.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::join_all;
use tracing::{debug, warn};

use crate::domain::JobCompletionNotice;
use crate::domain::ports::{JobCompletionNotifier, NotificationError};

/// A named channel inside the fan-out.
#[derive(Clone)]
pub struct NotifierChannel {
    name: &'static str,
    notifier: Arc<dyn JobCompletionNotifier>,
}

impl NotifierChannel {
    /// Wrap a notifier under `name` for logging.
    pub fn new(name: &'static str, notifier: Arc<dyn JobCompletionNotifier>) -> Self {
        Self { name, notifier }
    }
}

/// Calls every channel concurrently and logs failures.
///
/// Notifications are best effort: `notify` always succeeds.
#[derive(Clone, Default)]
pub struct FanOutNotifier {
    channels: Vec<NotifierChannel>,
}

impl FanOutNotifier {
    /// Fan-out over `channels`.
    pub fn new(channels: Vec<NotifierChannel>) -> Self {
        Self { channels }
    }

    /// Number of configured channels.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Whether no channel is configured.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

#[async_trait]
impl JobCompletionNotifier for FanOutNotifier {
    async fn notify(&self, notice: &JobCompletionNotice) -> Result<(), NotificationError> {
        let sends = self.channels.iter().map(|channel| async move {
            (channel.name, channel.notifier.notify(notice).await)
        });
        for (channel, result) in join_all(sends).await {
            match result {
                Ok(()) => debug!(channel, job_id = %notice.job_id, "job notice sent"),
                Err(error) => warn!(
                    channel,
                    job_id = %notice.job_id,
                    error = %error,
                    "job notice failed"
                ),
            }
        }
        Ok(())
    }
}
