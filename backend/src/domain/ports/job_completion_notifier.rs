//! Port for announcing finished jobs to external channels.
use async_trait::async_trait;

use crate::domain::JobCompletionNotice;

use super::define_port_error;

define_port_error! {
    /// Failures raised by notification adapters.
    pub enum NotificationError {
        /// The channel could not be reached or timed out.
        Transport { message: String } => "notification transport failed: {message}",
        /// The channel answered with a failure status.
        Rejected { status: u16 } => "notification rejected with status {status}",
        /// The message could not be encoded.
        Encoding { message: String } => "notification encoding failed: {message}",
    }
}

/// Best-effort announcement of a completed job.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobCompletionNotifier: Send + Sync {
    /// Publish the notice.
    async fn notify(&self, notice: &JobCompletionNotice) -> Result<(), NotificationError>;
}

/// Notifier used when no channel is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpJobCompletionNotifier;

#[async_trait]
impl JobCompletionNotifier for NoOpJobCompletionNotifier {
    async fn notify(&self, _notice: &JobCompletionNotice) -> Result<(), NotificationError> {
        Ok(())
    }
}
