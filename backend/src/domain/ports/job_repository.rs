//! Port abstraction for job persistence.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    CompletionOutcome, JobCompletion, JobCompletionNotice, JobId, JobOwner, NewJob, SteamId,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by job repository adapters.
    pub enum JobPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "job repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "job repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Insert a job with status `Started`.
    async fn insert_started(
        &self,
        job: &NewJob,
        started_at: DateTime<Utc>,
    ) -> Result<JobId, JobPersistenceError>;

    /// Apply a completion report to the open job matching `(id, steam id)`.
    ///
    /// Only rows whose end time is unset are updated, so a repeated report
    /// yields [`CompletionOutcome::AlreadyFinished`].
    async fn complete(
        &self,
        completion: &JobCompletion,
        finished_at: DateTime<Utc>,
    ) -> Result<CompletionOutcome, JobPersistenceError>;

    /// Ownership columns of a job.
    async fn find_owner(&self, id: JobId) -> Result<Option<JobOwner>, JobPersistenceError>;

    /// Whether the job exists and was reported by `steam_id`.
    async fn exists_for_driver(
        &self,
        id: JobId,
        steam_id: &SteamId,
    ) -> Result<bool, JobPersistenceError>;

    /// Notice content for a finished job, joined with the driver's name.
    async fn completion_notice(
        &self,
        id: JobId,
    ) -> Result<Option<JobCompletionNotice>, JobPersistenceError>;

    /// Delete every job reported by `steam_id`, returning the count.
    async fn delete_for_driver(&self, steam_id: &SteamId) -> Result<usize, JobPersistenceError>;
}
