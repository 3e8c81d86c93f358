//! Driving port for the game client's job reports.
//!
//! HTTP handlers decode and validate the client payloads, then call this port
//! to persist the job lifecycle and its ancillary events.

use async_trait::async_trait;

use crate::domain::{
    ApiToken, CompletionOutcome, Error, FineReport, JobCompletion, JobId, NewJob, TollReport,
    TransportReport,
};

/// Domain use-case port for job ingestion.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobIngestionCommand: Send + Sync {
    /// Open a job and return its id.
    async fn start_job(&self, job: NewJob) -> Result<JobId, Error>;

    /// Close a job.
    ///
    /// Returns [`CompletionOutcome::Completed`] or
    /// [`CompletionOutcome::AlreadyFinished`]; an unknown `(id, steam id)`
    /// pair is a not-found error.
    async fn finish_job(&self, completion: JobCompletion) -> Result<CompletionOutcome, Error>;

    /// Record a toll for a job the token holder owns. Returns the toll id.
    async fn record_toll(&self, token: ApiToken, toll: TollReport) -> Result<i64, Error>;

    /// Record a fine for a job the token holder owns. Returns the penalty id.
    async fn record_fine(&self, token: ApiToken, fine: FineReport) -> Result<i64, Error>;

    /// Record a ferry or train crossing. Returns the transport id.
    async fn record_transport(&self, transport: TransportReport) -> Result<i64, Error>;
}

/// Fixture command accepting every report without persisting it.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureJobIngestionCommand;

#[async_trait]
impl JobIngestionCommand for FixtureJobIngestionCommand {
    async fn start_job(&self, _job: NewJob) -> Result<JobId, Error> {
        JobId::new(1).map_err(|err| Error::internal(format!("invalid fixture job id: {err}")))
    }

    async fn finish_job(&self, _completion: JobCompletion) -> Result<CompletionOutcome, Error> {
        Ok(CompletionOutcome::Completed)
    }

    async fn record_toll(&self, _token: ApiToken, _toll: TollReport) -> Result<i64, Error> {
        Ok(1)
    }

    async fn record_fine(&self, _token: ApiToken, _fine: FineReport) -> Result<i64, Error> {
        Ok(1)
    }

    async fn record_transport(&self, _transport: TransportReport) -> Result<i64, Error> {
        Ok(1)
    }
}
