//! Job ingestion service.
//!
//! Implements [`JobIngestionCommand`]: persists the job lifecycle, authorises
//! toll and fine writes against the reporting user's API token, and fans out
//! completion notices after a job closes.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{
    JobCompletionNotifier, JobEventPersistenceError, JobEventRepository, JobIngestionCommand,
    JobPersistenceError, JobRepository, UserPersistenceError, UserRepository,
};
use crate::domain::{
    AccountStatus, ApiToken, CompletionOutcome, Error, FineReport, JobCompletion, JobId, NewJob,
    SteamId, TollReport, TransportReport, UserId,
};

/// Job ingestion service implementing the driving port.
#[derive(Clone)]
pub struct JobIngestionService<U, J, E> {
    users: Arc<U>,
    jobs: Arc<J>,
    events: Arc<E>,
    notifier: Arc<dyn JobCompletionNotifier>,
    clock: Arc<dyn Clock>,
}

impl<U, J, E> JobIngestionService<U, J, E> {
    /// Create a new service.
    pub fn new(
        users: Arc<U>,
        jobs: Arc<J>,
        events: Arc<E>,
        notifier: Arc<dyn JobCompletionNotifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            jobs,
            events,
            notifier,
            clock,
        }
    }
}

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } | UserPersistenceError::Duplicate { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
    }
}

fn map_job_error(error: JobPersistenceError) -> Error {
    match error {
        JobPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("job repository unavailable: {message}"))
        }
        JobPersistenceError::Query { message } => {
            Error::internal(format!("job repository error: {message}"))
        }
    }
}

fn map_event_error(error: JobEventPersistenceError) -> Error {
    match error {
        JobEventPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("job event repository unavailable: {message}"))
        }
        JobEventPersistenceError::Query { message } => {
            Error::internal(format!("job event repository error: {message}"))
        }
    }
}

impl<U, J, E> JobIngestionService<U, J, E>
where
    U: UserRepository,
    J: JobRepository,
    E: JobEventRepository,
{
    /// Resolve the token holder and check they own the job.
    async fn authorise_event(
        &self,
        token: &ApiToken,
        steam_id: &SteamId,
        job_id: JobId,
    ) -> Result<UserId, Error> {
        let user = self
            .users
            .find_by_api_token(steam_id, token)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized("Invalid auth token or steamId"))?;

        if user.account_status != AccountStatus::Active {
            return Err(Error::forbidden("User account not active"));
        }

        let owner = self
            .jobs
            .find_owner(job_id)
            .await
            .map_err(map_job_error)?
            .ok_or_else(|| Error::invalid_request("Job not found"))?;

        if !owner.is_owned_by(user.id, steam_id) {
            warn!(
                job_id = %job_id,
                user_id = %user.id,
                "job event rejected: job belongs to another driver"
            );
            return Err(Error::forbidden("Job does not belong to authenticated user"));
        }
        Ok(user.id)
    }

    async fn announce_completion(&self, job_id: JobId) {
        let notice = match self.jobs.completion_notice(job_id).await {
            Ok(Some(notice)) => notice,
            Ok(None) => {
                warn!(job_id = %job_id, "completed job vanished before notification");
                return;
            }
            Err(error) => {
                warn!(job_id = %job_id, %error, "failed to load job completion notice");
                return;
            }
        };
        if let Err(error) = self.notifier.notify(&notice).await {
            warn!(job_id = %job_id, %error, "job completion notification failed");
        }
    }
}

#[async_trait]
impl<U, J, E> JobIngestionCommand for JobIngestionService<U, J, E>
where
    U: UserRepository,
    J: JobRepository,
    E: JobEventRepository,
{
    async fn start_job(&self, job: NewJob) -> Result<JobId, Error> {
        let job_id = self
            .jobs
            .insert_started(&job, self.clock.utc())
            .await
            .map_err(map_job_error)?;
        info!(job_id = %job_id, steam_id = %job.driver_steam_id, "job started");
        Ok(job_id)
    }

    async fn finish_job(&self, completion: JobCompletion) -> Result<CompletionOutcome, Error> {
        let outcome = self
            .jobs
            .complete(&completion, self.clock.utc())
            .await
            .map_err(map_job_error)?;

        match outcome {
            CompletionOutcome::Completed => {
                info!(job_id = %completion.job_id, status = %completion.status, "job finished");
                self.announce_completion(completion.job_id).await;
                Ok(CompletionOutcome::Completed)
            }
            CompletionOutcome::AlreadyFinished => {
                info!(job_id = %completion.job_id, "duplicate job completion ignored");
                Ok(CompletionOutcome::AlreadyFinished)
            }
            CompletionOutcome::NotFound => {
                Err(Error::not_found("Job not found or user does not match."))
            }
        }
    }

    async fn record_toll(&self, token: ApiToken, toll: TollReport) -> Result<i64, Error> {
        let user_id = self
            .authorise_event(&token, &toll.steam_id, toll.job_id)
            .await?;
        let toll_id = self
            .events
            .insert_toll(&toll, user_id, self.clock.utc())
            .await
            .map_err(map_event_error)?;
        info!(job_id = %toll.job_id, toll_id, "toll recorded");
        Ok(toll_id)
    }

    async fn record_fine(&self, token: ApiToken, fine: FineReport) -> Result<i64, Error> {
        let user_id = self
            .authorise_event(&token, &fine.steam_id, fine.job_id)
            .await?;
        let penalty_id = self
            .events
            .insert_penalty(&fine, user_id, self.clock.utc())
            .await
            .map_err(map_event_error)?;
        info!(job_id = %fine.job_id, penalty_id, "fine recorded");
        Ok(penalty_id)
    }

    async fn record_transport(&self, transport: TransportReport) -> Result<i64, Error> {
        let owned = self
            .jobs
            .exists_for_driver(transport.job_id, &transport.steam_id)
            .await
            .map_err(map_job_error)?;
        if !owned {
            return Err(Error::not_found("Job not found or access denied."));
        }
        let transport_id = self
            .events
            .insert_transport(&transport, self.clock.utc())
            .await
            .map_err(map_event_error)?;
        info!(
            job_id = %transport.job_id,
            transport_id,
            transport_type = %transport.transport_type,
            "transport recorded"
        );
        Ok(transport_id)
    }
}

#[cfg(test)]
#[path = "job_ingestion_service_tests.rs"]
mod tests;
