//! Settings page service: profile edits, pausing, stat resets and deletion.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{
    JobPersistenceError, JobRepository, ProfileCommand, UserPersistenceError, UserRepository,
};
use crate::domain::{AccountStatus, Error, ProfileUpdate, User};

/// Profile service implementing [`ProfileCommand`].
#[derive(Clone)]
pub struct ProfileService<U, J> {
    users: Arc<U>,
    jobs: Arc<J>,
}

impl<U, J> ProfileService<U, J> {
    /// Create a new service.
    pub fn new(users: Arc<U>, jobs: Arc<J>) -> Self {
        Self { users, jobs }
    }
}

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => Error::service_unavailable(message),
        UserPersistenceError::Query { message } | UserPersistenceError::Duplicate { message } => {
            Error::internal(message)
        }
    }
}

fn map_job_error(error: JobPersistenceError) -> Error {
    match error {
        JobPersistenceError::Connection { message } => Error::service_unavailable(message),
        JobPersistenceError::Query { message } => Error::internal(message),
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}

#[async_trait]
impl<U, J> ProfileCommand for ProfileService<U, J>
where
    U: UserRepository,
    J: JobRepository,
{
    async fn update_profile(&self, user: &User, update: ProfileUpdate) -> Result<(), Error> {
        let normalised = ProfileUpdate {
            display_name: blank_to_none(update.display_name)
                .or_else(|| Some(user.username.clone())),
            bio: blank_to_none(update.bio),
            wot_text: blank_to_none(update.wot_text),
            truckersmp_text: blank_to_none(update.truckersmp_text),
            auth_token: update.auth_token,
        };
        self.users
            .update_profile(user.id, &normalised)
            .await
            .map_err(map_user_error)?;
        info!(user_id = %user.id, "profile updated");
        Ok(())
    }

    async fn pause_account(&self, user: &User) -> Result<(), Error> {
        self.users
            .set_account_status(user.id, AccountStatus::Paused)
            .await
            .map_err(map_user_error)?;
        info!(user_id = %user.id, "account paused");
        Ok(())
    }

    async fn reset_stats(&self, user: &User) -> Result<usize, Error> {
        let Some(steam_id) = user.steam_id.as_ref() else {
            return Ok(0);
        };
        let deleted = self
            .jobs
            .delete_for_driver(steam_id)
            .await
            .map_err(map_job_error)?;
        info!(user_id = %user.id, deleted, "driver stats reset");
        Ok(deleted)
    }

    async fn delete_account(&self, user: &User) -> Result<(), Error> {
        self.users
            .delete_with_jobs(user.id)
            .await
            .map_err(map_user_error)?;
        info!(user_id = %user.id, "account deleted");
        Ok(())
    }
}
