//! Driving port for the settings page actions.

use async_trait::async_trait;

use crate::domain::{Error, ProfileUpdate, User};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileCommand: Send + Sync {
    /// Apply profile edits; a blank display name falls back to the username.
    async fn update_profile(&self, user: &User, update: ProfileUpdate) -> Result<(), Error>;

    /// Pause the account.
    async fn pause_account(&self, user: &User) -> Result<(), Error>;

    /// Delete every job the user reported. Returns the count.
    async fn reset_stats(&self, user: &User) -> Result<usize, Error>;

    /// Delete the user and their jobs.
    async fn delete_account(&self, user: &User) -> Result<(), Error>;
}
