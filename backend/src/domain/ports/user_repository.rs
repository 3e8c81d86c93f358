//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{
    AccountStatus, ApiToken, Email, NewLocalUser, NewSteamUser, ProfileUpdate, SteamId, User,
    UserId,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// A unique column (email, Steam id) already holds the value.
        Duplicate { message: String } => "user already exists: {message}",
    }
}

/// A user together with their stored password hash.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredCredentials {
    /// Account.
    pub user: User,
    /// Encoded password hash, absent for Steam-only accounts.
    pub password_hash: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch the user linked to a Steam account.
    async fn find_by_steam_id(
        &self,
        steam_id: &SteamId,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a local account and its password hash by email.
    async fn find_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError>;

    /// Fetch the user owning `token` for `steam_id`.
    async fn find_by_api_token(
        &self,
        steam_id: &SteamId,
        token: &ApiToken,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Number of registered users.
    async fn count(&self) -> Result<i64, UserPersistenceError>;

    /// Insert a user created by a Steam login.
    async fn create_steam_user(&self, user: &NewSteamUser) -> Result<User, UserPersistenceError>;

    /// Insert a user created by the registration form.
    async fn create_local_user(&self, user: &NewLocalUser) -> Result<User, UserPersistenceError>;

    /// Replace the stored avatar.
    async fn refresh_avatar(
        &self,
        id: UserId,
        avatar_url: &str,
    ) -> Result<(), UserPersistenceError>;

    /// Apply profile edits.
    async fn update_profile(
        &self,
        id: UserId,
        update: &ProfileUpdate,
    ) -> Result<(), UserPersistenceError>;

    /// Change the lifecycle state.
    async fn set_account_status(
        &self,
        id: UserId,
        status: AccountStatus,
    ) -> Result<(), UserPersistenceError>;

    /// Delete the user and every job reported under their Steam id.
    async fn delete_with_jobs(&self, id: UserId) -> Result<(), UserPersistenceError>;
}
