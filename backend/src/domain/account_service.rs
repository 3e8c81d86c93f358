//! Account access service: Steam logins, local registration and sign-in.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::ports::{
    AccountCommand, OpenIdAssertion, PasswordHashError, PasswordHasher, SitePersistenceError,
    SiteRepository, SteamLoginMode, SteamOpenIdError, SteamOpenIdVerifier, SteamProfileSource,
    UserPersistenceError, UserRepository,
};
use crate::domain::{
    Error, LoginCredentials, NewLocalUser, NewSteamUser, Registration, SteamId, SteamProfile,
    User, UserId,
};

const INVALID_CREDENTIALS: &str = "Invalid email or password.";

/// Account service implementing [`AccountCommand`].
#[derive(Clone)]
pub struct AccountService<U, S> {
    users: Arc<U>,
    site: Arc<S>,
    verifier: Arc<dyn SteamOpenIdVerifier>,
    profiles: Arc<dyn SteamProfileSource>,
    hasher: Arc<dyn PasswordHasher>,
}

impl<U, S> AccountService<U, S> {
    /// Create a new service.
    pub fn new(
        users: Arc<U>,
        site: Arc<S>,
        verifier: Arc<dyn SteamOpenIdVerifier>,
        profiles: Arc<dyn SteamProfileSource>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            users,
            site,
            verifier,
            profiles,
            hasher,
        }
    }
}

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::Duplicate { .. } => Error::conflict("Account already exists."),
    }
}

fn map_site_error(error: SitePersistenceError) -> Error {
    match error {
        SitePersistenceError::Connection { message } => {
            Error::service_unavailable(format!("site repository unavailable: {message}"))
        }
        SitePersistenceError::Query { message } => {
            Error::internal(format!("site repository error: {message}"))
        }
    }
}

fn map_openid_error(error: SteamOpenIdError) -> Error {
    match error {
        SteamOpenIdError::Transport { message } => {
            warn!(%message, "steam verification unavailable");
            Error::service_unavailable("Steam authentication failed. Please try again.")
        }
        SteamOpenIdError::Rejected { message } => {
            info!(%message, "steam assertion rejected");
            Error::unauthorized("Steam authentication failed. Please try again.")
        }
    }
}

fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(error.to_string())
}

impl<U, S> AccountService<U, S>
where
    U: UserRepository,
    S: SiteRepository,
{
    /// Check that a new account may be created and report whether it is the
    /// first one.
    async fn admit_new_account(&self) -> Result<bool, Error> {
        let is_first = self.users.count().await.map_err(map_user_error)? == 0;
        if is_first {
            return Ok(true);
        }
        let open = self
            .site
            .registration_open()
            .await
            .map_err(map_site_error)?;
        if open {
            Ok(false)
        } else {
            Err(Error::forbidden("Registration is currently closed."))
        }
    }

    /// The first account bootstraps the administrator and closes sign-ups.
    async fn after_account_created(&self, user: &User, is_first: bool) -> Result<(), Error> {
        if is_first {
            self.site
                .set_registration_open(false)
                .await
                .map_err(map_site_error)?;
            info!(user_id = %user.id, "first user registered; registration closed");
        } else {
            info!(user_id = %user.id, "user registered");
        }
        Ok(())
    }

    async fn fetch_profile(&self, steam_id: &SteamId) -> Option<SteamProfile> {
        match self.profiles.fetch(steam_id).await {
            Ok(profile) => profile,
            Err(error) => {
                warn!(%steam_id, %error, "steam profile lookup failed");
                None
            }
        }
    }

    async fn refresh_avatar(&self, user: &mut User) {
        let Some(steam_id) = user.steam_id.clone() else {
            return;
        };
        let Some(profile) = self.fetch_profile(&steam_id).await else {
            return;
        };
        match self.users.refresh_avatar(user.id, &profile.avatar_url).await {
            Ok(()) => user.avatar_url = profile.avatar_url,
            Err(error) => warn!(user_id = %user.id, %error, "avatar refresh failed"),
        }
    }
}

#[async_trait]
impl<U, S> AccountCommand for AccountService<U, S>
where
    U: UserRepository,
    S: SiteRepository,
{
    async fn steam_login(
        &self,
        assertion: OpenIdAssertion,
        mode: SteamLoginMode,
    ) -> Result<User, Error> {
        let steam_id = self
            .verifier
            .verify(&assertion)
            .await
            .map_err(map_openid_error)?;

        if let Some(mut user) = self
            .users
            .find_by_steam_id(&steam_id)
            .await
            .map_err(map_user_error)?
        {
            if mode == SteamLoginMode::Login {
                self.refresh_avatar(&mut user).await;
            }
            return Ok(user);
        }

        let is_first = self.admit_new_account().await?;
        let profile = self
            .fetch_profile(&steam_id)
            .await
            .unwrap_or_else(|| SteamProfile::fallback(&steam_id));
        let user = self
            .users
            .create_steam_user(&NewSteamUser {
                steam_id,
                profile,
                is_admin: is_first,
            })
            .await
            .map_err(map_user_error)?;
        self.after_account_created(&user, is_first).await?;
        Ok(user)
    }

    fn steam_login_url(&self, return_to: &str, realm: &str) -> String {
        self.verifier.login_url(return_to, realm)
    }

    async fn register(&self, registration: Registration) -> Result<User, Error> {
        let existing = self
            .users
            .find_credentials(registration.email())
            .await
            .map_err(map_user_error)?;
        if existing.is_some() {
            return Err(Error::conflict("Email is already registered."));
        }

        let is_first = self.admit_new_account().await?;
        let password_hash = self
            .hasher
            .hash(registration.password())
            .map_err(map_hash_error)?;
        let user = self
            .users
            .create_local_user(&NewLocalUser {
                email: registration.email().clone(),
                username: registration.username().to_owned(),
                password_hash,
                is_admin: is_first,
            })
            .await
            .map_err(|error| match error {
                UserPersistenceError::Duplicate { .. } => {
                    Error::conflict("Email is already registered.")
                }
                other => map_user_error(other),
            })?;
        self.after_account_created(&user, is_first).await?;
        Ok(user)
    }

    async fn login(&self, credentials: LoginCredentials) -> Result<User, Error> {
        let stored = self
            .users
            .find_credentials(credentials.email())
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized(INVALID_CREDENTIALS))?;
        let Some(hash) = stored.password_hash.as_deref() else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        if !self
            .hasher
            .verify(credentials.password(), hash)
            .map_err(map_hash_error)?
        {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        Ok(stored.user)
    }

    async fn current_user(&self, id: UserId) -> Result<Option<User>, Error> {
        self.users.find_by_id(id).await.map_err(map_user_error)
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
