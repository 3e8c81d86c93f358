//! Driving port for sign-in, registration and session resolution.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, Registration, User, UserId};

use super::OpenIdAssertion;

/// Which Steam callback completed the login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SteamLoginMode {
    /// `auth_callback.php`: existing users get their avatar refreshed.
    Login,
    /// `register_callback.php`: existing users are simply signed in.
    Register,
}

impl SteamLoginMode {
    /// Page a failed attempt returns to.
    #[must_use]
    pub fn failure_path(self) -> &'static str {
        match self {
            Self::Login => "/login.php",
            Self::Register => "/register.php",
        }
    }
}

/// Domain use-case port for account access.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Verify a Steam assertion and return the signed-in user, creating the
    /// account when registration allows it.
    async fn steam_login(
        &self,
        assertion: OpenIdAssertion,
        mode: SteamLoginMode,
    ) -> Result<User, Error>;

    /// URL that starts a Steam login.
    fn steam_login_url(&self, return_to: &str, realm: &str) -> String;

    /// Create a local account.
    async fn register(&self, registration: Registration) -> Result<User, Error>;

    /// Check local credentials.
    async fn login(&self, credentials: LoginCredentials) -> Result<User, Error>;

    /// Resolve the session's user id.
    async fn current_user(&self, id: UserId) -> Result<Option<User>, Error>;
}
