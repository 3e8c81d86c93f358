//! Authentication primitives for browser and machine clients.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use zeroize::Zeroizing;

use super::user::{Email, UserValidationError};

/// Minimum length for local account passwords.
pub const PASSWORD_MIN: usize = 8;

/// How a request proves who it acts for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// Browser pages: signed session cookie plus CSRF token on writes.
    SessionCookie,
    /// Machine API: bearer token matched against the claimed Steam id.
    BearerToken,
}

/// Domain error returned when login or registration values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialsValidationError {
    /// Email was not a valid address.
    #[error("Please enter a valid email address.")]
    InvalidEmail,
    /// Password was blank.
    #[error("Password is required.")]
    EmptyPassword,
    /// Password shorter than [`PASSWORD_MIN`].
    #[error("Password must be at least {PASSWORD_MIN} characters.")]
    PasswordTooShort,
    /// Password confirmation differed.
    #[error("Passwords do not match.")]
    PasswordMismatch,
    /// Username was blank.
    #[error("Username is required.")]
    EmptyUsername,
}

impl From<UserValidationError> for CredentialsValidationError {
    fn from(_: UserValidationError) -> Self {
        Self::InvalidEmail
    }
}

/// Validated email/password login.
///
/// # Examples
/// ```
/// use mytrucktracker::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("Ada@example.com", "hunter22").unwrap();
/// assert_eq!(creds.email().as_str(), "ada@example.com");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: Email,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialsValidationError> {
        let email = Email::new(email)?;
        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Login address.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Password provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Validated local registration form.
#[derive(Clone, PartialEq, Eq)]
pub struct Registration {
    email: Email,
    username: String,
    password: Zeroizing<String>,
}

impl Registration {
    /// Validate the registration form in the order the form reports errors.
    pub fn try_from_parts(
        email: &str,
        username: &str,
        password: &str,
        password_confirm: &str,
    ) -> Result<Self, CredentialsValidationError> {
        let email = Email::new(email)?;
        let username = username.trim();
        if username.is_empty() {
            return Err(CredentialsValidationError::EmptyUsername);
        }
        if password.chars().count() < PASSWORD_MIN {
            return Err(CredentialsValidationError::PasswordTooShort);
        }
        if password != password_confirm {
            return Err(CredentialsValidationError::PasswordMismatch);
        }
        Ok(Self {
            email,
            username: username.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Login address.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Chosen username.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Plain-text password to be hashed.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("email", &self.email)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}
