//! User identity, profile and account primitives.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Avatar shown when Steam returns none.
pub const DEFAULT_AVATAR_URL: &str = "/assets/default-avatar.svg";
/// Maximum accepted length for an API bearer token.
pub const API_TOKEN_MAX: usize = 255;

/// Validation errors for user primitives.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// Identifiers are positive database keys.
    #[error("user id must be positive")]
    NonPositiveId,
    /// Steam ids are 6 to 20 ASCII digits.
    #[error("steam id must be 6-20 digits")]
    InvalidSteamId,
    /// API tokens are non-empty and bounded.
    #[error("api token must be 1-{API_TOKEN_MAX} characters")]
    InvalidApiToken,
    /// Emails must look like `local@domain.tld`.
    #[error("email address is not valid")]
    InvalidEmail,
    /// Stored account status was not recognised.
    #[error("unknown account status: {0}")]
    UnknownAccountStatus(String),
}

/// Database identifier of a user row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Validate and wrap a raw identifier.
    pub fn new(raw: i64) -> Result<Self, UserValidationError> {
        if raw <= 0 {
            return Err(UserValidationError::NonPositiveId);
        }
        Ok(Self(raw))
    }

    /// Raw database key.
    #[must_use]
    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

static STEAM_ID_RE: OnceLock<Regex> = OnceLock::new();

fn steam_id_regex() -> &'static Regex {
    STEAM_ID_RE.get_or_init(|| {
        Regex::new("^[0-9]{6,20}$")
            .unwrap_or_else(|error| panic!("steam id regex failed to compile: {error}"))
    })
}

/// Steam account identifier as reported by the game client.
///
/// # Examples
/// ```
/// use mytrucktracker::domain::SteamId;
///
/// let id = SteamId::new("76561198000000000").unwrap();
/// assert_eq!(id.fallback_username(), "User_000000");
/// assert!(SteamId::new("12ab").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SteamId(String);

impl SteamId {
    /// Validate a raw Steam id.
    pub fn new(raw: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if !steam_id_regex().is_match(trimmed) {
            return Err(UserValidationError::InvalidSteamId);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Username given to Steam users whose profile cannot be fetched.
    #[must_use]
    pub fn fallback_username(&self) -> String {
        let digits = self.0.as_str();
        let tail = digits
            .char_indices()
            .rev()
            .nth(5)
            .map_or(digits, |(index, _)| digits.get(index..).unwrap_or(digits));
        format!("User_{tail}")
    }
}

impl TryFrom<String> for SteamId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SteamId> for String {
    fn from(value: SteamId) -> Self {
        value.0
    }
}

impl fmt::Display for SteamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Bearer credential issued to a user for the machine API.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(Zeroizing<String>);

impl ApiToken {
    /// Validate a raw token.
    pub fn new(raw: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.chars().count() > API_TOKEN_MAX {
            return Err(UserValidationError::InvalidApiToken);
        }
        Ok(Self(Zeroizing::new(trimmed.to_owned())))
    }

    /// Borrow the secret.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken(<redacted>)")
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Normalised email address for local accounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    /// Validate and lowercase an address.
    pub fn new(raw: &str) -> Result<Self, UserValidationError> {
        let normalised = raw.trim().to_lowercase();
        if !email_regex().is_match(&normalised) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }

    /// Borrow the address.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Lifecycle state of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    /// Normal account.
    Active,
    /// Paused by the owner; API writes are refused.
    Paused,
}

impl AccountStatus {
    /// Storage representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
        }
    }
}

impl FromStr for AccountStatus {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "paused" => Ok(Self::Paused),
            other => Err(UserValidationError::UnknownAccountStatus(other.to_owned())),
        }
    }
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Primary key.
    pub id: UserId,
    /// Login or Steam persona name.
    pub username: String,
    /// Optional name shown instead of `username`.
    pub display_name: Option<String>,
    /// Linked Steam account.
    pub steam_id: Option<SteamId>,
    /// Local login address.
    #[serde(skip_serializing)]
    pub email: Option<String>,
    /// Profile picture URL.
    pub avatar_url: String,
    /// Free-text biography.
    pub bio: Option<String>,
    /// World of Trucks profile text.
    pub wot_text: Option<String>,
    /// TruckersMP profile text.
    pub truckersmp_text: Option<String>,
    /// Site administrator flag.
    pub is_admin: bool,
    /// Lifecycle state.
    pub account_status: AccountStatus,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Name rendered on pages: the display name when set, else the username.
    #[must_use]
    pub fn shown_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.username)
    }
}

/// Persona data pulled from the Steam Web API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SteamProfile {
    /// Steam persona name.
    pub username: String,
    /// Best available avatar URL.
    pub avatar_url: String,
}

impl SteamProfile {
    /// Profile used when the Steam Web API is unavailable.
    #[must_use]
    pub fn fallback(steam_id: &SteamId) -> Self {
        Self {
            username: steam_id.fallback_username(),
            avatar_url: DEFAULT_AVATAR_URL.to_owned(),
        }
    }
}

/// Values for a user created from a Steam login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSteamUser {
    /// Verified Steam id.
    pub steam_id: SteamId,
    /// Persona data.
    pub profile: SteamProfile,
    /// Whether the account bootstraps the site administrator.
    pub is_admin: bool,
}

/// Values for a user created from the email/password form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLocalUser {
    /// Login address.
    pub email: Email,
    /// Chosen username.
    pub username: String,
    /// Encoded password hash.
    pub password_hash: String,
    /// Whether the account bootstraps the site administrator.
    pub is_admin: bool,
}

/// Editable profile fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProfileUpdate {
    /// New display name; `None` falls back to the username.
    pub display_name: Option<String>,
    /// Biography.
    pub bio: Option<String>,
    /// World of Trucks text.
    pub wot_text: Option<String>,
    /// TruckersMP text.
    pub truckersmp_text: Option<String>,
    /// Replacement API token; `None` clears it.
    pub auth_token: Option<ApiToken>,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for user primitives.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("76561198000000000", true)]
    #[case("123456", true)]
    #[case("12345", false)]
    #[case("123456789012345678901", false)]
    #[case("7656119800000000a", false)]
    #[case("", false)]
    fn steam_id_shape(#[case] raw: &str, #[case] valid: bool) {
        assert_eq!(SteamId::new(raw).is_ok(), valid);
    }

    #[rstest]
    fn fallback_username_uses_last_six_digits() {
        let id = SteamId::new("76561198012345678").expect("valid id");
        assert_eq!(id.fallback_username(), "User_345678");
    }

    #[rstest]
    fn fallback_profile_uses_default_avatar() {
        let id = SteamId::new("76561198012345678").expect("valid id");
        let profile = SteamProfile::fallback(&id);
        assert_eq!(profile.avatar_url, DEFAULT_AVATAR_URL);
    }

    #[rstest]
    #[case("Driver@Example.com", Some("driver@example.com"))]
    #[case("no-at-sign", None)]
    #[case("two@@example.com", None)]
    fn email_normalisation(#[case] raw: &str, #[case] expected: Option<&str>) {
        let parsed = Email::new(raw).ok();
        assert_eq!(parsed.as_ref().map(Email::as_str), expected);
    }

    #[rstest]
    fn api_token_rejects_blank_and_oversized() {
        assert!(ApiToken::new("  ").is_err());
        assert!(ApiToken::new("x".repeat(API_TOKEN_MAX + 1)).is_err());
        assert_eq!(ApiToken::new(" abc ").expect("token").expose(), "abc");
    }

    #[rstest]
    fn api_token_debug_is_redacted() {
        let token = ApiToken::new("secret").expect("token");
        assert!(!format!("{token:?}").contains("secret"));
    }

    #[rstest]
    #[case("active", Some(AccountStatus::Active))]
    #[case("paused", Some(AccountStatus::Paused))]
    #[case("banned", None)]
    fn account_status_parses(#[case] raw: &str, #[case] expected: Option<AccountStatus>) {
        assert_eq!(raw.parse::<AccountStatus>().ok(), expected);
    }

    #[rstest]
    fn user_id_must_be_positive() {
        assert!(UserId::new(0).is_err());
        assert_eq!(UserId::new(7).expect("id").as_i64(), 7);
    }
}
