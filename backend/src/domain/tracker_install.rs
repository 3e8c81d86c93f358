//! Binding a tracker installation to a user through a pre-issued install token.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use zeroize::Zeroizing;

use super::user::UserId;

/// Longest accepted token or tracker id.
pub const INSTALL_FIELD_MAX: usize = 255;

/// Validation failures for install claims.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InstallClaimValidationError {
    /// Token missing or too long.
    #[error("token must be 1-255 characters")]
    InvalidToken,
    /// Tracker id has the wrong shape.
    #[error("tracker_id must be 8-255 characters of A-Z, a-z, 0-9, '-', '_', ':' or '.'")]
    InvalidTrackerId,
}

static TRACKER_ID_RE: OnceLock<Regex> = OnceLock::new();

fn tracker_id_regex() -> &'static Regex {
    TRACKER_ID_RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9\-_:.]{8,255}$")
            .unwrap_or_else(|error| panic!("tracker id regex failed to compile: {error}"))
    })
}

/// Identifier a tracker installation reports for itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerId(String);

impl TrackerId {
    /// Validate a raw tracker id.
    pub fn new(raw: &str) -> Result<Self, InstallClaimValidationError> {
        let trimmed = raw.trim();
        if !tracker_id_regex().is_match(trimmed) {
            return Err(InstallClaimValidationError::InvalidTrackerId);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Pre-issued install token.
#[derive(Clone, PartialEq, Eq)]
pub struct InstallToken(Zeroizing<String>);

impl InstallToken {
    /// Validate a raw token.
    pub fn new(raw: &str) -> Result<Self, InstallClaimValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.chars().count() > INSTALL_FIELD_MAX {
            return Err(InstallClaimValidationError::InvalidToken);
        }
        Ok(Self(Zeroizing::new(trimmed.to_owned())))
    }

    /// Borrow the secret.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for InstallToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("InstallToken(<redacted>)")
    }
}

/// A request to bind a tracker to the token's user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallClaim {
    /// Token being exchanged.
    pub token: InstallToken,
    /// Tracker installation.
    pub tracker_id: TrackerId,
    /// Rebind even when another tracker holds the token.
    pub force: bool,
}

/// Outcome of a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// Tracker bound to the user.
    Bound(UserId),
    /// The same tracker was already bound.
    AlreadyRegistered(UserId),
    /// Another tracker holds the token and `force` was not set.
    HeldByOtherTracker,
    /// No such token.
    UnknownToken,
}
