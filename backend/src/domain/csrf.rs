//! Session-bound CSRF tokens for browser form submissions.

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Random bytes per token before hex encoding.
pub const CSRF_TOKEN_BYTES: usize = 32;
/// Seconds a token stays valid after issue.
pub const CSRF_TOKEN_LIFETIME_SECS: i64 = 3_600;
/// Form field carrying the token.
pub const CSRF_FIELD: &str = "csrf_token";

/// Reasons a presented token is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CsrfError {
    /// The session holds no token.
    #[error("no CSRF token issued for this session")]
    Missing,
    /// The token is older than its lifetime.
    #[error("CSRF token expired")]
    Expired,
    /// The presented value does not match.
    #[error("CSRF token mismatch")]
    Mismatch,
}

/// A token stored in the session alongside its issue time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsrfToken {
    value: String,
    issued_at: DateTime<Utc>,
}

impl CsrfToken {
    /// Generate a fresh token issued at `now`.
    #[must_use]
    pub fn generate(now: DateTime<Utc>) -> Self {
        let mut bytes = [0_u8; CSRF_TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self {
            value: hex::encode(bytes),
            issued_at: now,
        }
    }

    /// Hex-encoded value handed to the page.
    #[must_use]
    pub fn value(&self) -> &str {
        self.value.as_str()
    }

    /// Whether the token has outlived its lifetime at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.issued_at > Duration::seconds(CSRF_TOKEN_LIFETIME_SECS)
    }

    /// Check a presented value against this token.
    pub fn verify(&self, presented: &str, now: DateTime<Utc>) -> Result<(), CsrfError> {
        if self.is_expired(now) {
            return Err(CsrfError::Expired);
        }
        if constant_time_eq(self.value.as_bytes(), presented.as_bytes()) {
            Ok(())
        } else {
            Err(CsrfError::Mismatch)
        }
    }
}

fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    left.iter()
        .zip(right)
        .fold(0_u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
