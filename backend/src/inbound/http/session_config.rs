//! Session cookie configuration read from `SESSION_*` environment variables.
//!
//! Debug builds fall back to defaults with a warning; release builds insist
//! on explicit, valid values so a misconfigured deployment fails at start-up
//! instead of issuing weak cookies.
//!
//! | Variable | Meaning | Release default |
//! |----------|---------|-----------------|
//! | `SESSION_KEY_FILE` | path to at least 64 bytes of key material | required |
//! | `SESSION_COOKIE_SECURE` | mark the cookie `Secure` | required |
//! | `SESSION_SAMESITE` | `Strict`, `Lax` or `None` | required |
//! | `SESSION_ALLOW_EPHEMERAL` | generate a key when the file is missing | must be `0` |
//! | `SESSION_COOKIE_NAME` | cookie name | `mtt_session` |

use std::fmt;
use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};
use mockable::Env;
use sha2::{Digest, Sha256};
use tracing::warn;
use zeroize::Zeroizing;

const SESSION_KEY_DEFAULT_PATH: &str = "/var/run/secrets/session_key";
const SESSION_KEY_MIN_LEN: usize = 64;
const FINGERPRINT_BYTES: usize = 8;
const DEFAULT_COOKIE_NAME: &str = "mtt_session";

const COOKIE_SECURE_ENV: &str = "SESSION_COOKIE_SECURE";
const SAMESITE_ENV: &str = "SESSION_SAMESITE";
const ALLOW_EPHEMERAL_ENV: &str = "SESSION_ALLOW_EPHEMERAL";
const KEY_FILE_ENV: &str = "SESSION_KEY_FILE";
const COOKIE_NAME_ENV: &str = "SESSION_COOKIE_NAME";

const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";

/// Whether configuration problems are tolerated.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Missing or invalid values fall back to defaults with a warning.
    Debug,
    /// Every value must be present and valid.
    Release,
}

impl BuildMode {
    /// `Debug` when compiled with debug assertions.
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }
}

/// Validated session cookie settings.
pub struct SessionSettings {
    /// Signing and encryption key for the private cookie.
    pub key: Key,
    /// Whether session cookies are marked `Secure`.
    pub cookie_secure: bool,
    /// `SameSite` policy for the cookie.
    pub same_site: SameSite,
    /// Cookie name.
    pub cookie_name: String,
}

impl SessionSettings {
    /// Short fingerprint of the active key for start-up logs.
    #[must_use]
    pub fn key_fingerprint(&self) -> String {
        key_fingerprint(&self.key)
    }
}

impl fmt::Debug for SessionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionSettings")
            .field("key", &self.key_fingerprint())
            .field("cookie_secure", &self.cookie_secure)
            .field("same_site", &self.same_site)
            .field("cookie_name", &self.cookie_name)
            .finish()
    }
}

/// Errors raised while validating session configuration.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// Reading the session key file failed.
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The session key file is too short for release builds.
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    /// `SameSite=None` requires a secure cookie in release builds.
    #[error("SESSION_SAMESITE=None requires SESSION_COOKIE_SECURE=1")]
    InsecureSameSiteNone,
    /// Release builds must not allow ephemeral session keys.
    #[error("SESSION_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
}

/// Build session settings from environment variables and build mode.
///
/// # Examples
///
/// ```rust
/// use mytrucktracker::inbound::http::session_config::{BuildMode, session_settings_from_env};
/// use mockable::MockEnv;
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|_| None);
///
/// let settings = session_settings_from_env(&env, BuildMode::Debug).expect("debug defaults");
/// assert!(settings.cookie_secure);
/// assert_eq!(settings.cookie_name, "mtt_session");
/// ```
pub fn session_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    let reader = SessionEnv { env, mode };
    let cookie_secure = reader.toggle(COOKIE_SECURE_ENV, true)?;
    let same_site = reader.same_site(cookie_secure)?;
    let allow_ephemeral = reader.toggle(ALLOW_EPHEMERAL_ENV, false)?;
    if allow_ephemeral && mode == BuildMode::Release {
        return Err(SessionConfigError::EphemeralNotAllowed);
    }
    Ok(SessionSettings {
        key: reader.key(allow_ephemeral)?,
        cookie_secure,
        same_site,
        cookie_name: reader.cookie_name(),
    })
}

/// Environment lookups that apply the build mode's leniency.
struct SessionEnv<'a, E> {
    env: &'a E,
    mode: BuildMode,
}

impl<E: Env> SessionEnv<'_, E> {
    /// In debug builds swap `failure` for `default`, logging why.
    fn lenient<T: fmt::Debug>(
        &self,
        name: &'static str,
        default: T,
        failure: SessionConfigError,
    ) -> Result<T, SessionConfigError> {
        match self.mode {
            BuildMode::Debug => {
                warn!(variable = name, ?default, reason = %failure, "using session default");
                Ok(default)
            }
            BuildMode::Release => Err(failure),
        }
    }

    fn toggle(&self, name: &'static str, debug_default: bool) -> Result<bool, SessionConfigError> {
        let Some(value) = self.env.string(name) else {
            return self.lenient(name, debug_default, SessionConfigError::MissingEnv { name });
        };
        match parse_bool(&value) {
            Some(flag) => Ok(flag),
            None => self.lenient(
                name,
                debug_default,
                SessionConfigError::InvalidEnv {
                    name,
                    value,
                    expected: BOOL_EXPECTED,
                },
            ),
        }
    }

    fn same_site(&self, cookie_secure: bool) -> Result<SameSite, SessionConfigError> {
        let default = match self.mode {
            BuildMode::Debug => SameSite::Lax,
            BuildMode::Release => SameSite::Strict,
        };
        let Some(value) = self.env.string(SAMESITE_ENV) else {
            return self.lenient(
                SAMESITE_ENV,
                default,
                SessionConfigError::MissingEnv { name: SAMESITE_ENV },
            );
        };
        match value.trim().to_ascii_lowercase().as_str() {
            "lax" => Ok(SameSite::Lax),
            "strict" => Ok(SameSite::Strict),
            "none" if cookie_secure => Ok(SameSite::None),
            // Browsers may drop an insecure None cookie; debug builds keep it anyway.
            "none" => self.lenient(
                SAMESITE_ENV,
                SameSite::None,
                SessionConfigError::InsecureSameSiteNone,
            ),
            _ => self.lenient(
                SAMESITE_ENV,
                default,
                SessionConfigError::InvalidEnv {
                    name: SAMESITE_ENV,
                    value,
                    expected: SAMESITE_EXPECTED,
                },
            ),
        }
    }

    fn key(&self, allow_ephemeral: bool) -> Result<Key, SessionConfigError> {
        let path = PathBuf::from(
            self.env
                .string(KEY_FILE_ENV)
                .unwrap_or_else(|| SESSION_KEY_DEFAULT_PATH.to_owned()),
        );
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => Zeroizing::new(bytes),
            Err(error) if self.mode == BuildMode::Debug || allow_ephemeral => {
                warn!(path = %path.display(), %error, "using temporary session key (dev only)");
                return Ok(Key::generate());
            }
            Err(source) => return Err(SessionConfigError::KeyRead { path, source }),
        };
        if self.mode == BuildMode::Release && bytes.len() < SESSION_KEY_MIN_LEN {
            return Err(SessionConfigError::KeyTooShort {
                path,
                length: bytes.len(),
                min_len: SESSION_KEY_MIN_LEN,
            });
        }
        Ok(Key::derive_from(&bytes))
    }

    fn cookie_name(&self) -> String {
        self.env
            .string(COOKIE_NAME_ENV)
            .map(|name| name.trim().to_owned())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_COOKIE_NAME.to_owned())
    }
}

/// Truncated SHA-256 of the key's signing half, hex encoded.
#[must_use]
pub fn key_fingerprint(key: &Key) -> String {
    let digest = Sha256::digest(key.signing());
    hex::encode(digest.iter().take(FINGERPRINT_BYTES).copied().collect::<Vec<u8>>())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests;
