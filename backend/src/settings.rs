//! Runtime settings loaded via OrthoConfig.
//!
//! Values come from `TRACKER_*` environment variables, configuration files
//! and command-line flags, in OrthoConfig's usual precedence. Two legacy
//! variables are honoured as fallbacks: `DATABASE_URL` and `STEAM_API_KEY`.

use std::net::SocketAddr;

use mockable::Env;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:8080";

const DATABASE_URL_ENV: &str = "DATABASE_URL";
const STEAM_API_KEY_ENV: &str = "STEAM_API_KEY";

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SettingsError {
    /// No database URL was configured anywhere.
    #[error("database URL missing: set TRACKER_DATABASE_URL or DATABASE_URL")]
    MissingDatabaseUrl,
    /// A value is present but does not parse.
    #[error("invalid {name}: {message}")]
    Invalid { name: &'static str, message: String },
}

impl SettingsError {
    fn invalid(name: &'static str, message: impl ToString) -> Self {
        Self::Invalid {
            name,
            message: message.to_string(),
        }
    }
}

/// Settings for the tracker server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "TRACKER")]
pub struct TrackerSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    #[ortho_config(default = 10)]
    pub pool_size: u32,
    /// Public origin used for Steam OpenID realms and return URLs.
    pub public_base_url: Option<String>,
    /// Discord webhook receiving job embeds.
    pub discord_webhook_url: Option<String>,
    /// Avatar shown on Discord webhook posts.
    pub discord_avatar_url: Option<String>,
    /// WebSocket endpoint announcing finished jobs.
    pub websocket_url: Option<String>,
    /// Steam Web API key used for persona lookups.
    pub steam_api_key: Option<String>,
}

impl TrackerSettings {
    /// Parsed bind address, defaulting to all interfaces on port 8080.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Invalid`] when the value is not a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        self.bind_addr
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDR)
            .parse()
            .map_err(|err| SettingsError::invalid("bind address", err))
    }

    /// Database URL from settings, falling back to `DATABASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::MissingDatabaseUrl`] when neither is set.
    pub fn database_url(&self, env: &impl Env) -> Result<String, SettingsError> {
        non_blank(self.database_url.clone())
            .or_else(|| non_blank(env.string(DATABASE_URL_ENV)))
            .ok_or(SettingsError::MissingDatabaseUrl)
    }

    /// Pool size, never below one.
    pub fn pool_size(&self) -> u32 {
        self.pool_size.max(1)
    }

    /// Public origin without a trailing slash.
    pub fn public_base_url(&self) -> &str {
        self.public_base_url
            .as_deref()
            .unwrap_or(DEFAULT_PUBLIC_BASE_URL)
            .trim_end_matches('/')
    }

    /// Parsed Discord webhook, if configured.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Invalid`] when the URL does not parse.
    pub fn discord_webhook(&self) -> Result<Option<Url>, SettingsError> {
        non_blank(self.discord_webhook_url.clone())
            .map(|raw| Url::parse(&raw).map_err(|err| SettingsError::invalid("discord webhook", err)))
            .transpose()
    }

    /// WebSocket notifier endpoint, if configured.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Invalid`] unless the URL uses `ws` or `wss`.
    pub fn websocket_url(&self) -> Result<Option<Url>, SettingsError> {
        let Some(raw) = non_blank(self.websocket_url.clone()) else {
            return Ok(None);
        };
        let url = Url::parse(&raw).map_err(|err| SettingsError::invalid("websocket URL", err))?;
        match url.scheme() {
            "ws" | "wss" => Ok(Some(url)),
            other => Err(SettingsError::invalid(
                "websocket URL",
                format!("unsupported scheme {other}"),
            )),
        }
    }

    /// Steam Web API key from settings, falling back to `STEAM_API_KEY`.
    pub fn steam_api_key(&self, env: &impl Env) -> Option<String> {
        non_blank(self.steam_api_key.clone()).or_else(|| non_blank(env.string(STEAM_API_KEY_ENV)))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}
