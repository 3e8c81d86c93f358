//! Port for reading Steam persona data.
use async_trait::async_trait;

use crate::domain::{SteamId, SteamProfile};

use super::define_port_error;

define_port_error! {
    /// Failures raised by Steam profile adapters.
    pub enum SteamProfileError {
        /// The Web API request failed.
        Transport { message: String } => "steam profile request failed: {message}",
        /// The response could not be decoded.
        Decode { message: String } => "steam profile response invalid: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SteamProfileSource: Send + Sync {
    /// Persona data for one account, or `None` when Steam has no record.
    async fn fetch(&self, steam_id: &SteamId) -> Result<Option<SteamProfile>, SteamProfileError>;
}

/// Source used when no Steam Web API key is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSteamProfileSource;

#[async_trait]
impl SteamProfileSource for FixtureSteamProfileSource {
    async fn fetch(&self, _steam_id: &SteamId) -> Result<Option<SteamProfile>, SteamProfileError> {
        Ok(None)
    }
}
