//! Steam Web API persona lookup via `ISteamUser/GetPlayerSummaries/v2`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use super::openid::USER_AGENT;
use crate::domain::ports::{SteamProfileError, SteamProfileSource};
use crate::domain::{DEFAULT_AVATAR_URL, SteamId, SteamProfile};

/// Player summaries endpoint.
pub const STEAM_PLAYER_SUMMARIES_ENDPOINT: &str =
    "https://api.steampowered.com/ISteamUser/GetPlayerSummaries/v2/";
/// Timeout for one profile lookup.
pub const STEAM_PROFILE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct PlayerSummariesDto {
    response: PlayerListDto,
}

#[derive(Debug, Deserialize)]
struct PlayerListDto {
    #[serde(default)]
    players: Vec<PlayerDto>,
}

#[derive(Debug, Default, Deserialize)]
struct PlayerDto {
    personaname: Option<String>,
    avatarfull: Option<String>,
    avatarmedium: Option<String>,
    avatar: Option<String>,
}

impl PlayerDto {
    fn into_profile(self, steam_id: &SteamId) -> SteamProfile {
        let username = non_blank(self.personaname).unwrap_or_else(|| steam_id.fallback_username());
        let avatar_url = non_blank(self.avatarfull)
            .or_else(|| non_blank(self.avatarmedium))
            .or_else(|| non_blank(self.avatar))
            .unwrap_or_else(|| DEFAULT_AVATAR_URL.to_owned());
        SteamProfile {
            username,
            avatar_url,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

fn parse_profile(body: &[u8], steam_id: &SteamId) -> Result<Option<SteamProfile>, SteamProfileError> {
    let decoded: PlayerSummariesDto = serde_json::from_slice(body).map_err(|error| {
        SteamProfileError::decode(format!("invalid player summaries payload: {error}"))
    })?;
    Ok(decoded
        .response
        .players
        .into_iter()
        .next()
        .map(|player| player.into_profile(steam_id)))
}

/// Profile source backed by the Steam Web API.
pub struct SteamWebApiProfileSource {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl SteamWebApiProfileSource {
    /// Source using `api_key` against the public endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(api_key: impl Into<String>) -> Result<Self, reqwest::Error> {
        let endpoint = Url::parse(STEAM_PLAYER_SUMMARIES_ENDPOINT)
            .unwrap_or_else(|error| panic!("steam endpoint constant is invalid: {error}"));
        Self::with_endpoint(endpoint, api_key, STEAM_PROFILE_TIMEOUT)
    }

    /// Source against an explicit endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_endpoint(
        endpoint: Url,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            endpoint,
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl SteamProfileSource for SteamWebApiProfileSource {
    async fn fetch(&self, steam_id: &SteamId) -> Result<Option<SteamProfile>, SteamProfileError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("key", self.api_key.as_str()), ("steamids", steam_id.as_str())])
            .send()
            .await
            .map_err(|error| SteamProfileError::transport(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SteamProfileError::transport(format!(
                "status {}",
                status.as_u16()
            )));
        }
        let body = response
            .bytes()
            .await
            .map_err(|error| SteamProfileError::transport(error.to_string()))?;
        parse_profile(body.as_ref(), steam_id)
    }
}
