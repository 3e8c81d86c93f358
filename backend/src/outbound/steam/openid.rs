//! Reqwest-backed Steam OpenID 2.0 verifier.
//!
//! Steam answers `check_authentication` requests with a key-value body;
//! the assertion is accepted only when it reports `is_valid:true` and the
//! claimed id is a Steam community identity URL.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, StatusCode, Url};

use crate::domain::SteamId;
use crate::domain::ports::{OpenIdAssertion, SteamOpenIdError, SteamOpenIdVerifier};

/// Steam's OpenID provider endpoint.
pub const STEAM_OPENID_ENDPOINT: &str = "https://steamcommunity.com/openid/login";
/// Timeout for the verification round trip.
pub const STEAM_OPENID_TIMEOUT: Duration = Duration::from_secs(30);
pub(super) const USER_AGENT: &str = "MyTruckTracker/1.0";

const OPENID_NS: &str = "http://specs.openid.net/auth/2.0";

static IS_VALID_RE: OnceLock<Regex> = OnceLock::new();
static CLAIMED_ID_RE: OnceLock<Regex> = OnceLock::new();

fn is_valid_regex() -> &'static Regex {
    IS_VALID_RE.get_or_init(|| {
        Regex::new(r"(?i)is_valid\s*:\s*true")
            .unwrap_or_else(|error| panic!("is_valid regex failed to compile: {error}"))
    })
}

fn claimed_id_regex() -> &'static Regex {
    CLAIMED_ID_RE.get_or_init(|| {
        Regex::new(r"^https?://steamcommunity\.com/openid/id/(\d{17})$")
            .unwrap_or_else(|error| panic!("claimed id regex failed to compile: {error}"))
    })
}

/// Verifier that echoes assertions back to Steam over HTTPS.
pub struct SteamOpenIdHttpVerifier {
    client: Client,
    endpoint: Url,
}

impl SteamOpenIdHttpVerifier {
    /// Verifier against Steam's public endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new() -> Result<Self, reqwest::Error> {
        let endpoint = Url::parse(STEAM_OPENID_ENDPOINT)
            .unwrap_or_else(|error| panic!("steam endpoint constant is invalid: {error}"));
        Self::with_endpoint(endpoint, STEAM_OPENID_TIMEOUT)
    }

    /// Verifier against an explicit provider endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_endpoint(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl SteamOpenIdVerifier for SteamOpenIdHttpVerifier {
    async fn verify(&self, assertion: &OpenIdAssertion) -> Result<SteamId, SteamOpenIdError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .form(&assertion.verification_form())
            .send()
            .await
            .map_err(|error| SteamOpenIdError::transport(error.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| SteamOpenIdError::transport(error.to_string()))?;
        check_verification(status, &body)?;
        steam_id_from_claimed_id(assertion.claimed_id())
    }

    fn login_url(&self, return_to: &str, realm: &str) -> String {
        build_login_url(&self.endpoint, return_to, realm)
    }
}

fn check_verification(status: StatusCode, body: &str) -> Result<(), SteamOpenIdError> {
    if status != StatusCode::OK {
        return Err(SteamOpenIdError::transport(format!(
            "status {}",
            status.as_u16()
        )));
    }
    if is_valid_regex().is_match(body) {
        Ok(())
    } else {
        Err(SteamOpenIdError::rejected("assertion is not valid"))
    }
}

fn steam_id_from_claimed_id(claimed_id: &str) -> Result<SteamId, SteamOpenIdError> {
    let digits = claimed_id_regex()
        .captures(claimed_id)
        .and_then(|captures| captures.get(1))
        .ok_or_else(|| SteamOpenIdError::rejected("claimed id is not a steam identity"))?;
    SteamId::new(digits.as_str()).map_err(|error| SteamOpenIdError::rejected(error.to_string()))
}

fn build_login_url(endpoint: &Url, return_to: &str, realm: &str) -> String {
    let identifier_select = format!("{OPENID_NS}/identifier_select");
    let mut url = endpoint.clone();
    url.query_pairs_mut()
        .clear()
        .append_pair("openid.ns", OPENID_NS)
        .append_pair("openid.mode", "checkid_setup")
        .append_pair("openid.return_to", return_to)
        .append_pair("openid.realm", realm)
        .append_pair("openid.identity", &identifier_select)
        .append_pair("openid.claimed_id", &identifier_select);
    url.into()
}
