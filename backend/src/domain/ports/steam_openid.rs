//! Port for verifying Steam OpenID login assertions.
use async_trait::async_trait;

use crate::domain::SteamId;

use super::define_port_error;

define_port_error! {
    /// Failures raised while verifying a Steam assertion.
    pub enum SteamOpenIdError {
        /// The verification request could not be completed.
        Transport { message: String } => "steam verification request failed: {message}",
        /// Steam refused the assertion or the claimed id was malformed.
        Rejected { message: String } => "steam rejected the login: {message}",
    }
}

/// `openid.*` parameters returned by Steam on the callback URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenIdAssertion {
    params: Vec<(String, String)>,
}

impl OpenIdAssertion {
    /// Keep the `openid.*` pairs of a callback query and check that the
    /// assertion is complete.
    ///
    /// # Examples
    /// ```
    /// use mytrucktracker::domain::ports::OpenIdAssertion;
    ///
    /// let cancelled = vec![("openid.mode".to_owned(), "cancel".to_owned())];
    /// assert!(OpenIdAssertion::from_query(cancelled).is_err());
    /// ```
    pub fn from_query(
        pairs: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Self, SteamOpenIdError> {
        let params: Vec<(String, String)> = pairs
            .into_iter()
            .filter(|(key, _)| key.starts_with("openid."))
            .collect();
        let assertion = Self { params };
        match assertion.get("openid.mode") {
            None => return Err(SteamOpenIdError::rejected("missing openid.mode")),
            Some("cancel") => return Err(SteamOpenIdError::rejected("login cancelled")),
            Some(_) => {}
        }
        for required in ["openid.claimed_id", "openid.sig"] {
            if assertion.get(required).is_none_or(str::is_empty) {
                return Err(SteamOpenIdError::rejected(format!("missing {required}")));
            }
        }
        Ok(assertion)
    }

    /// Value of one parameter.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// Claimed identity URL.
    #[must_use]
    pub fn claimed_id(&self) -> &str {
        self.get("openid.claimed_id").unwrap_or_default()
    }

    /// Parameters to echo back, with the mode switched to
    /// `check_authentication`.
    #[must_use]
    pub fn verification_form(&self) -> Vec<(String, String)> {
        self.params
            .iter()
            .map(|(key, value)| {
                if key == "openid.mode" {
                    (key.clone(), "check_authentication".to_owned())
                } else {
                    (key.clone(), value.clone())
                }
            })
            .collect()
    }
}

/// Confirms an assertion with Steam and yields the verified account.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SteamOpenIdVerifier: Send + Sync {
    /// Verify the assertion and extract the Steam id.
    async fn verify(&self, assertion: &OpenIdAssertion) -> Result<SteamId, SteamOpenIdError>;

    /// URL that starts a Steam login returning to `return_to`.
    fn login_url(&self, return_to: &str, realm: &str) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn pairs(entries: &[(&str, &str)]) -> Vec<(String, String)> {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[rstest]
    fn keeps_only_openid_params_and_switches_mode() {
        let assertion = OpenIdAssertion::from_query(pairs(&[
            ("openid.mode", "id_res"),
            ("openid.claimed_id", "https://steamcommunity.com/openid/id/76561198000000000"),
            ("openid.sig", "abc"),
            ("return", "/jobs"),
        ]))
        .expect("complete assertion");

        let form = assertion.verification_form();
        assert_eq!(form.len(), 3);
        assert!(form.contains(&("openid.mode".to_owned(), "check_authentication".to_owned())));
        assert_eq!(
            assertion.claimed_id(),
            "https://steamcommunity.com/openid/id/76561198000000000"
        );
    }

    #[rstest]
    #[case(&[("openid.mode", "cancel")])]
    #[case(&[("openid.claimed_id", "x"), ("openid.sig", "y")])]
    #[case(&[("openid.mode", "id_res"), ("openid.sig", "y")])]
    #[case(&[("openid.mode", "id_res"), ("openid.claimed_id", "x")])]
    fn rejects_incomplete_assertions(#[case] entries: &[(&str, &str)]) {
        assert!(OpenIdAssertion::from_query(pairs(entries)).is_err());
    }
}
