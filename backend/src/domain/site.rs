//! Site-wide settings and administrative maintenance.

use serde::Serialize;

/// Setting key controlling whether new accounts may register.
pub const REGISTRATION_OPEN_KEY: &str = "registration_open";
/// Phrase an administrator must type to reset the site.
pub const RESET_CONFIRMATION_PHRASE: &str = "RESET";

/// Proof that an administrator typed the reset phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetConfirmation(());

/// Raised when the confirmation text does not match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Please type RESET to confirm.")]
pub struct ResetNotConfirmed;

impl ResetConfirmation {
    /// Accept only the exact phrase, case-sensitive.
    ///
    /// # Examples
    /// ```
    /// use mytrucktracker::domain::ResetConfirmation;
    ///
    /// assert!(ResetConfirmation::parse("RESET").is_ok());
    /// assert!(ResetConfirmation::parse("reset").is_err());
    /// ```
    pub fn parse(confirm_text: &str) -> Result<Self, ResetNotConfirmed> {
        if confirm_text == RESET_CONFIRMATION_PHRASE {
            Ok(Self(()))
        } else {
            Err(ResetNotConfirmed)
        }
    }
}

/// Counters shown on the admin settings page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SiteOverview {
    /// Every user.
    pub total_users: i64,
    /// Users flagged as administrators.
    pub admin_users: i64,
    /// Every job.
    pub total_jobs: i64,
    /// Every VTC.
    pub total_vtcs: i64,
}

/// Rows removed by a site reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetReport {
    /// Jobs deleted.
    pub jobs_deleted: usize,
    /// VTCs deleted.
    pub vtcs_deleted: usize,
    /// Non-admin users deleted.
    pub users_deleted: usize,
}

/// Decode the stored registration flag.
#[must_use]
pub fn parse_registration_flag(raw: Option<&str>) -> bool {
    matches!(raw.map(str::trim), Some("1" | "true"))
}

/// Encode the registration flag for storage.
#[must_use]
pub fn encode_registration_flag(open: bool) -> &'static str {
    if open { "1" } else { "0" }
}
