//! Driving port for the admin settings page.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{Error, ResetConfirmation, ResetReport, SiteOverview};

/// Admin page content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSettings {
    /// Whether new accounts may register.
    pub registration_open: bool,
    /// Site counters.
    pub stats: SiteOverview,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SiteAdminCommand: Send + Sync {
    /// Current settings and counters.
    async fn settings(&self) -> Result<AdminSettings, Error>;

    /// Whether new accounts may register.
    async fn registration_open(&self) -> Result<bool, Error>;

    /// Flip the registration flag and return the new value.
    async fn toggle_registration(&self) -> Result<bool, Error>;

    /// Wipe jobs, events, VTCs and non-admin users.
    async fn reset_site(&self, confirmation: ResetConfirmation) -> Result<ResetReport, Error>;
}
