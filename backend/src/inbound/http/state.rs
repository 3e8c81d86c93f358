//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;

use crate::domain::ports::{
    AccountCommand, JobIngestionCommand, ProfileCommand, ReportsQuery, SiteAdminCommand,
    TrackerInstallCommand, VtcCommand,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub jobs: Arc<dyn JobIngestionCommand>,
    pub installs: Arc<dyn TrackerInstallCommand>,
    pub accounts: Arc<dyn AccountCommand>,
    pub profiles: Arc<dyn ProfileCommand>,
    pub admin: Arc<dyn SiteAdminCommand>,
    pub vtcs: Arc<dyn VtcCommand>,
    pub reports: Arc<dyn ReportsQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub jobs: Arc<dyn JobIngestionCommand>,
    pub installs: Arc<dyn TrackerInstallCommand>,
    pub accounts: Arc<dyn AccountCommand>,
    pub profiles: Arc<dyn ProfileCommand>,
    pub admin: Arc<dyn SiteAdminCommand>,
    pub vtcs: Arc<dyn VtcCommand>,
    pub reports: Arc<dyn ReportsQuery>,
    /// Source of "now" for CSRF token issue and expiry.
    pub clock: Arc<dyn Clock>,
    /// Public origin used for the Steam OpenID realm and return URLs,
    /// without a trailing slash.
    pub public_base_url: String,
}

impl HttpState {
    /// Construct state from the ports bundle.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use mytrucktracker::inbound::http::state::{HttpState, HttpStatePorts};
    ///
    /// fn build(ports: HttpStatePorts) -> HttpState {
    ///     HttpState::new(ports, Arc::new(DefaultClock), "https://tracker.example")
    /// }
    /// ```
    pub fn new(
        ports: HttpStatePorts,
        clock: Arc<dyn Clock>,
        public_base_url: impl Into<String>,
    ) -> Self {
        let HttpStatePorts {
            jobs,
            installs,
            accounts,
            profiles,
            admin,
            vtcs,
            reports,
        } = ports;
        let public_base_url = public_base_url.into().trim_end_matches('/').to_owned();
        Self {
            jobs,
            installs,
            accounts,
            profiles,
            admin,
            vtcs,
            reports,
            clock,
            public_base_url,
        }
    }

    /// Current UTC time from the injected clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }

    /// Absolute URL for a site path.
    pub fn absolute_url(&self, path: &str) -> String {
        format!("{}{path}", self.public_base_url)
    }
}
