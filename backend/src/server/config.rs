//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;
use mytrucktracker::domain::ports::{
    JobCompletionNotifier, PasswordHasher, SteamOpenIdVerifier, SteamProfileSource,
};
use mytrucktracker::inbound::http::session_config::SessionSettings;
use mytrucktracker::outbound::persistence::DbPool;

/// Outbound adapters that are not repositories.
#[derive(Clone)]
pub struct OutboundAdapters {
    pub notifier: Arc<dyn JobCompletionNotifier>,
    pub steam_openid: Arc<dyn SteamOpenIdVerifier>,
    pub steam_profiles: Arc<dyn SteamProfileSource>,
    pub hasher: Arc<dyn PasswordHasher>,
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
    pub(crate) public_base_url: String,
    pub(crate) adapters: OutboundAdapters,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// Construct a server configuration from validated settings.
    #[must_use]
    pub fn new(
        session: SessionSettings,
        bind_addr: SocketAddr,
        db_pool: DbPool,
        adapters: OutboundAdapters,
    ) -> Self {
        Self {
            session,
            bind_addr,
            db_pool,
            public_base_url: String::new(),
            adapters,
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Public origin used for OpenID realms and redirect targets.
    #[must_use]
    pub fn with_public_base_url(mut self, public_base_url: impl Into<String>) -> Self {
        self.public_base_url = public_base_url.into();
        self
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware to the configuration.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}
