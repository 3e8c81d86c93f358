//! Port abstraction for site settings and maintenance.
use async_trait::async_trait;

use crate::domain::{ResetConfirmation, ResetReport, SiteOverview};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by site settings adapters.
    pub enum SitePersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "site repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "site repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SiteRepository: Send + Sync {
    /// Whether new accounts may register. Missing settings read as closed.
    async fn registration_open(&self) -> Result<bool, SitePersistenceError>;

    /// Store the registration flag.
    async fn set_registration_open(&self, open: bool) -> Result<(), SitePersistenceError>;

    /// Counters for the admin page.
    async fn overview(&self) -> Result<SiteOverview, SitePersistenceError>;

    /// Delete every job, event, VTC, membership and non-admin user in one
    /// transaction, then restart identity sequences.
    async fn reset(
        &self,
        confirmation: ResetConfirmation,
    ) -> Result<ResetReport, SitePersistenceError>;
}
