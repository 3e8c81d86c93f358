//! Port abstraction for tracker install tokens.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{ClaimOutcome, InstallClaim};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by install token adapters.
    pub enum InstallTokenPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "install token repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "install token repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InstallTokenRepository: Send + Sync {
    /// Bind the claim's tracker to the token's user.
    ///
    /// Adapters lock the token row for the duration of the decision so two
    /// trackers racing for one token cannot both win.
    async fn claim(
        &self,
        claim: &InstallClaim,
        claimed_at: DateTime<Utc>,
    ) -> Result<ClaimOutcome, InstallTokenPersistenceError>;
}
