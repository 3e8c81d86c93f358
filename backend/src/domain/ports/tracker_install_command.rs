//! Driving port for tracker install-token claims.

use async_trait::async_trait;

use crate::domain::{ClaimOutcome, Error, InstallClaim};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TrackerInstallCommand: Send + Sync {
    /// Bind a tracker to the token's user.
    ///
    /// Succeeds with [`ClaimOutcome::Bound`] or
    /// [`ClaimOutcome::AlreadyRegistered`]; an unknown token is unauthorised
    /// and a token held by another tracker is a conflict.
    async fn claim(&self, claim: InstallClaim) -> Result<ClaimOutcome, Error>;
}
