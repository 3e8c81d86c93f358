//! Install-token claim service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{
    InstallTokenPersistenceError, InstallTokenRepository, TrackerInstallCommand,
};
use crate::domain::{ClaimOutcome, Error, InstallClaim};

/// Service implementing [`TrackerInstallCommand`].
#[derive(Clone)]
pub struct TrackerInstallService<R> {
    tokens: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> TrackerInstallService<R> {
    /// Create a new service.
    pub fn new(tokens: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { tokens, clock }
    }
}

fn map_token_error(error: InstallTokenPersistenceError) -> Error {
    match error {
        InstallTokenPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("install token repository unavailable: {message}"))
        }
        InstallTokenPersistenceError::Query { message } => {
            Error::internal(format!("install token repository error: {message}"))
        }
    }
}

#[async_trait]
impl<R> TrackerInstallCommand for TrackerInstallService<R>
where
    R: InstallTokenRepository,
{
    async fn claim(&self, claim: InstallClaim) -> Result<ClaimOutcome, Error> {
        let outcome = self
            .tokens
            .claim(&claim, self.clock.utc())
            .await
            .map_err(map_token_error)?;
        match outcome {
            ClaimOutcome::Bound(user_id) => {
                info!(%user_id, tracker_id = claim.tracker_id.as_str(), "tracker bound");
                Ok(outcome)
            }
            ClaimOutcome::AlreadyRegistered(_) => Ok(outcome),
            ClaimOutcome::HeldByOtherTracker => {
                warn!(
                    tracker_id = claim.tracker_id.as_str(),
                    "install token held by another tracker"
                );
                Err(Error::conflict(
                    "Token already registered to another tracker. Retry with force to rebind.",
                ))
            }
            ClaimOutcome::UnknownToken => Err(Error::unauthorized("Invalid token")),
        }
    }
}
