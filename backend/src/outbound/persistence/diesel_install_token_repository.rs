//! PostgreSQL-backed `InstallTokenRepository`.
//!
//! The token row is locked with `SELECT ... FOR UPDATE` while the claim is
//! decided, so concurrent trackers serialise on the row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{InstallTokenPersistenceError, InstallTokenRepository};
use crate::domain::{ClaimOutcome, InstallClaim, UserId};

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::models::InstallTokenRow;
use super::pool::{DbPool, PoolError};
use super::schema::core_tokens;

/// Diesel-backed implementation of the install token port.
#[derive(Clone)]
pub struct DieselInstallTokenRepository {
    pool: DbPool,
}

impl DieselInstallTokenRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> InstallTokenPersistenceError {
    map_pool_error(error, InstallTokenPersistenceError::connection)
}

fn diesel_error(error: diesel::result::Error) -> InstallTokenPersistenceError {
    map_diesel_error(
        error,
        "claim install token",
        InstallTokenPersistenceError::query,
        InstallTokenPersistenceError::connection,
    )
}

/// What to do with a locked token row.
#[derive(Debug, PartialEq, Eq)]
enum ClaimDecision {
    Bind,
    Keep,
    Refuse,
}

fn decide(current: Option<&str>, tracker_id: &str, force: bool) -> ClaimDecision {
    match current {
        None => ClaimDecision::Bind,
        Some(bound) if bound == tracker_id => ClaimDecision::Keep,
        Some(_) if force => ClaimDecision::Bind,
        Some(_) => ClaimDecision::Refuse,
    }
}

/// Transaction failure: either Diesel or a row that fails validation.
enum ClaimError {
    Diesel(diesel::result::Error),
    BadRow(String),
}

impl From<diesel::result::Error> for ClaimError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

#[async_trait]
impl InstallTokenRepository for DieselInstallTokenRepository {
    async fn claim(
        &self,
        claim: &InstallClaim,
        claimed_at: DateTime<Utc>,
    ) -> Result<ClaimOutcome, InstallTokenPersistenceError> {
        let token = claim.token.expose().to_owned();
        let tracker_id = claim.tracker_id.as_str().to_owned();
        let force = claim.force;
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let result = conn
            .transaction::<_, ClaimError, _>(|conn| {
                async move {
                    let row: Option<InstallTokenRow> = core_tokens::table
                        .find(&token)
                        .select(InstallTokenRow::as_select())
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?;
                    let Some(row) = row else {
                        return Ok(ClaimOutcome::UnknownToken);
                    };
                    let user_id = UserId::new(row.user_id)
                        .map_err(|err| ClaimError::BadRow(format!("install token: {err}")))?;

                    match decide(row.tracker_id.as_deref(), &tracker_id, force) {
                        ClaimDecision::Keep => Ok(ClaimOutcome::AlreadyRegistered(user_id)),
                        ClaimDecision::Refuse => Ok(ClaimOutcome::HeldByOtherTracker),
                        ClaimDecision::Bind => {
                            diesel::update(core_tokens::table.find(&token))
                                .set((
                                    core_tokens::tracker_id.eq(&tracker_id),
                                    core_tokens::updated_at.eq(claimed_at),
                                ))
                                .execute(conn)
                                .await?;
                            Ok(ClaimOutcome::Bound(user_id))
                        }
                    }
                }
                .scope_boxed()
            })
            .await;

        result.map_err(|error| match error {
            ClaimError::Diesel(error) => diesel_error(error),
            ClaimError::BadRow(message) => InstallTokenPersistenceError::query(message),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, "tracker-a", false, ClaimDecision::Bind)]
    #[case(Some("tracker-a"), "tracker-a", false, ClaimDecision::Keep)]
    #[case(Some("tracker-a"), "tracker-a", true, ClaimDecision::Keep)]
    #[case(Some("tracker-a"), "tracker-b", false, ClaimDecision::Refuse)]
    #[case(Some("tracker-a"), "tracker-b", true, ClaimDecision::Bind)]
    fn claim_decisions(
        #[case] current: Option<&str>,
        #[case] tracker_id: &str,
        #[case] force: bool,
        #[case] expected: ClaimDecision,
    ) {
        assert_eq!(decide(current, tracker_id, force), expected);
    }
}
