//! PostgreSQL-backed `JobEventRepository` for tolls, fines and transports.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel_async::RunQueryDsl;

use crate::domain::ports::{JobEventPersistenceError, JobEventRepository};
use crate::domain::{FineReport, TollReport, TransportReport, UserId};

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::models::{NewPenaltyRow, NewTollRow, NewTransportRow};
use super::pool::{DbPool, PoolError};
use super::schema::{job_transports, penalties, tolls};

/// Diesel-backed implementation of the job event repository port.
#[derive(Clone)]
pub struct DieselJobEventRepository {
    pool: DbPool,
}

impl DieselJobEventRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> JobEventPersistenceError {
    map_pool_error(error, JobEventPersistenceError::connection)
}

fn diesel_error(
    operation: &'static str,
) -> impl FnOnce(diesel::result::Error) -> JobEventPersistenceError {
    move |error| {
        map_diesel_error(
            error,
            operation,
            JobEventPersistenceError::query,
            JobEventPersistenceError::connection,
        )
    }
}

#[async_trait]
impl JobEventRepository for DieselJobEventRepository {
    async fn insert_toll(
        &self,
        toll: &TollReport,
        user_id: UserId,
        recorded_at: DateTime<Utc>,
    ) -> Result<i64, JobEventPersistenceError> {
        let row = NewTollRow {
            job_id: toll.job_id.as_i64(),
            user_id: user_id.as_i64(),
            game: &toll.game,
            amount: toll.amount,
            created_at: recorded_at,
        };
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::insert_into(tolls::table)
            .values(&row)
            .returning(tolls::id)
            .get_result(&mut conn)
            .await
            .map_err(diesel_error("insert toll"))
    }

    async fn insert_penalty(
        &self,
        fine: &FineReport,
        user_id: UserId,
        recorded_at: DateTime<Utc>,
    ) -> Result<i64, JobEventPersistenceError> {
        let row = NewPenaltyRow {
            job_id: fine.job_id.as_i64(),
            user_id: user_id.as_i64(),
            game: &fine.game,
            amount: fine.amount,
            offence: &fine.offence,
            created_at: recorded_at,
        };
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::insert_into(penalties::table)
            .values(&row)
            .returning(penalties::id)
            .get_result(&mut conn)
            .await
            .map_err(diesel_error("insert penalty"))
    }

    async fn insert_transport(
        &self,
        transport: &TransportReport,
        recorded_at: DateTime<Utc>,
    ) -> Result<i64, JobEventPersistenceError> {
        let row = NewTransportRow {
            job_id: transport.job_id.as_i64(),
            transport_type: transport.transport_type.as_str(),
            source_name: &transport.source,
            destination_name: &transport.destination,
            amount: transport.amount,
            game: &transport.game,
            driver_steam_id: transport.steam_id.as_str(),
            recorded_at,
        };
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::insert_into(job_transports::table)
            .values(&row)
            .returning(job_transports::id)
            .get_result(&mut conn)
            .await
            .map_err(diesel_error("insert transport"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(diesel::result::Error::NotFound, "insert toll: record not found")]
    #[case(diesel::result::Error::RollbackTransaction, "insert toll: database error")]
    fn diesel_errors_keep_stable_messages(
        #[case] error: diesel::result::Error,
        #[case] expected: &str,
    ) {
        assert_eq!(
            diesel_error("insert toll")(error),
            JobEventPersistenceError::query(expected)
        );
    }

    #[rstest]
    fn pool_errors_map_to_connection() {
        assert_eq!(
            pool_error(PoolError::build("bad url")),
            JobEventPersistenceError::connection("bad url")
        );
    }
}
