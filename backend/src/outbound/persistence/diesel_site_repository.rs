//! PostgreSQL-backed `SiteRepository`: settings flags, counters and reset.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::info;

use crate::domain::ports::{SitePersistenceError, SiteRepository};
use crate::domain::{
    REGISTRATION_OPEN_KEY, ResetConfirmation, ResetReport, SiteOverview,
    encode_registration_flag, parse_registration_flag,
};

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::pool::{DbPool, PoolError};
use super::schema::{job_transports, jobs, penalties, site_settings, tolls, users, vtc_members, vtcs};

/// Tables whose identity sequence restarts after a reset.
const RESEQUENCED_TABLES: [&str; 5] = ["jobs", "job_transports", "tolls", "penalties", "vtcs"];

/// Diesel-backed implementation of the site repository port.
#[derive(Clone)]
pub struct DieselSiteRepository {
    pool: DbPool,
}

impl DieselSiteRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> SitePersistenceError {
    map_pool_error(error, SitePersistenceError::connection)
}

fn diesel_error(
    operation: &'static str,
) -> impl FnOnce(diesel::result::Error) -> SitePersistenceError {
    move |error| {
        map_diesel_error(
            error,
            operation,
            SitePersistenceError::query,
            SitePersistenceError::connection,
        )
    }
}

fn restart_sequence_sql(table: &str) -> String {
    format!("ALTER SEQUENCE {table}_id_seq RESTART WITH 1")
}

#[async_trait]
impl SiteRepository for DieselSiteRepository {
    async fn registration_open(&self) -> Result<bool, SitePersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let value: Option<String> = site_settings::table
            .find(REGISTRATION_OPEN_KEY)
            .select(site_settings::value)
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error("read registration flag"))?;
        Ok(parse_registration_flag(value.as_deref()))
    }

    async fn set_registration_open(&self, open: bool) -> Result<(), SitePersistenceError> {
        let value = encode_registration_flag(open);
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::insert_into(site_settings::table)
            .values((
                site_settings::key.eq(REGISTRATION_OPEN_KEY),
                site_settings::value.eq(value),
            ))
            .on_conflict(site_settings::key)
            .do_update()
            .set(site_settings::value.eq(value))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error("store registration flag"))
    }

    async fn overview(&self) -> Result<SiteOverview, SitePersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let (total_users, admin_users, total_jobs, total_vtcs) = diesel::select((
            users::table.count().single_value(),
            users::table
                .filter(users::is_admin.eq(true))
                .count()
                .single_value(),
            jobs::table.count().single_value(),
            vtcs::table.count().single_value(),
        ))
        .get_result::<(Option<i64>, Option<i64>, Option<i64>, Option<i64>)>(&mut conn)
        .await
        .map_err(diesel_error("load site overview"))?;

        Ok(SiteOverview {
            total_users: total_users.unwrap_or_default(),
            admin_users: admin_users.unwrap_or_default(),
            total_jobs: total_jobs.unwrap_or_default(),
            total_vtcs: total_vtcs.unwrap_or_default(),
        })
    }

    async fn reset(
        &self,
        _confirmation: ResetConfirmation,
    ) -> Result<ResetReport, SitePersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let report = conn
            .transaction(|conn| {
                async move {
                    diesel::delete(job_transports::table).execute(conn).await?;
                    diesel::delete(tolls::table).execute(conn).await?;
                    diesel::delete(penalties::table).execute(conn).await?;
                    let jobs_deleted = diesel::delete(jobs::table).execute(conn).await?;
                    diesel::delete(vtc_members::table).execute(conn).await?;
                    let vtcs_deleted = diesel::delete(vtcs::table).execute(conn).await?;
                    let users_deleted = diesel::delete(users::table.filter(users::is_admin.eq(false)))
                        .execute(conn)
                        .await?;
                    for table in RESEQUENCED_TABLES {
                        diesel::sql_query(restart_sequence_sql(table))
                            .execute(conn)
                            .await?;
                    }
                    Ok(ResetReport {
                        jobs_deleted,
                        vtcs_deleted,
                        users_deleted,
                    })
                }
                .scope_boxed()
            })
            .await
            .map_err(diesel_error("reset site"))?;

        info!(
            jobs = report.jobs_deleted,
            vtcs = report.vtcs_deleted,
            users = report.users_deleted,
            "site data reset"
        );
        Ok(report)
    }
}
