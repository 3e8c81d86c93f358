//! Diesel-backed `ReportsQuery` adapter for dashboards, lists and leaderboards.
//!
//! Lists use the Diesel DSL with a left join from `jobs.driver_steam_id` to
//! `users.steam_id`. Leaderboards aggregate in SQL via `sql_query` because
//! they need `DISTINCT ON` and computed driver names.

use async_trait::async_trait;
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Double, Text};
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::ReportsQuery;
use crate::domain::{
    Dashboard, DashboardStats, DriverDistance, DriverStats, DriverTruck, Error, JobDetail, JobId,
    JobListPage, JobStatus, JobSummary, JobTransport, LEADERBOARD_LIMIT, Leaderboards,
    PageRequest, RACE_SPEED_MIN, REALISTIC_SPEED_MAX, RECENT_JOBS, RankedName, UserId,
    UserProfileView, job_duration_seconds, total_pages,
};

use super::diesel_helpers::{collect_rows, map_diesel_error, map_pool_error};
use super::models::{JobRow, JobSummaryRow, TransportRow, UserRow, shown_name};
use super::pool::{DbPool, PoolError};
use super::schema::{job_transports, jobs, users};

/// SQL expression for the name a driver is shown under.
const DRIVER_NAME: &str = "COALESCE(NULLIF(TRIM(u.display_name), ''), u.username)";

/// Diesel-backed implementation of [`ReportsQuery`].
#[derive(Clone)]
pub struct DieselReportsQuery {
    pool: DbPool,
}

impl DieselReportsQuery {
    /// Create a new query adapter with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> Error {
    map_pool_error(error, Error::service_unavailable)
}

fn diesel_error(operation: &'static str) -> impl FnOnce(diesel::result::Error) -> Error {
    move |error| map_diesel_error(error, operation, Error::internal, Error::service_unavailable)
}

/// Columns ranked on the leaderboard page.
#[derive(Debug, Clone, Copy)]
enum RankedColumn {
    Cargo,
    SourceCity,
    SourceCompany,
    DestinationCity,
    DestinationCompany,
}

impl RankedColumn {
    fn column(self) -> &'static str {
        match self {
            Self::Cargo => "cargo",
            Self::SourceCity => "source_city",
            Self::SourceCompany => "source_company",
            Self::DestinationCity => "destination_city",
            Self::DestinationCompany => "destination_company",
        }
    }

    fn sql(self) -> String {
        let column = self.column();
        format!(
            "SELECT {column} AS name, COUNT(*) AS count FROM jobs \
             WHERE status = $1 GROUP BY {column} \
             ORDER BY count DESC, {column} ASC LIMIT $2"
        )
    }
}

fn distance_sql() -> String {
    format!(
        "SELECT {DRIVER_NAME} AS driver_name, \
         COALESCE(ROUND(SUM(j.driven_distance_km)), 0) AS total_km \
         FROM jobs j JOIN users u ON u.steam_id = j.driver_steam_id \
         WHERE j.status = $1 \
         GROUP BY u.id, u.username, u.display_name \
         ORDER BY total_km DESC, driver_name ASC"
    )
}

fn favourite_truck_sql() -> String {
    format!(
        "SELECT driver_name, truck, uses FROM ( \
           SELECT DISTINCT ON (u.id) {DRIVER_NAME} AS driver_name, j.truck AS truck, \
                  COUNT(*) AS uses \
           FROM jobs j JOIN users u ON u.steam_id = j.driver_steam_id \
           WHERE j.status = $1 \
           GROUP BY u.id, u.username, u.display_name, j.truck \
           ORDER BY u.id, uses DESC, j.truck ASC \
         ) favourites ORDER BY driver_name ASC"
    )
}

#[derive(Debug, QueryableByName)]
struct DistanceRow {
    #[diesel(sql_type = Text)]
    driver_name: String,
    #[diesel(sql_type = Double)]
    total_km: f64,
}

#[derive(Debug, QueryableByName)]
struct TruckRow {
    #[diesel(sql_type = Text)]
    driver_name: String,
    #[diesel(sql_type = Text)]
    truck: String,
    #[diesel(sql_type = BigInt)]
    uses: i64,
}

#[derive(Debug, QueryableByName)]
struct RankedRow {
    #[diesel(sql_type = Text)]
    name: String,
    #[diesel(sql_type = BigInt)]
    count: i64,
}

type SummaryRow = (JobSummaryRow, Option<String>, Option<String>);

fn to_summary((job, username, display_name): SummaryRow) -> Result<JobSummary, String> {
    let driver_name = username.map(|username| shown_name(username, display_name));
    job.into_domain(driver_name)
}

fn to_summaries(rows: Vec<SummaryRow>) -> Result<Vec<JobSummary>, Error> {
    collect_rows(rows.into_iter().map(to_summary), Error::internal)
}

fn to_transport(row: TransportRow) -> Result<JobTransport, String> {
    let transport_type = row.transport_type()?;
    Ok(JobTransport {
        id: row.id,
        transport_type,
        source_name: row.source_name,
        destination_name: row.destination_name,
        amount: row.amount,
        game: row.game,
        timestamp: row.recorded_at,
    })
}

/// Jobs left-joined to their driver, newest finish first.
async fn load_summaries(
    conn: &mut AsyncPgConnection,
    filter: Option<&str>,
    offset: i64,
    limit: i64,
) -> Result<Vec<SummaryRow>, diesel::result::Error> {
    let mut query = jobs::table
        .left_join(users::table.on(users::steam_id.eq(jobs::driver_steam_id.nullable())))
        .select((
            JobSummaryRow::as_select(),
            users::username.nullable(),
            users::display_name.nullable(),
        ))
        .order((jobs::end_time.desc().nulls_last(), jobs::id.desc()))
        .offset(offset)
        .limit(limit)
        .into_boxed();
    if let Some(steam_id) = filter {
        query = query.filter(jobs::driver_steam_id.eq(steam_id.to_owned()));
    }
    query.load(conn).await
}

async fn count_jobs_with_status(
    conn: &mut AsyncPgConnection,
    status: &JobStatus,
) -> Result<i64, diesel::result::Error> {
    jobs::table
        .filter(jobs::status.eq(status.as_str().to_owned()))
        .count()
        .get_result(conn)
        .await
}

async fn driver_stats(
    conn: &mut AsyncPgConnection,
    steam_id: &str,
) -> Result<DriverStats, diesel::result::Error> {
    let own = || jobs::table.filter(jobs::driver_steam_id.eq(steam_id.to_owned()));
    let total_jobs = own().count().get_result(conn).await?;
    let delivered = own()
        .filter(jobs::status.eq(JobStatus::Delivered.as_str()))
        .count()
        .get_result(conn)
        .await?;
    let cancelled = own()
        .filter(jobs::status.eq(JobStatus::Cancelled.as_str()))
        .count()
        .get_result(conn)
        .await?;
    let realistic = own()
        .filter(jobs::driven_distance_km.is_not_null())
        .filter(jobs::max_speed.le(REALISTIC_SPEED_MAX))
        .count()
        .get_result(conn)
        .await?;
    let race = own()
        .filter(jobs::driven_distance_km.is_not_null())
        .filter(jobs::max_speed.ge(RACE_SPEED_MIN))
        .count()
        .get_result(conn)
        .await?;
    Ok(DriverStats {
        total_jobs,
        delivered,
        cancelled,
        realistic,
        race,
    })
}

async fn ranked(
    conn: &mut AsyncPgConnection,
    column: RankedColumn,
) -> Result<Vec<RankedName>, diesel::result::Error> {
    let rows: Vec<RankedRow> = diesel::sql_query(column.sql())
        .bind::<Text, _>(JobStatus::Delivered.as_str())
        .bind::<BigInt, _>(LEADERBOARD_LIMIT)
        .load(conn)
        .await?;
    Ok(rows
        .into_iter()
        .map(|row| RankedName {
            name: row.name,
            count: row.count,
        })
        .collect())
}

#[async_trait]
impl ReportsQuery for DieselReportsQuery {
    async fn dashboard(&self) -> Result<Dashboard, Error> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let total_users = users::table
            .select(count_star())
            .get_result(&mut conn)
            .await
            .map_err(diesel_error("count users"))?;
        let total_jobs = jobs::table
            .select(count_star())
            .get_result(&mut conn)
            .await
            .map_err(diesel_error("count jobs"))?;
        let delivered_jobs = count_jobs_with_status(&mut conn, &JobStatus::Delivered)
            .await
            .map_err(diesel_error("count delivered jobs"))?;
        let cancelled_jobs = count_jobs_with_status(&mut conn, &JobStatus::Cancelled)
            .await
            .map_err(diesel_error("count cancelled jobs"))?;
        let recent = load_summaries(&mut conn, None, 0, RECENT_JOBS)
            .await
            .map_err(diesel_error("load recent jobs"))?;

        Ok(Dashboard {
            stats: DashboardStats {
                total_users,
                total_jobs,
                delivered_jobs,
                cancelled_jobs,
            },
            recent_jobs: to_summaries(recent)?,
        })
    }

    async fn jobs_page(&self, page: PageRequest) -> Result<JobListPage, Error> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let total_jobs: i64 = jobs::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(diesel_error("count jobs"))?;
        let rows = load_summaries(&mut conn, None, page.offset(), page.limit())
            .await
            .map_err(diesel_error("load jobs page"))?;
        Ok(JobListPage {
            jobs: to_summaries(rows)?,
            page: page.page(),
            total_pages: total_pages(total_jobs),
            total_jobs,
        })
    }

    async fn job_detail(&self, id: JobId) -> Result<Option<JobDetail>, Error> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: Option<(JobRow, Option<String>, Option<String>)> = jobs::table
            .left_join(users::table.on(users::steam_id.eq(jobs::driver_steam_id.nullable())))
            .filter(jobs::id.eq(id.as_i64()))
            .select((
                JobRow::as_select(),
                users::username.nullable(),
                users::display_name.nullable(),
            ))
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error("load job"))?;
        let Some((job, username, display_name)) = row else {
            return Ok(None);
        };

        let transports: Vec<TransportRow> = job_transports::table
            .filter(job_transports::job_id.eq(id.as_i64()))
            .order((job_transports::recorded_at.asc(), job_transports::id.asc()))
            .select(TransportRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error("load job transports"))?;

        let job = job.into_domain().map_err(Error::internal)?;
        Ok(Some(JobDetail {
            duration_seconds: job_duration_seconds(job.start_time, job.end_time),
            driver_name: username.map(|username| shown_name(username, display_name)),
            transports: collect_rows(transports.into_iter().map(to_transport), Error::internal)?,
            job,
        }))
    }

    async fn user_profile(
        &self,
        id: UserId,
        page: PageRequest,
    ) -> Result<Option<UserProfileView>, Error> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = users::table
            .find(id.as_i64())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error("load profile"))?;
        let Some(row) = row else {
            return Ok(None);
        };
        let user = row.into_domain().map_err(Error::internal)?;

        // Local accounts without a Steam id have reported no jobs.
        let Some(steam_id) = user.steam_id.as_ref().map(|id| id.as_str().to_owned()) else {
            return Ok(Some(UserProfileView {
                user,
                stats: DriverStats::default(),
                jobs: Vec::new(),
                page: page.page(),
                total_pages: total_pages(0),
            }));
        };

        let stats = driver_stats(&mut conn, &steam_id)
            .await
            .map_err(diesel_error("load driver stats"))?;
        let rows = load_summaries(&mut conn, Some(&steam_id), page.offset(), page.limit())
            .await
            .map_err(diesel_error("load driver jobs"))?;
        Ok(Some(UserProfileView {
            user,
            jobs: to_summaries(rows)?,
            page: page.page(),
            total_pages: total_pages(stats.total_jobs),
            stats,
        }))
    }

    async fn leaderboards(&self) -> Result<Leaderboards, Error> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let delivered = JobStatus::Delivered.as_str();

        let distance: Vec<DistanceRow> = diesel::sql_query(distance_sql())
            .bind::<Text, _>(delivered)
            .load(&mut conn)
            .await
            .map_err(diesel_error("load distance leaderboard"))?;
        let trucks: Vec<TruckRow> = diesel::sql_query(favourite_truck_sql())
            .bind::<Text, _>(delivered)
            .load(&mut conn)
            .await
            .map_err(diesel_error("load truck leaderboard"))?;

        let mut lists = Vec::with_capacity(5);
        for column in [
            RankedColumn::Cargo,
            RankedColumn::SourceCity,
            RankedColumn::SourceCompany,
            RankedColumn::DestinationCity,
            RankedColumn::DestinationCompany,
        ] {
            lists.push(
                ranked(&mut conn, column)
                    .await
                    .map_err(diesel_error("load ranked leaderboard"))?,
            );
        }
        let [
            top_cargo,
            top_source_cities,
            top_source_companies,
            top_destination_cities,
            top_destination_companies,
        ]: [Vec<RankedName>; 5] = lists
            .try_into()
            .map_err(|_| Error::internal("leaderboard lists out of step"))?;

        Ok(Leaderboards {
            distance_by_driver: distance
                .into_iter()
                .map(|row| DriverDistance {
                    driver_name: row.driver_name,
                    total_km: row.total_km,
                })
                .collect(),
            favourite_trucks: trucks
                .into_iter()
                .map(|row| DriverTruck {
                    driver_name: row.driver_name,
                    truck: row.truck,
                    uses: row.uses,
                })
                .collect(),
            top_cargo,
            top_source_cities,
            top_source_companies,
            top_destination_cities,
            top_destination_companies,
        })
    }
}
