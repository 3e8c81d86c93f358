//! PostgreSQL-backed `JobRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{JobPersistenceError, JobRepository};
use crate::domain::{
    CompletionOutcome, JobCompletion, JobCompletionNotice, JobId, JobOwner, JobStatus, NewJob,
    SteamId, TrailerWear, TruckWear, UserId, job_duration_seconds,
};

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::models::{JobCompletionChangeset, JobNoticeRow, NewJobRow, shown_name};
use super::pool::{DbPool, PoolError};
use super::schema::{jobs, users};

/// Diesel-backed implementation of the job repository port.
#[derive(Clone)]
pub struct DieselJobRepository {
    pool: DbPool,
}

impl DieselJobRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> JobPersistenceError {
    map_pool_error(error, JobPersistenceError::connection)
}

fn diesel_error(operation: &'static str) -> impl FnOnce(diesel::result::Error) -> JobPersistenceError {
    move |error| {
        map_diesel_error(
            error,
            operation,
            JobPersistenceError::query,
            JobPersistenceError::connection,
        )
    }
}

fn new_job_row(job: &NewJob, started_at: DateTime<Utc>) -> NewJobRow<'_> {
    NewJobRow {
        driver_steam_id: job.driver_steam_id.as_str(),
        game: &job.game,
        truck: &job.truck,
        cargo: &job.cargo,
        source_city: &job.source_city,
        source_company: &job.source_company,
        destination_city: &job.destination_city,
        destination_company: &job.destination_company,
        planned_distance_km: job.planned_distance_km,
        truck_license_plate: &job.truck_plate.number,
        truck_license_plate_country: &job.truck_plate.country,
        truck_plate_code: job.truck_plate.country_code(),
        truck_plate_country_id: &job.truck_plate.country_id,
        trailer_license_plate: &job.trailer_plate.number,
        trailer_license_plate_country: &job.trailer_plate.country,
        trailer_plate_code: job.trailer_plate.country_code(),
        trailer_plate_country_id: &job.trailer_plate.country_id,
        trailer_body_type: job.trailer_body_type.as_deref(),
        status: JobStatus::Started.as_str(),
        start_time: started_at,
    }
}

fn completion_changeset(
    completion: &JobCompletion,
    finished_at: DateTime<Utc>,
) -> JobCompletionChangeset<'_> {
    let truck = completion.truck_wear;
    let trailer = completion.trailer_wear;
    JobCompletionChangeset {
        status: completion.status.as_str(),
        end_time: finished_at,
        driven_distance_km: completion.driven_km,
        income: completion.income,
        market: &completion.market,
        wear_truck_cabin: truck.cabin,
        wear_truck_chassis: truck.chassis,
        wear_truck_transmission: truck.transmission,
        wear_truck_wheels: truck.wheels,
        wear_truck_engine: truck.engine,
        wear_trailer_chassis: trailer.chassis,
        wear_trailer_wheels: trailer.wheels,
        wear_trailer_body: trailer.body,
        cargo_damage: completion.cargo_damage,
        cargo_mass: completion.cargo_mass,
        max_speed: completion.max_speed,
        xp: completion.xp,
        auto_park_used: completion.auto_park,
        auto_load_used: completion.auto_load,
        used_diesel: completion.used_diesel,
    }
}

fn notice_from_row(
    row: JobNoticeRow,
    driver_name: String,
) -> Result<JobCompletionNotice, JobPersistenceError> {
    let job_id = JobId::new(row.id)
        .map_err(|err| JobPersistenceError::query(format!("job {}: {err}", row.id)))?;
    let truck_wear = TruckWear {
        cabin: row.wear_truck_cabin.unwrap_or_default(),
        chassis: row.wear_truck_chassis.unwrap_or_default(),
        transmission: row.wear_truck_transmission.unwrap_or_default(),
        wheels: row.wear_truck_wheels.unwrap_or_default(),
        engine: row.wear_truck_engine.unwrap_or_default(),
    };
    let trailer_wear = TrailerWear {
        chassis: row.wear_trailer_chassis.unwrap_or_default(),
        wheels: row.wear_trailer_wheels.unwrap_or_default(),
        body: row.wear_trailer_body.unwrap_or_default(),
    };
    Ok(JobCompletionNotice {
        job_id,
        status: JobStatus::parse(&row.status),
        driver_name,
        game: row.game,
        cargo: row.cargo,
        cargo_mass_kg: row.cargo_mass.unwrap_or_default(),
        cargo_damage: row.cargo_damage.unwrap_or_default(),
        xp: row.xp.unwrap_or_default(),
        driven_km: row.driven_distance_km.unwrap_or_default(),
        duration_seconds: job_duration_seconds(row.start_time, row.end_time).unwrap_or_default(),
        income: row.income.unwrap_or_default(),
        truck_wear_average: truck_wear.average(),
        trailer_wear_average: trailer_wear.average(),
        source_city: row.source_city,
        source_company: row.source_company,
        destination_city: row.destination_city,
        destination_company: row.destination_company,
        truck: row.truck,
        truck_plate_code: row.truck_plate_code,
        truck_license_plate: row.truck_license_plate,
        trailer_body_type: row.trailer_body_type,
        trailer_plate_code: row.trailer_plate_code,
        trailer_license_plate: row.trailer_license_plate,
    })
}

#[async_trait]
impl JobRepository for DieselJobRepository {
    async fn insert_started(
        &self,
        job: &NewJob,
        started_at: DateTime<Utc>,
    ) -> Result<JobId, JobPersistenceError> {
        let row = new_job_row(job, started_at);
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let id: i64 = diesel::insert_into(jobs::table)
            .values(&row)
            .returning(jobs::id)
            .get_result(&mut conn)
            .await
            .map_err(diesel_error("insert started job"))?;
        JobId::new(id).map_err(|err| JobPersistenceError::query(format!("job {id}: {err}")))
    }

    async fn complete(
        &self,
        completion: &JobCompletion,
        finished_at: DateTime<Utc>,
    ) -> Result<CompletionOutcome, JobPersistenceError> {
        let changeset = completion_changeset(completion, finished_at);
        let id = completion.job_id.as_i64();
        let steam_id = completion.steam_id.as_str();
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let updated = diesel::update(
            jobs::table
                .filter(jobs::id.eq(id))
                .filter(jobs::driver_steam_id.eq(steam_id))
                .filter(jobs::end_time.is_null()),
        )
        .set(&changeset)
        .execute(&mut conn)
        .await
        .map_err(diesel_error("complete job"))?;
        if updated > 0 {
            return Ok(CompletionOutcome::Completed);
        }

        let exists: bool = diesel::select(diesel::dsl::exists(
            jobs::table
                .filter(jobs::id.eq(id))
                .filter(jobs::driver_steam_id.eq(steam_id)),
        ))
        .get_result(&mut conn)
        .await
        .map_err(diesel_error("check finished job"))?;
        Ok(if exists {
            CompletionOutcome::AlreadyFinished
        } else {
            CompletionOutcome::NotFound
        })
    }

    async fn find_owner(&self, id: JobId) -> Result<Option<JobOwner>, JobPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: Option<(Option<i64>, String)> = jobs::table
            .find(id.as_i64())
            .select((jobs::user_id, jobs::driver_steam_id))
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error("find job owner"))?;
        row.map(|(user_id, driver_steam_id)| {
            let user_id = user_id
                .map(UserId::new)
                .transpose()
                .map_err(|err| JobPersistenceError::query(format!("job {id}: {err}")))?;
            Ok(JobOwner {
                user_id,
                driver_steam_id,
            })
        })
        .transpose()
    }

    async fn exists_for_driver(
        &self,
        id: JobId,
        steam_id: &SteamId,
    ) -> Result<bool, JobPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::select(diesel::dsl::exists(
            jobs::table
                .filter(jobs::id.eq(id.as_i64()))
                .filter(jobs::driver_steam_id.eq(steam_id.as_str())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(diesel_error("check job driver"))
    }

    async fn completion_notice(
        &self,
        id: JobId,
    ) -> Result<Option<JobCompletionNotice>, JobPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: Option<(JobNoticeRow, Option<String>, Option<String>)> = jobs::table
            .left_join(users::table.on(users::steam_id.eq(jobs::driver_steam_id.nullable())))
            .filter(jobs::id.eq(id.as_i64()))
            .select((
                JobNoticeRow::as_select(),
                users::username.nullable(),
                users::display_name.nullable(),
            ))
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error("load completion notice"))?;

        row.map(|(job, username, display_name)| {
            let driver_name = match username {
                Some(username) => shown_name(username, display_name),
                None => job.driver_steam_id.clone(),
            };
            notice_from_row(job, driver_name)
        })
        .transpose()
    }

    async fn delete_for_driver(&self, steam_id: &SteamId) -> Result<usize, JobPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::delete(jobs::table.filter(jobs::driver_steam_id.eq(steam_id.as_str())))
            .execute(&mut conn)
            .await
            .map_err(diesel_error("delete driver jobs"))
    }
}
