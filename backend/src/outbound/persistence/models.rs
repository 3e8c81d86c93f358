//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions into domain types return
//! `Result<_, String>` so callers can fold bad rows into their query error.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::{
    AccountStatus, Job, JobId, JobStatus, JobSummary, SteamId, TransportType, User, UserId, VtcId,
    VtcRole, VtcSummary,
};

use super::schema::{
    core_tokens, job_transports, jobs, penalties, tolls, users, vtc_members, vtcs,
};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Row struct for reading from the users table.
///
/// Secrets (`password_hash`, `auth_token`) are selected separately.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub username: String,
    pub display_name: Option<String>,
    pub steam_id: Option<String>,
    pub email: Option<String>,
    pub avatar_url: String,
    pub bio: Option<String>,
    pub wot_text: Option<String>,
    pub truckersmp_text: Option<String>,
    pub is_admin: bool,
    pub account_status: String,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    pub(crate) fn into_domain(self) -> Result<User, String> {
        let id = UserId::new(self.id).map_err(|err| format!("user {}: {err}", self.id))?;
        let steam_id = self
            .steam_id
            .map(SteamId::new)
            .transpose()
            .map_err(|err| format!("user {id}: {err}"))?;
        let account_status = self
            .account_status
            .parse::<AccountStatus>()
            .map_err(|err| format!("user {id}: {err}"))?;
        Ok(User {
            id,
            username: self.username,
            display_name: self.display_name,
            steam_id,
            email: self.email,
            avatar_url: self.avatar_url,
            bio: self.bio,
            wot_text: self.wot_text,
            truckersmp_text: self.truckersmp_text,
            is_admin: self.is_admin,
            account_status,
            created_at: self.created_at,
        })
    }
}

/// Insertable struct for Steam and local registrations.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub username: &'a str,
    pub display_name: Option<&'a str>,
    pub steam_id: Option<&'a str>,
    pub email: Option<&'a str>,
    pub password_hash: Option<&'a str>,
    pub avatar_url: &'a str,
    pub is_admin: bool,
    pub account_status: &'a str,
}

/// Profile edits; `None` clears the column.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users, treat_none_as_null = true)]
pub(crate) struct ProfileChangeset<'a> {
    pub display_name: Option<&'a str>,
    pub bio: Option<&'a str>,
    pub wot_text: Option<&'a str>,
    pub truckersmp_text: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Jobs
// ---------------------------------------------------------------------------

/// Insertable struct for `start_job`.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = jobs)]
pub(crate) struct NewJobRow<'a> {
    pub driver_steam_id: &'a str,
    pub game: &'a str,
    pub truck: &'a str,
    pub cargo: &'a str,
    pub source_city: &'a str,
    pub source_company: &'a str,
    pub destination_city: &'a str,
    pub destination_company: &'a str,
    pub planned_distance_km: f64,
    pub truck_license_plate: &'a str,
    pub truck_license_plate_country: &'a str,
    pub truck_plate_code: &'a str,
    pub truck_plate_country_id: &'a str,
    pub trailer_license_plate: &'a str,
    pub trailer_license_plate_country: &'a str,
    pub trailer_plate_code: &'a str,
    pub trailer_plate_country_id: &'a str,
    pub trailer_body_type: Option<&'a str>,
    pub status: &'a str,
    pub start_time: DateTime<Utc>,
}

/// Changeset applied once by `finish_job`.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = jobs)]
pub(crate) struct JobCompletionChangeset<'a> {
    pub status: &'a str,
    pub end_time: DateTime<Utc>,
    pub driven_distance_km: f64,
    pub income: i64,
    pub market: &'a str,
    pub wear_truck_cabin: f64,
    pub wear_truck_chassis: f64,
    pub wear_truck_transmission: f64,
    pub wear_truck_wheels: f64,
    pub wear_truck_engine: f64,
    pub wear_trailer_chassis: f64,
    pub wear_trailer_wheels: f64,
    pub wear_trailer_body: f64,
    pub cargo_damage: f64,
    pub cargo_mass: f64,
    pub max_speed: f64,
    pub xp: i64,
    pub auto_park_used: bool,
    pub auto_load_used: bool,
    pub used_diesel: f64,
}

/// Row struct for job pages.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = jobs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct JobRow {
    pub id: i64,
    pub game: String,
    pub driver_steam_id: String,
    pub truck: String,
    pub cargo: String,
    pub source_city: String,
    pub source_company: String,
    pub destination_city: String,
    pub destination_company: String,
    pub planned_distance_km: f64,
    pub status: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub driven_distance_km: Option<f64>,
    pub income: Option<i64>,
    pub xp: Option<i64>,
    pub cargo_mass: Option<f64>,
    pub cargo_damage: Option<f64>,
    pub max_speed: Option<f64>,
    pub truck_license_plate: String,
    pub truck_plate_code: String,
    pub trailer_license_plate: String,
    pub trailer_plate_code: String,
}

impl JobRow {
    pub(crate) fn into_domain(self) -> Result<Job, String> {
        let id = JobId::new(self.id).map_err(|err| format!("job {}: {err}", self.id))?;
        Ok(Job {
            id,
            game: self.game,
            driver_steam_id: self.driver_steam_id,
            truck: self.truck,
            cargo: self.cargo,
            source_city: self.source_city,
            source_company: self.source_company,
            destination_city: self.destination_city,
            destination_company: self.destination_company,
            planned_distance_km: self.planned_distance_km,
            status: JobStatus::parse(&self.status),
            start_time: self.start_time,
            end_time: self.end_time,
            driven_distance_km: self.driven_distance_km,
            income: self.income,
            xp: self.xp,
            cargo_mass: self.cargo_mass,
            cargo_damage: self.cargo_damage,
            max_speed: self.max_speed,
            truck_license_plate: self.truck_license_plate,
            truck_plate_code: self.truck_plate_code,
            trailer_license_plate: self.trailer_license_plate,
            trailer_plate_code: self.trailer_plate_code,
        })
    }
}

/// Row struct for job lists.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = jobs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct JobSummaryRow {
    pub id: i64,
    pub driver_steam_id: String,
    pub game: String,
    pub cargo: String,
    pub source_city: String,
    pub destination_city: String,
    pub status: String,
    pub driven_distance_km: Option<f64>,
    pub income: Option<i64>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

impl JobSummaryRow {
    pub(crate) fn into_domain(self, driver_name: Option<String>) -> Result<JobSummary, String> {
        let id = JobId::new(self.id).map_err(|err| format!("job {}: {err}", self.id))?;
        Ok(JobSummary {
            id,
            driver_name,
            driver_steam_id: self.driver_steam_id,
            game: self.game,
            cargo: self.cargo,
            source_city: self.source_city,
            destination_city: self.destination_city,
            status: JobStatus::parse(&self.status),
            driven_distance_km: self.driven_distance_km,
            income: self.income,
            start_time: self.start_time,
            end_time: self.end_time,
        })
    }
}

/// Columns needed to announce a finished job.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = jobs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct JobNoticeRow {
    pub id: i64,
    pub driver_steam_id: String,
    pub game: String,
    pub truck: String,
    pub cargo: String,
    pub source_city: String,
    pub source_company: String,
    pub destination_city: String,
    pub destination_company: String,
    pub truck_license_plate: String,
    pub truck_plate_code: String,
    pub trailer_license_plate: String,
    pub trailer_plate_code: String,
    pub trailer_body_type: Option<String>,
    pub status: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub driven_distance_km: Option<f64>,
    pub income: Option<i64>,
    pub wear_truck_cabin: Option<f64>,
    pub wear_truck_chassis: Option<f64>,
    pub wear_truck_transmission: Option<f64>,
    pub wear_truck_wheels: Option<f64>,
    pub wear_truck_engine: Option<f64>,
    pub wear_trailer_chassis: Option<f64>,
    pub wear_trailer_wheels: Option<f64>,
    pub wear_trailer_body: Option<f64>,
    pub cargo_damage: Option<f64>,
    pub cargo_mass: Option<f64>,
    pub xp: Option<i64>,
}

// ---------------------------------------------------------------------------
// Job events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tolls)]
pub(crate) struct NewTollRow<'a> {
    pub job_id: i64,
    pub user_id: i64,
    pub game: &'a str,
    pub amount: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = penalties)]
pub(crate) struct NewPenaltyRow<'a> {
    pub job_id: i64,
    pub user_id: i64,
    pub game: &'a str,
    pub amount: f64,
    pub offence: &'a str,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = job_transports)]
pub(crate) struct NewTransportRow<'a> {
    pub job_id: i64,
    pub transport_type: &'a str,
    pub source_name: &'a str,
    pub destination_name: &'a str,
    pub amount: f64,
    pub game: &'a str,
    pub driver_steam_id: &'a str,
    pub recorded_at: DateTime<Utc>,
}

/// Row struct for the transports listed on a job page.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = job_transports)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TransportRow {
    pub id: i64,
    pub transport_type: String,
    pub source_name: String,
    pub destination_name: String,
    pub amount: f64,
    pub game: String,
    pub recorded_at: DateTime<Utc>,
}

impl TransportRow {
    pub(crate) fn transport_type(&self) -> Result<TransportType, String> {
        self.transport_type
            .parse()
            .map_err(|err| format!("transport {}: {err}", self.id))
    }
}

// ---------------------------------------------------------------------------
// Install tokens
// ---------------------------------------------------------------------------

/// Row struct for a locked `core_tokens` entry.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = core_tokens)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct InstallTokenRow {
    pub user_id: i64,
    pub tracker_id: Option<String>,
}

// ---------------------------------------------------------------------------
// VTCs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = vtcs)]
pub(crate) struct NewVtcRow<'a> {
    pub name: &'a str,
    pub tag: &'a str,
    pub description: Option<&'a str>,
    pub owner_user_id: i64,
    pub status: &'a str,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = vtc_members)]
pub(crate) struct NewVtcMemberRow<'a> {
    pub vtc_id: i64,
    pub user_id: i64,
    pub role: &'a str,
    pub status: &'a str,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = vtcs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct VtcRow {
    pub id: i64,
    pub name: String,
    pub tag: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl VtcRow {
    pub(crate) fn into_summary(self, owner_name: String, member_count: i64) -> Result<VtcSummary, String> {
        let id = VtcId::new(self.id).map_err(|err| format!("vtc {}: {err}", self.id))?;
        Ok(VtcSummary {
            id,
            name: self.name,
            tag: self.tag,
            description: self.description,
            owner_name,
            member_count,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = vtc_members)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct VtcMemberRow {
    pub user_id: i64,
    pub role: String,
    pub joined_at: DateTime<Utc>,
}

impl VtcMemberRow {
    pub(crate) fn role(&self) -> Result<VtcRole, String> {
        self.role
            .parse()
            .map_err(|err| format!("member {}: {err}", self.user_id))
    }
}

/// Name shown for a user: the display name unless blank, else the username.
pub(crate) fn shown_name(username: String, display_name: Option<String>) -> String {
    display_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(username)
}
