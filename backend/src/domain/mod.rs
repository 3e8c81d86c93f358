//! Domain primitives, aggregates and services.
//!
//! Purpose: Define strongly typed domain entities used by the API and
//! persistence layers, and the services implementing the driving ports.
//! Keep types immutable and document invariants and serialisation contracts
//! (serde) in each type's Rustdoc.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - User (alias to `user::User`): registered driver or administrator.
//! - Job types (`job`, `job_events`): what the game client reports.
//! - Read models (`reports`): what pages render.

pub mod auth;
pub mod csrf;
pub mod error;
pub mod job;
pub mod job_events;
pub mod license_plate;
pub mod notification;
pub mod ports;
pub mod reports;
pub mod site;
pub mod trace_id;
pub mod tracker_install;
pub mod user;
pub mod vtc;

mod account_service;
mod job_ingestion_service;
mod profile_service;
mod site_admin_service;
mod tracker_install_service;
mod vtc_service;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use self::account_service::AccountService;
pub use self::auth::{
    AuthScheme, CredentialsValidationError, LoginCredentials, PASSWORD_MIN, Registration,
};
pub use self::csrf::{CSRF_FIELD, CSRF_TOKEN_LIFETIME_SECS, CsrfError, CsrfToken};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::job::{
    CompletionOutcome, InvalidJobId, Job, JobCompletion, JobId, JobOwner, JobStatus,
    LicensePlate, NewJob, TrailerWear, TruckWear,
};
pub use self::job_events::{
    FINE_GAME_MAX, FINE_OFFENCE_MAX, FineReport, TollReport, TransportReport, TransportType,
    UnknownTransportType, truncate_chars,
};
pub use self::job_ingestion_service::JobIngestionService;
pub use self::license_plate::{UNKNOWN_PLATE_CODE, license_plate_code};
pub use self::notification::{
    JobCompletionNotice, capitalise_first, format_compact, format_duration, format_grouped,
    translate_game, translate_trailer_body,
};
pub use self::profile_service::ProfileService;
pub use self::reports::{
    Dashboard, DashboardStats, DriverDistance, DriverStats, DriverTruck, JOBS_PER_PAGE,
    JobDetail, JobListPage, JobSummary, JobTransport, LEADERBOARD_LIMIT, Leaderboards,
    PageRequest, RACE_SPEED_MIN, REALISTIC_SPEED_MAX, RECENT_JOBS, RankedName, UserProfileView,
    job_duration_seconds, total_pages,
};
pub use self::site::{
    REGISTRATION_OPEN_KEY, ResetConfirmation, ResetNotConfirmed, ResetReport, SiteOverview,
    encode_registration_flag, parse_registration_flag,
};
pub use self::site_admin_service::SiteAdminService;
pub use self::trace_id::TraceId;
pub use self::tracker_install::{
    ClaimOutcome, InstallClaim, InstallClaimValidationError, InstallToken, TrackerId,
};
pub use self::tracker_install_service::TrackerInstallService;
pub use self::user::{
    AccountStatus, ApiToken, DEFAULT_AVATAR_URL, Email, NewLocalUser, NewSteamUser,
    ProfileUpdate, SteamId, SteamProfile, User, UserId, UserValidationError,
};
pub use self::vtc::{
    MemberStatus, Membership, NewVtc, VtcDetail, VtcId, VtcMember, VtcRole, VtcSummary, VtcTag,
    VtcValidationError,
};
pub use self::vtc_service::VtcService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use mytrucktracker::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
