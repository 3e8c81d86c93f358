//! Read models behind the dashboard, job lists, profiles and leaderboards.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::job::{Job, JobId, JobStatus};
use super::job_events::TransportType;
use super::user::User;

/// Jobs per page on paged lists.
pub const JOBS_PER_PAGE: i64 = 20;
/// Jobs shown on the dashboard.
pub const RECENT_JOBS: i64 = 5;
/// Entries per leaderboard.
pub const LEADERBOARD_LIMIT: i64 = 10;
/// Highest top speed still counted as realistic driving.
pub const REALISTIC_SPEED_MAX: f64 = 100.0;
/// Lowest top speed counted as racing.
pub const RACE_SPEED_MIN: f64 = 101.0;

/// A 1-based page selection.
///
/// # Examples
/// ```
/// use mytrucktracker::domain::PageRequest;
///
/// assert_eq!(PageRequest::new(Some(-3)).page(), 1);
/// assert_eq!(PageRequest::new(Some(3)).offset(), 40);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest(i64);

impl PageRequest {
    /// Clamp a raw page number to at least one.
    #[must_use]
    pub fn new(raw: Option<i64>) -> Self {
        Self(raw.unwrap_or(1).max(1))
    }

    /// Page number.
    #[must_use]
    pub fn page(self) -> i64 {
        self.0
    }

    /// Rows to skip.
    #[must_use]
    pub fn offset(self) -> i64 {
        (self.0 - 1).saturating_mul(JOBS_PER_PAGE)
    }

    /// Rows per page.
    #[must_use]
    pub fn limit(self) -> i64 {
        JOBS_PER_PAGE
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self(1)
    }
}

/// Number of pages needed for `total` rows.
#[must_use]
pub fn total_pages(total: i64) -> i64 {
    if total <= 0 {
        return 1;
    }
    (total + JOBS_PER_PAGE - 1) / JOBS_PER_PAGE
}

/// Seconds between start and end, when the job has ended.
#[must_use]
pub fn job_duration_seconds(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Option<i64> {
    end.map(|end| (end - start).num_seconds().max(0))
}

/// One row of a job list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSummary {
    /// Job.
    pub id: JobId,
    /// Shown name of the driver, when the Steam id maps to a user.
    pub driver_name: Option<String>,
    /// Reporting Steam id.
    pub driver_steam_id: String,
    /// Game code.
    pub game: String,
    /// Cargo.
    pub cargo: String,
    /// Origin city.
    pub source_city: String,
    /// Destination city.
    pub destination_city: String,
    /// Status.
    pub status: JobStatus,
    /// Driven distance once finished.
    pub driven_distance_km: Option<f64>,
    /// Income once finished.
    pub income: Option<i64>,
    /// Start timestamp.
    pub start_time: DateTime<Utc>,
    /// End timestamp once finished.
    pub end_time: Option<DateTime<Utc>>,
}

/// Site counters shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Registered users.
    pub total_users: i64,
    /// Every job.
    pub total_jobs: i64,
    /// Delivered jobs.
    pub delivered_jobs: i64,
    /// Cancelled jobs.
    pub cancelled_jobs: i64,
}

/// Dashboard content.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    /// Counters.
    pub stats: DashboardStats,
    /// Most recent jobs, newest first.
    pub recent_jobs: Vec<JobSummary>,
}

/// One page of the global job list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListPage {
    /// Jobs on this page.
    pub jobs: Vec<JobSummary>,
    /// Current page.
    pub page: i64,
    /// Page count.
    pub total_pages: i64,
    /// Job count.
    pub total_jobs: i64,
}

/// A ferry or train crossing recorded for a job.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobTransport {
    /// Primary key.
    pub id: i64,
    /// Ferry or train.
    pub transport_type: TransportType,
    /// Departure.
    pub source_name: String,
    /// Arrival.
    pub destination_name: String,
    /// Fare.
    pub amount: f64,
    /// Game code.
    pub game: String,
    /// When the crossing was reported.
    pub timestamp: DateTime<Utc>,
}

/// Job page content.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDetail {
    /// Job row.
    pub job: Job,
    /// Shown name of the driver.
    pub driver_name: Option<String>,
    /// Seconds between start and end once finished.
    pub duration_seconds: Option<i64>,
    /// Crossings ordered by timestamp.
    pub transports: Vec<JobTransport>,
}

/// Per-driver counters on a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverStats {
    /// Every job.
    pub total_jobs: i64,
    /// Delivered jobs.
    pub delivered: i64,
    /// Cancelled jobs.
    pub cancelled: i64,
    /// Jobs with a top speed of at most [`REALISTIC_SPEED_MAX`].
    pub realistic: i64,
    /// Jobs with a top speed of at least [`RACE_SPEED_MIN`].
    pub race: i64,
}

/// Public profile content.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileView {
    /// Profile owner.
    pub user: User,
    /// Counters.
    pub stats: DriverStats,
    /// Jobs on this page.
    pub jobs: Vec<JobSummary>,
    /// Current page.
    pub page: i64,
    /// Page count.
    pub total_pages: i64,
}

/// Kilometres driven by one driver.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverDistance {
    /// Shown name, falling back to the Steam id.
    pub driver_name: String,
    /// Sum of driven distance on delivered jobs.
    pub total_km: f64,
}

/// Truck a driver used most often.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverTruck {
    /// Shown name, falling back to the Steam id.
    pub driver_name: String,
    /// Truck name.
    pub truck: String,
    /// Delivered jobs with that truck.
    pub uses: i64,
}

/// A name with how often it occurs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedName {
    /// Cargo, city or company.
    pub name: String,
    /// Delivered jobs.
    pub count: i64,
}

/// Statistics page content; every board counts delivered jobs only.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Leaderboards {
    /// Distance per driver, longest first.
    pub distance_by_driver: Vec<DriverDistance>,
    /// Favourite truck per driver.
    pub favourite_trucks: Vec<DriverTruck>,
    /// Top cargoes.
    pub top_cargo: Vec<RankedName>,
    /// Top origin cities.
    pub top_source_cities: Vec<RankedName>,
    /// Top origin companies.
    pub top_source_companies: Vec<RankedName>,
    /// Top destination cities.
    pub top_destination_cities: Vec<RankedName>,
    /// Top destination companies.
    pub top_destination_companies: Vec<RankedName>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rstest::rstest;

    #[rstest]
    #[case(None, 1, 0)]
    #[case(Some(0), 1, 0)]
    #[case(Some(-7), 1, 0)]
    #[case(Some(2), 2, 20)]
    fn page_requests_clamp(#[case] raw: Option<i64>, #[case] page: i64, #[case] offset: i64) {
        let request = PageRequest::new(raw);
        assert_eq!(request.page(), page);
        assert_eq!(request.offset(), offset);
        assert_eq!(request.limit(), JOBS_PER_PAGE);
    }

    #[rstest]
    #[case(0, 1)]
    #[case(1, 1)]
    #[case(20, 1)]
    #[case(21, 2)]
    #[case(200, 10)]
    fn page_counts(#[case] total: i64, #[case] pages: i64) {
        assert_eq!(total_pages(total), pages);
    }

    #[rstest]
    fn duration_requires_end() {
        let start = Utc
            .with_ymd_and_hms(2026, 1, 1, 8, 0, 0)
            .single()
            .expect("timestamp");
        assert_eq!(job_duration_seconds(start, None), None);
        assert_eq!(
            job_duration_seconds(start, Some(start + Duration::minutes(90))),
            Some(5_400)
        );
    }
}
