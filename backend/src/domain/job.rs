//! Delivery jobs reported by the tracker client.
//!
//! A job is opened by the start report and closed once by the finish report.
//! Completion values stay unset until then.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use super::license_plate::license_plate_code;
use super::user::{SteamId, UserId};

/// Database identifier of a job row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct JobId(i64);

/// Raised when a job id is not a positive integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("job id must be a positive integer")]
pub struct InvalidJobId;

impl JobId {
    /// Validate a raw identifier.
    pub fn new(raw: i64) -> Result<Self, InvalidJobId> {
        if raw <= 0 {
            return Err(InvalidJobId);
        }
        Ok(Self(raw))
    }

    /// Raw database key.
    #[must_use]
    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status column of a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    /// Opened by the start report.
    Started,
    /// Cargo delivered.
    Delivered,
    /// Job abandoned in game.
    Cancelled,
    /// Any other status the client reports.
    Other(String),
}

impl JobStatus {
    /// Parse a status as reported by the client or stored in the database.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "started" => Self::Started,
            "delivered" => Self::Delivered,
            "cancelled" | "canceled" => Self::Cancelled,
            _ => Self::Other(trimmed.to_owned()),
        }
    }

    /// Storage representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Started => "Started",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Other(raw) => raw.as_str(),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for JobStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A vehicle plate with its country.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicensePlate {
    /// Plate text.
    pub number: String,
    /// Country name as shown in game.
    pub country: String,
    /// Raw country id from the game data.
    pub country_id: String,
}

impl LicensePlate {
    /// International vehicle code derived from the country id.
    #[must_use]
    pub fn country_code(&self) -> &'static str {
        license_plate_code(&self.country_id)
    }
}

/// Values reported when a job starts.
#[derive(Debug, Clone, PartialEq)]
pub struct NewJob {
    /// Game code (`eut2`, `ats`).
    pub game: String,
    /// Driver reporting the job.
    pub driver_steam_id: SteamId,
    /// Truck make and model.
    pub truck: String,
    /// Cargo name.
    pub cargo: String,
    /// Origin city.
    pub source_city: String,
    /// Origin company.
    pub source_company: String,
    /// Destination city.
    pub destination_city: String,
    /// Destination company.
    pub destination_company: String,
    /// Route length planned by the game.
    pub planned_distance_km: f64,
    /// Truck plate.
    pub truck_plate: LicensePlate,
    /// Trailer plate.
    pub trailer_plate: LicensePlate,
    /// Trailer body type, when known.
    pub trailer_body_type: Option<String>,
}

/// Wear of the five truck components, as fractions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TruckWear {
    /// Cabin.
    pub cabin: f64,
    /// Chassis.
    pub chassis: f64,
    /// Transmission.
    pub transmission: f64,
    /// Wheels.
    pub wheels: f64,
    /// Engine.
    pub engine: f64,
}

impl TruckWear {
    /// Arithmetic mean of the five components.
    #[must_use]
    pub fn average(&self) -> f64 {
        (self.cabin + self.chassis + self.transmission + self.wheels + self.engine) / 5.0
    }
}

/// Wear of the three trailer components, as fractions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailerWear {
    /// Chassis.
    pub chassis: f64,
    /// Wheels.
    pub wheels: f64,
    /// Body.
    pub body: f64,
}

impl TrailerWear {
    /// Arithmetic mean of the three components.
    #[must_use]
    pub fn average(&self) -> f64 {
        (self.chassis + self.wheels + self.body) / 3.0
    }
}

/// Telemetry reported when a job finishes.
#[derive(Debug, Clone, PartialEq)]
pub struct JobCompletion {
    /// Job being closed.
    pub job_id: JobId,
    /// Driver that must own the job.
    pub steam_id: SteamId,
    /// Final status.
    pub status: JobStatus,
    /// Distance actually driven.
    pub driven_km: f64,
    /// Job market (freight market, cargo market, ...).
    pub market: String,
    /// Income in game currency.
    pub income: i64,
    /// Truck wear.
    pub truck_wear: TruckWear,
    /// Trailer wear.
    pub trailer_wear: TrailerWear,
    /// Cargo damage percentage.
    pub cargo_damage: f64,
    /// Cargo mass in kilograms.
    pub cargo_mass: f64,
    /// Top speed during the job.
    pub max_speed: f64,
    /// Experience awarded.
    pub xp: i64,
    /// Whether auto-load was used.
    pub auto_load: bool,
    /// Whether auto-park was used.
    pub auto_park: bool,
    /// Fuel used.
    pub used_diesel: f64,
}

/// Result of applying a completion report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The job was open and is now closed.
    Completed,
    /// The job had already been closed; nothing changed.
    AlreadyFinished,
    /// No job matches `(id, steam id)`.
    NotFound,
}

/// Ownership columns of a job, used to authorise event writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOwner {
    /// Owning user when the job row links one.
    pub user_id: Option<UserId>,
    /// Steam id that reported the job.
    pub driver_steam_id: String,
}

impl JobOwner {
    /// Whether the job belongs to `user_id` / `steam_id`.
    ///
    /// A linked user id wins; otherwise the reporting Steam id must match.
    #[must_use]
    pub fn is_owned_by(&self, user_id: UserId, steam_id: &SteamId) -> bool {
        match self.user_id {
            Some(owner) => owner == user_id,
            None => self.driver_steam_id == steam_id.as_str(),
        }
    }
}

/// Full job row as shown on pages.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Primary key.
    pub id: JobId,
    /// Game code.
    pub game: String,
    /// Reporting driver.
    pub driver_steam_id: String,
    /// Truck.
    pub truck: String,
    /// Cargo.
    pub cargo: String,
    /// Origin city.
    pub source_city: String,
    /// Origin company.
    pub source_company: String,
    /// Destination city.
    pub destination_city: String,
    /// Destination company.
    pub destination_company: String,
    /// Planned distance.
    pub planned_distance_km: f64,
    /// Status.
    pub status: JobStatus,
    /// Start timestamp.
    pub start_time: DateTime<Utc>,
    /// End timestamp once finished.
    pub end_time: Option<DateTime<Utc>>,
    /// Driven distance once finished.
    pub driven_distance_km: Option<f64>,
    /// Income once finished.
    pub income: Option<i64>,
    /// Experience once finished.
    pub xp: Option<i64>,
    /// Cargo mass in kilograms.
    pub cargo_mass: Option<f64>,
    /// Cargo damage percentage.
    pub cargo_damage: Option<f64>,
    /// Top speed.
    pub max_speed: Option<f64>,
    /// Truck plate text.
    pub truck_license_plate: String,
    /// Truck plate code.
    pub truck_plate_code: String,
    /// Trailer plate text.
    pub trailer_license_plate: String,
    /// Trailer plate code.
    pub trailer_plate_code: String,
}
