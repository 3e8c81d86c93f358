//! Ancillary events attached to a job: tolls, fines and transports.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::job::JobId;
use super::user::SteamId;

/// Longest game label stored with a fine.
pub const FINE_GAME_MAX: usize = 100;
/// Longest offence text stored with a fine.
pub const FINE_OFFENCE_MAX: usize = 255;

/// Truncate `value` to at most `max` characters.
#[must_use]
pub fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

/// A toll gate payment reported by the tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct TollReport {
    /// Job the toll belongs to.
    pub job_id: JobId,
    /// Claimed driver.
    pub steam_id: SteamId,
    /// Game label.
    pub game: String,
    /// Amount paid.
    pub amount: f64,
}

/// A fine reported by the tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct FineReport {
    /// Job the fine belongs to.
    pub job_id: JobId,
    /// Claimed driver.
    pub steam_id: SteamId,
    /// Game label, at most [`FINE_GAME_MAX`] characters.
    pub game: String,
    /// Amount paid.
    pub amount: f64,
    /// Offence text, at most [`FINE_OFFENCE_MAX`] characters.
    pub offence: String,
}

impl FineReport {
    /// Build a report, truncating free-text fields to their column widths.
    #[must_use]
    pub fn new(job_id: JobId, steam_id: SteamId, game: &str, amount: f64, offence: &str) -> Self {
        Self {
            job_id,
            steam_id,
            game: truncate_chars(game, FINE_GAME_MAX),
            amount,
            offence: truncate_chars(offence, FINE_OFFENCE_MAX),
        }
    }
}

/// Mode of a transport leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportType {
    /// Ferry crossing.
    Ferry,
    /// Train (Eurotunnel and similar).
    Train,
}

/// Raised for an unsupported transport type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("transport type must be ferry or train, got {0}")]
pub struct UnknownTransportType(pub String);

impl TransportType {
    /// Storage representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ferry => "ferry",
            Self::Train => "train",
        }
    }
}

impl FromStr for TransportType {
    type Err = UnknownTransportType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ferry" => Ok(Self::Ferry),
            "train" => Ok(Self::Train),
            _ => Err(UnknownTransportType(s.to_owned())),
        }
    }
}

impl fmt::Display for TransportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A ferry or train leg reported by the tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportReport {
    /// Job the transport belongs to.
    pub job_id: JobId,
    /// Driver that must own the job.
    pub steam_id: SteamId,
    /// Mode.
    pub transport_type: TransportType,
    /// Departure terminal.
    pub source: String,
    /// Arrival terminal.
    pub destination: String,
    /// Game label.
    pub game: String,
    /// Ticket price.
    pub amount: f64,
}
