//! Job completion notices and the text formatting shared by notifiers.

use serde::Serialize;

use super::job::{JobId, JobStatus};

/// Everything a notifier needs to announce a finished job.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobCompletionNotice {
    /// Finished job.
    pub job_id: JobId,
    /// Status reported by the client.
    pub status: JobStatus,
    /// Driver name shown as the message author.
    pub driver_name: String,
    /// Game code.
    pub game: String,
    /// Cargo name.
    pub cargo: String,
    /// Cargo mass in kilograms.
    pub cargo_mass_kg: f64,
    /// Cargo damage percentage.
    pub cargo_damage: f64,
    /// Experience awarded.
    pub xp: i64,
    /// Distance driven.
    pub driven_km: f64,
    /// Wall-clock time between start and finish.
    pub duration_seconds: i64,
    /// Income.
    pub income: i64,
    /// Mean truck wear fraction.
    pub truck_wear_average: f64,
    /// Mean trailer wear fraction.
    pub trailer_wear_average: f64,
    /// Origin city.
    pub source_city: String,
    /// Origin company.
    pub source_company: String,
    /// Destination city.
    pub destination_city: String,
    /// Destination company.
    pub destination_company: String,
    /// Truck.
    pub truck: String,
    /// Truck plate code.
    pub truck_plate_code: String,
    /// Truck plate text.
    pub truck_license_plate: String,
    /// Trailer body type, when reported.
    pub trailer_body_type: Option<String>,
    /// Trailer plate code.
    pub trailer_plate_code: String,
    /// Trailer plate text.
    pub trailer_license_plate: String,
}

/// Format elapsed seconds as `mm:ss` below one hour, else `HH:MM:SS`.
///
/// # Examples
/// ```
/// use mytrucktracker::domain::format_duration;
///
/// assert_eq!(format_duration(754), "12:34");
/// assert_eq!(format_duration(3_723), "01:02:03");
/// ```
#[must_use]
pub fn format_duration(total_seconds: i64) -> String {
    let total = total_seconds.max(0);
    let hours = total / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;
    if total < 3_600 {
        format!("{minutes:02}:{seconds:02}")
    } else {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    }
}

/// Full game title for a game code.
#[must_use]
pub fn translate_game(game: &str) -> &str {
    match game {
        "eut2" => "Euro Truck Simulator 2",
        "ats" => "American Truck Simulator",
        other => other,
    }
}

/// Human label for a trailer body type.
#[must_use]
pub fn translate_trailer_body(body: Option<&str>) -> String {
    match body {
        Some("flatbed") => "Flatbed".to_owned(),
        Some("container") => "Container".to_owned(),
        Some("curtainsider") => "Curtainsider".to_owned(),
        Some(other) => format!("{other}_def"),
        None => "Unknown".to_owned(),
    }
}

/// Upper-case the first character.
#[must_use]
pub fn capitalise_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Round to `decimals` places and drop trailing zeros (`12.50` → `12.5`).
#[must_use]
pub fn format_compact(value: f64, decimals: usize) -> String {
    let fixed = format!("{value:.decimals$}");
    if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.').to_owned()
    } else {
        fixed
    }
}

/// Format with `,` thousands separators and exactly `decimals` places.
///
/// # Examples
/// ```
/// use mytrucktracker::domain::format_grouped;
///
/// assert_eq!(format_grouped(1_234_567.0, 0), "1,234,567");
/// assert_eq!(format_grouped(12.346, 2), "12.35");
/// ```
#[must_use]
pub fn format_grouped(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.decimals$}", value.abs());
    let (integer, fraction) = match fixed.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (fixed.as_str(), None),
    };
    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if value < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    match fraction {
        Some(fraction) => format!("{sign}{grouped}.{fraction}"),
        None => format!("{sign}{grouped}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, "00:00")]
    #[case(59, "00:59")]
    #[case(3_599, "59:59")]
    #[case(3_600, "01:00:00")]
    #[case(90_061, "25:01:01")]
    #[case(-5, "00:00")]
    fn durations(#[case] seconds: i64, #[case] expected: &str) {
        assert_eq!(format_duration(seconds), expected);
    }

    #[rstest]
    #[case("eut2", "Euro Truck Simulator 2")]
    #[case("ats", "American Truck Simulator")]
    #[case("other", "other")]
    fn games(#[case] code: &str, #[case] expected: &str) {
        assert_eq!(translate_game(code), expected);
    }

    #[rstest]
    #[case(Some("flatbed"), "Flatbed")]
    #[case(Some("container"), "Container")]
    #[case(Some("curtainsider"), "Curtainsider")]
    #[case(Some("tanker"), "tanker_def")]
    #[case(None, "Unknown")]
    fn trailer_bodies(#[case] body: Option<&str>, #[case] expected: &str) {
        assert_eq!(translate_trailer_body(body), expected);
    }

    #[rstest]
    #[case(1_234_567.0, 0, "1,234,567")]
    #[case(999.0, 0, "999")]
    #[case(1_000.0, 0, "1,000")]
    #[case(12.346, 2, "12.35")]
    #[case(0.0, 2, "0.00")]
    #[case(-4_500.5, 1, "-4,500.5")]
    fn grouping(#[case] value: f64, #[case] decimals: usize, #[case] expected: &str) {
        assert_eq!(format_grouped(value, decimals), expected);
    }

    #[rstest]
    #[case(12.5, 2, "12.5")]
    #[case(100.0, 2, "100")]
    #[case(1.005_9, 2, "1.01")]
    fn compact(#[case] value: f64, #[case] decimals: usize, #[case] expected: &str) {
        assert_eq!(format_compact(value, decimals), expected);
    }

    #[rstest]
    #[case("delivered", "Delivered")]
    #[case("", "")]
    fn capitalises(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(capitalise_first(raw), expected);
    }
}
