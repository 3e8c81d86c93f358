//! Country id to international vehicle registration code lookup.

/// Code used when the country id is not recognised.
pub const UNKNOWN_PLATE_CODE: &str = "??";

/// Map an in-game country id to its vehicle registration code.
///
/// Matching is case-insensitive; unknown countries map to `??`.
///
/// # Examples
/// ```
/// use mytrucktracker::domain::license_plate_code;
///
/// assert_eq!(license_plate_code("germany"), "D");
/// assert_eq!(license_plate_code("Germany"), "D");
/// assert_eq!(license_plate_code("unknown_country"), "??");
/// ```
#[must_use]
pub fn license_plate_code(country_id: &str) -> &'static str {
    match country_id.trim().to_lowercase().as_str() {
        // Base game
        "austria" => "A",
        "belgium" => "B",
        "czech" => "CZ",
        "france" => "F",
        "germany" => "D",
        "hungary" => "H",
        "italy" => "I",
        "luxembourg" => "L",
        "netherlands" => "NL",
        "poland" => "PL",
        "slovakia" => "SK",
        "switzerland" => "CH",
        "uk" => "GB",
        // Baltic and Nordic maps
        "estonia" => "EST",
        "latvia" => "LV",
        "lithuania" => "LT",
        "denmark" => "DK",
        "norway" => "N",
        "sweden" => "S",
        "finland" => "FIN",
        "russia" => "RUS",
        // Black Sea
        "bulgaria" => "BG",
        "romania" => "RO",
        "turkey" | "turkiye" => "TR",
        // Iberia
        "spain" => "E",
        "portugal" => "P",
        // West Balkans
        "albania" => "AL",
        "bosnia" => "BIH",
        "croatia" => "HR",
        "kosovo" => "RKS",
        "montenegro" => "MNE",
        "north_macedonia" => "NMK",
        "serbia" => "SRB",
        "slovenia" => "SLO",
        _ => UNKNOWN_PLATE_CODE,
    }
}
