//! Shared builders for domain service tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use super::{
    AccountStatus, JobCompletion, JobCompletionNotice, JobId, JobStatus, LicensePlate, NewJob,
    SteamId, TrailerWear, TruckWear, User, UserId,
};

pub(crate) const STEAM_ID: &str = "76561198000000000";
pub(crate) const OTHER_STEAM_ID: &str = "76561198000000001";

struct FixtureClock {
    now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.now
    }
}

pub(crate) fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 1, 18, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock { now: fixed_now() })
}

pub(crate) fn steam_id(raw: &str) -> SteamId {
    SteamId::new(raw).expect("fixture steam id")
}

pub(crate) fn user_id(raw: i64) -> UserId {
    UserId::new(raw).expect("fixture user id")
}

pub(crate) fn job_id(raw: i64) -> JobId {
    JobId::new(raw).expect("fixture job id")
}

pub(crate) fn user(id: i64, steam: Option<&str>) -> User {
    User {
        id: user_id(id),
        username: format!("driver{id}"),
        display_name: None,
        steam_id: steam.map(steam_id),
        email: None,
        avatar_url: "/assets/default-avatar.svg".to_owned(),
        bio: None,
        wot_text: None,
        truckersmp_text: None,
        is_admin: false,
        account_status: AccountStatus::Active,
        created_at: fixed_now(),
    }
}

pub(crate) fn new_job() -> NewJob {
    NewJob {
        game: "eut2".to_owned(),
        driver_steam_id: steam_id(STEAM_ID),
        truck: "Scania R".to_owned(),
        cargo: "Apples".to_owned(),
        source_city: "Berlin".to_owned(),
        source_company: "Posped".to_owned(),
        destination_city: "Praha".to_owned(),
        destination_company: "Tradeaux".to_owned(),
        planned_distance_km: 350.0,
        truck_plate: LicensePlate {
            number: "B AB 123".to_owned(),
            country: "Germany".to_owned(),
            country_id: "germany".to_owned(),
        },
        trailer_plate: LicensePlate {
            number: "1A2 3456".to_owned(),
            country: "Czech Republic".to_owned(),
            country_id: "czech".to_owned(),
        },
        trailer_body_type: Some("curtainsider".to_owned()),
    }
}

pub(crate) fn completion(job: i64) -> JobCompletion {
    JobCompletion {
        job_id: job_id(job),
        steam_id: steam_id(STEAM_ID),
        status: JobStatus::Delivered,
        driven_km: 352.4,
        market: "freight_market".to_owned(),
        income: 12_345,
        truck_wear: TruckWear {
            cabin: 0.01,
            chassis: 0.02,
            transmission: 0.0,
            wheels: 0.03,
            engine: 0.04,
        },
        trailer_wear: TrailerWear {
            chassis: 0.01,
            wheels: 0.01,
            body: 0.01,
        },
        cargo_damage: 0.5,
        cargo_mass: 18_000.0,
        max_speed: 90.0,
        xp: 640,
        auto_load: false,
        auto_park: true,
        used_diesel: 120.0,
    }
}

pub(crate) fn completion_notice(job: i64) -> JobCompletionNotice {
    JobCompletionNotice {
        job_id: job_id(job),
        status: JobStatus::Delivered,
        driver_name: "driver1".to_owned(),
        game: "eut2".to_owned(),
        cargo: "Apples".to_owned(),
        cargo_mass_kg: 18_000.0,
        cargo_damage: 0.5,
        xp: 640,
        driven_km: 352.4,
        duration_seconds: 2_400,
        income: 12_345,
        truck_wear_average: 0.02,
        trailer_wear_average: 0.01,
        source_city: "Berlin".to_owned(),
        source_company: "Posped".to_owned(),
        destination_city: "Praha".to_owned(),
        destination_company: "Tradeaux".to_owned(),
        truck: "Scania R".to_owned(),
        truck_plate_code: "D".to_owned(),
        truck_license_plate: "B AB 123".to_owned(),
        trailer_body_type: Some("curtainsider".to_owned()),
        trailer_plate_code: "CZ".to_owned(),
        trailer_license_plate: "1A2 3456".to_owned(),
    }
}
