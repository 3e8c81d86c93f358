//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. When migrations
//! change, regenerate with `diesel print-schema` or update by hand.

diesel::table! {
    /// Registered drivers and administrators.
    users (id) {
        id -> Int8,
        username -> Varchar,
        display_name -> Nullable<Varchar>,
        steam_id -> Nullable<Varchar>,
        email -> Nullable<Varchar>,
        password_hash -> Nullable<Text>,
        avatar_url -> Text,
        bio -> Nullable<Text>,
        wot_text -> Nullable<Text>,
        truckersmp_text -> Nullable<Text>,
        is_admin -> Bool,
        /// `active` or `paused`.
        account_status -> Varchar,
        /// Bearer credential for the machine API.
        auth_token -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Deliveries reported by the game client.
    ///
    /// Completion columns stay `NULL` until `end_time` is set.
    jobs (id) {
        id -> Int8,
        user_id -> Nullable<Int8>,
        driver_steam_id -> Varchar,
        game -> Varchar,
        truck -> Varchar,
        cargo -> Varchar,
        source_city -> Varchar,
        source_company -> Varchar,
        destination_city -> Varchar,
        destination_company -> Varchar,
        planned_distance_km -> Float8,
        truck_license_plate -> Varchar,
        truck_license_plate_country -> Varchar,
        truck_plate_code -> Varchar,
        truck_plate_country_id -> Varchar,
        trailer_license_plate -> Varchar,
        trailer_license_plate_country -> Varchar,
        trailer_plate_code -> Varchar,
        trailer_plate_country_id -> Varchar,
        trailer_body_type -> Nullable<Varchar>,
        status -> Varchar,
        start_time -> Timestamptz,
        end_time -> Nullable<Timestamptz>,
        driven_distance_km -> Nullable<Float8>,
        income -> Nullable<Int8>,
        market -> Nullable<Varchar>,
        wear_truck_cabin -> Nullable<Float8>,
        wear_truck_chassis -> Nullable<Float8>,
        wear_truck_transmission -> Nullable<Float8>,
        wear_truck_wheels -> Nullable<Float8>,
        wear_truck_engine -> Nullable<Float8>,
        wear_trailer_chassis -> Nullable<Float8>,
        wear_trailer_wheels -> Nullable<Float8>,
        wear_trailer_body -> Nullable<Float8>,
        cargo_damage -> Nullable<Float8>,
        cargo_mass -> Nullable<Float8>,
        max_speed -> Nullable<Float8>,
        xp -> Nullable<Int8>,
        auto_park_used -> Nullable<Bool>,
        auto_load_used -> Nullable<Bool>,
        used_diesel -> Nullable<Float8>,
    }
}

diesel::table! {
    /// Ferry and train crossings during a job.
    job_transports (id) {
        id -> Int8,
        job_id -> Int8,
        transport_type -> Varchar,
        source_name -> Varchar,
        destination_name -> Varchar,
        amount -> Float8,
        game -> Varchar,
        driver_steam_id -> Varchar,
        #[sql_name = "timestamp"]
        recorded_at -> Timestamptz,
    }
}

diesel::table! {
    tolls (id) {
        id -> Int8,
        job_id -> Int8,
        user_id -> Int8,
        game -> Varchar,
        amount -> Float8,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    penalties (id) {
        id -> Int8,
        job_id -> Int8,
        user_id -> Int8,
        game -> Varchar,
        amount -> Float8,
        offence -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Virtual trucking companies.
    vtcs (id) {
        id -> Int8,
        name -> Varchar,
        tag -> Varchar,
        description -> Nullable<Text>,
        owner_user_id -> Int8,
        status -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    vtc_members (vtc_id, user_id) {
        vtc_id -> Int8,
        user_id -> Int8,
        role -> Varchar,
        status -> Varchar,
        joined_at -> Timestamptz,
        left_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Key/value site flags such as `registration_open`.
    site_settings (key) {
        key -> Varchar,
        value -> Text,
    }
}

diesel::table! {
    /// Tracker install tokens claimed by the desktop client.
    core_tokens (token) {
        token -> Varchar,
        user_id -> Int8,
        tracker_id -> Nullable<Varchar>,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(job_transports -> jobs (job_id));
diesel::joinable!(vtc_members -> vtcs (vtc_id));
diesel::joinable!(vtc_members -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    jobs,
    job_transports,
    tolls,
    penalties,
    vtcs,
    vtc_members,
    site_settings,
    core_tokens,
);
