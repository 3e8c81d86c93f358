//! Contract tests for the machine API.
//!
//! Requests go through the real Actix handlers and domain services; only the
//! driven ports are replaced by the in-memory [`in_memory::Store`], so these
//! tests pin the wire behaviour the game client relies on.

#[path = "api_contract/store.rs"]
mod in_memory;

use std::sync::Arc;

use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{App, test, web};
use mockable::{Clock, DefaultClock};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use mytrucktracker::Trace;
use mytrucktracker::domain::ports::{
    FixtureReportsQuery, FixtureSteamProfileSource, NoOpJobCompletionNotifier,
};
use mytrucktracker::domain::{
    AccountService, AccountStatus, JobIngestionService, ProfileService, SiteAdminService, TRACE_ID_HEADER,
    TrackerInstallService, VtcService,
};
use mytrucktracker::inbound::http::error::json_error_handler;
use mytrucktracker::inbound::http::job_api;
use mytrucktracker::inbound::http::state::{HttpState, HttpStatePorts};
use mytrucktracker::outbound::password::Argon2PasswordHasher;
use mytrucktracker::outbound::steam::SteamOpenIdHttpVerifier;
use in_memory::Store;

const DRIVER: &str = "76561198000000000";
const OTHER_DRIVER: &str = "76561198000000001";
const TOKEN: &str = "secret-token";

#[fixture]
fn store() -> Store {
    Store::default()
}

fn http_state(store: &Store) -> web::Data<HttpState> {
    let repo = Arc::new(store.clone());
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let verifier = SteamOpenIdHttpVerifier::new().expect("reqwest client");
    let ports = HttpStatePorts {
        jobs: Arc::new(JobIngestionService::new(
            repo.clone(),
            repo.clone(),
            repo.clone(),
            Arc::new(NoOpJobCompletionNotifier),
            clock.clone(),
        )),
        installs: Arc::new(TrackerInstallService::new(repo.clone(), clock.clone())),
        accounts: Arc::new(AccountService::new(
            repo.clone(),
            repo.clone(),
            Arc::new(verifier),
            Arc::new(FixtureSteamProfileSource),
            Arc::new(Argon2PasswordHasher::new()),
        )),
        profiles: Arc::new(ProfileService::new(repo.clone(), repo.clone())),
        admin: Arc::new(SiteAdminService::new(repo.clone())),
        vtcs: Arc::new(VtcService::new(repo, clock.clone())),
        reports: Arc::new(FixtureReportsQuery),
    };
    web::Data::new(HttpState::new(ports, clock, "http://tracker.test"))
}

async fn call(store: &Store, request: test::TestRequest) -> ServiceResponse {
    let app = test::init_service(
        App::new()
            .app_data(http_state(store))
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .wrap(Trace)
            .configure(job_api::configure),
    )
    .await;
    test::call_service(&app, request.to_request()).await
}

async fn post_json(store: &Store, path: &str, body: Value) -> (StatusCode, Value) {
    let res = call(store, test::TestRequest::post().uri(path).set_json(body)).await;
    let status = res.status();
    let body: Value = test::read_body_json(res).await;
    (status, body)
}

async fn post_with_token(store: &Store, path: &str, body: Value) -> (StatusCode, Value) {
    let res = call(
        store,
        test::TestRequest::post()
            .uri(path)
            .insert_header((AUTHORIZATION, format!("Bearer {TOKEN}")))
            .set_json(body),
    )
    .await;
    let status = res.status();
    let body: Value = test::read_body_json(res).await;
    (status, body)
}

fn start_job_body() -> Value {
    json!({
        "game": "eut2",
        "driverSteamId": DRIVER,
        "truck": "Scania R",
        "cargo": "Apples",
        "sourceCity": "Berlin",
        "sourceCompany": "Posped",
        "destinationCity": "Praha",
        "destinationCompany": "Tradeaux",
        "plannedDistanceKm": 350,
        "truckLicensePlate": "B AB 123",
        "truckLicensePlateCountry": "Germany",
        "truckLicensePlateCountryId": "germany",
        "trailerLicensePlate": "1A2 3456",
        "trailerLicensePlateCountry": "Czech Republic",
        "trailerLicensePlateCountryId": "czech"
    })
}

fn finish_job_body(job: i64, steam_id: &str) -> Value {
    json!({
        "jobid": job,
        "steamid": steam_id,
        "status": "delivered",
        "driven_km": 352.4,
        "market": "freight_market",
        "income": 12345,
        "wearTruckCabin": 0.01,
        "wearTruckChassis": 0.02,
        "wearTruckTransmission": 0,
        "wearTruckWheels": 0.03,
        "wearTruckEngine": 0.04,
        "wearTrailerChassis": 0.01,
        "wearTrailerWheels": 0.01,
        "wearTrailerBody": 0.01,
        "cargoDamage": 0.5,
        "cargoMass": 18000,
        "maxspeed": 90,
        "xp": 640,
        "autoLoad": false,
        "autoPark": false,
        "usedDiesel": 120.5
    })
}

fn toll_body(job: i64) -> Value {
    json!({ "game": "ets2", "amount": 150, "jobId": job, "steamId": DRIVER })
}

#[rstest]
#[actix_web::test]
async fn a_job_is_started_and_finished_once(store: Store) {
    let (status, body) = post_json(&store, "/api/start_job.php", start_job_body()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "jobId": 1 }));

    let (status, body) =
        post_json(&store, "/api/finish_job.php", finish_job_body(1, DRIVER)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Job 1 updated successfully.");

    let (status, body) =
        post_json(&store, "/api/finish_job.php", finish_job_body(1, DRIVER)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["alreadyFinished"], true);
    assert_eq!(
        store.tables().notice_lookups,
        1,
        "a repeated finish must not announce the job again"
    );
}

#[rstest]
#[actix_web::test]
async fn finishing_someone_elses_job_is_not_found(store: Store) {
    store.seed_job(42, DRIVER, None);

    let (status, body) = post_json(
        &store,
        "/api/finish_job.php",
        finish_job_body(42, OTHER_DRIVER),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
    assert!(!store.tables().jobs[0].finished);
    assert_eq!(store.tables().notice_lookups, 0);
}

#[rstest]
#[actix_web::test]
async fn tolls_on_own_jobs_are_recorded(store: Store) {
    let driver = store.seed_driver(3, DRIVER, TOKEN);
    store.seed_job(42, DRIVER, Some(driver));

    let (status, body) = post_with_token(&store, "/api/record_toll.php", toll_body(42)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "toll_id": 1 }));
    assert_eq!(store.tables().tolls.len(), 1);
}

#[rstest]
#[actix_web::test]
async fn tolls_on_foreign_jobs_are_forbidden_and_not_stored(store: Store) {
    store.seed_driver(3, DRIVER, TOKEN);
    let other = store.seed_driver(4, OTHER_DRIVER, "other-token");
    store.seed_job(42, OTHER_DRIVER, Some(other));

    let (status, body) = post_with_token(&store, "/api/record_toll.php", toll_body(42)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Job does not belong to authenticated user");
    assert!(store.tables().tolls.is_empty());
}

#[rstest]
#[actix_web::test]
async fn tolls_with_a_wrong_token_are_unauthorised(store: Store) {
    let driver = store.seed_driver(3, DRIVER, "a-different-token");
    store.seed_job(42, DRIVER, Some(driver));

    let (status, _) = post_with_token(&store, "/api/record_toll.php", toll_body(42)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(store.tables().tolls.is_empty());
}

#[rstest]
#[actix_web::test]
async fn paused_accounts_cannot_record_fines(store: Store) {
    let driver = store.seed_driver(3, DRIVER, TOKEN);
    store.seed_job(42, DRIVER, Some(driver));
    store.tables().users[0].user.account_status = AccountStatus::Paused;

    let (status, body) = post_with_token(
        &store,
        "/api/record_fine.php",
        json!({ "game": "ets2", "offence": "speeding", "amount": 200, "jobId": 42, "steamId": DRIVER }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "User account not active");
    assert!(store.tables().penalties.is_empty());
}

#[rstest]
#[actix_web::test]
async fn install_tokens_bind_once_per_tracker(store: Store) {
    let owner = store.seed_driver(8, DRIVER, TOKEN);
    store.seed_install("install-token", owner);
    let claim = |tracker: &str, force: bool| {
        json!({ "token": "install-token", "tracker_id": tracker, "force": force })
    };

    let (status, body) = post_json(&store, "/api/auth.php", claim("tracker-0001", false)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "user_id": 8 }));

    let (_, body) = post_json(&store, "/api/auth.php", claim("tracker-0001", false)).await;
    assert_eq!(body["already_registered"], true);

    let (status, body) = post_json(&store, "/api/auth.php", claim("tracker-0002", false)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "conflict");

    let (status, _) = post_json(&store, "/api/auth.php", claim("tracker-0002", true)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        store.tables().installs[0].tracker_id.as_deref(),
        Some("tracker-0002")
    );
}

#[rstest]
#[actix_web::test]
async fn error_envelopes_echo_the_trace_id(store: Store) {
    let res = call(
        &store,
        test::TestRequest::post()
            .uri("/api/finish_job.php")
            .set_json(finish_job_body(999, DRIVER)),
    )
    .await;
    let header = res
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .expect("trace-id header");
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["traceId"], header.as_str());
}
