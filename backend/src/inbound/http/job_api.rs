//! Game client ingestion API.
//!
//! ```text
//! POST /api/start_job.php        {"game":"eut2","driverSteamId":"7656…",…}
//! POST /api/finish_job.php       {"jobid":42,"steamid":"7656…","status":"delivered",…}
//! POST /api/record_toll.php      {"game":"ets2","amount":150,"jobId":42,"steamId":"7656…"}
//! POST /api/record_fine.php      {"game":"ets2","amount":500,"jobId":42,"steamId":"7656…","offence":"speeding"}
//! POST /api/record_transport.php {"jobId":42,"steamid":"7656…","transportType":"ferry",…}
//! POST /api/auth.php             {"token":"…","tracker_id":"tracker-0001"}
//! ```
//!
//! Field names follow what the tracker client sends, which is why casing
//! differs between endpoints. Every other method on these paths is `405`.

use actix_web::{HttpRequest, HttpResponse, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::domain::{
    ClaimOutcome, CompletionOutcome, Error, FineReport, InstallClaim, InstallToken,
    JobCompletion, JobStatus, LicensePlate, NewJob, TollReport, TrackerId, TrailerWear,
    TransportReport, TransportType, TruckWear,
};

use super::ApiResult;
use super::bearer::api_token;
use super::error::method_not_allowed;
use super::payload::Scalar;
use super::schemas::ErrorSchema;
use super::state::HttpState;
use super::validation::{ErrorCode, FieldErrors, validate};

/// Accepted encodings for toll and fine reports.
type JsonOrForm<T> = web::Either<web::Json<T>, web::Form<T>>;

fn into_inner<T>(payload: JsonOrForm<T>) -> T {
    match payload {
        web::Either::Left(json) => json.into_inner(),
        web::Either::Right(form) => form.into_inner(),
    }
}

fn optional_text(value: Option<Scalar>) -> Option<String> {
    value
        .filter(|scalar| !scalar.is_blank())
        .map(|scalar| scalar.text().trim().to_owned())
}

/// Register every ingestion endpoint on `cfg`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    let post_only = |path: &str, route: actix_web::Route| {
        web::resource(path)
            .route(route)
            .default_service(web::to(method_not_allowed))
    };
    cfg.service(post_only("/api/start_job.php", web::post().to(start_job)))
        .service(post_only("/api/finish_job.php", web::post().to(finish_job)))
        .service(post_only("/api/record_toll.php", web::post().to(record_toll)))
        .service(post_only("/api/record_fine.php", web::post().to(record_fine)))
        .service(post_only(
            "/api/record_transport.php",
            web::post().to(record_transport),
        ))
        .service(post_only("/api/auth.php", web::post().to(claim_install)));
}

/// Job start report.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartJobRequest {
    pub game: Option<Scalar>,
    pub driver_steam_id: Option<Scalar>,
    pub truck: Option<Scalar>,
    pub cargo: Option<Scalar>,
    pub source_city: Option<Scalar>,
    pub source_company: Option<Scalar>,
    pub destination_city: Option<Scalar>,
    pub destination_company: Option<Scalar>,
    pub planned_distance_km: Option<Scalar>,
    pub truck_license_plate: Option<Scalar>,
    pub truck_license_plate_country: Option<Scalar>,
    pub truck_license_plate_country_id: Option<Scalar>,
    pub trailer_license_plate: Option<Scalar>,
    pub trailer_license_plate_country: Option<Scalar>,
    pub trailer_license_plate_country_id: Option<Scalar>,
    pub trailer_body_type: Option<Scalar>,
}

impl StartJobRequest {
    fn parse(self, errors: &mut FieldErrors) -> Option<NewJob> {
        let game = errors.text("game", self.game);
        let driver_steam_id = errors.steam_id("driverSteamId", self.driver_steam_id);
        let truck = errors.text("truck", self.truck);
        let cargo = errors.text("cargo", self.cargo);
        let source_city = errors.text("sourceCity", self.source_city);
        let source_company = errors.text("sourceCompany", self.source_company);
        let destination_city = errors.text("destinationCity", self.destination_city);
        let destination_company = errors.text("destinationCompany", self.destination_company);
        let planned_distance_km = errors.number("plannedDistanceKm", self.planned_distance_km);
        let truck_plate = plate(
            errors,
            ("truckLicensePlate", self.truck_license_plate),
            ("truckLicensePlateCountry", self.truck_license_plate_country),
            ("truckLicensePlateCountryId", self.truck_license_plate_country_id),
        );
        let trailer_plate = plate(
            errors,
            ("trailerLicensePlate", self.trailer_license_plate),
            ("trailerLicensePlateCountry", self.trailer_license_plate_country),
            (
                "trailerLicensePlateCountryId",
                self.trailer_license_plate_country_id,
            ),
        );
        Some(NewJob {
            game: game?,
            driver_steam_id: driver_steam_id?,
            truck: truck?,
            cargo: cargo?,
            source_city: source_city?,
            source_company: source_company?,
            destination_city: destination_city?,
            destination_company: destination_company?,
            planned_distance_km: planned_distance_km?,
            truck_plate: truck_plate?,
            trailer_plate: trailer_plate?,
            trailer_body_type: optional_text(self.trailer_body_type),
        })
    }
}

fn plate(
    errors: &mut FieldErrors,
    (number_field, number): (&'static str, Option<Scalar>),
    (country_field, country): (&'static str, Option<Scalar>),
    (id_field, country_id): (&'static str, Option<Scalar>),
) -> Option<LicensePlate> {
    let number = errors.text(number_field, number);
    let country = errors.text(country_field, country);
    let country_id = errors.text(id_field, country_id);
    Some(LicensePlate {
        number: number?,
        country: country?,
        country_id: country_id?,
    })
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartJobResponse {
    pub job_id: i64,
}

/// Record a job the driver just accepted.
#[utoipa::path(
    post,
    path = "/api/start_job.php",
    request_body = StartJobRequest,
    responses(
        (status = 200, description = "Job recorded", body = StartJobResponse),
        (status = 400, description = "Missing or invalid fields", body = ErrorSchema),
        (status = 405, description = "Not a POST", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["ingestion"],
    operation_id = "startJob",
    security([])
)]
pub async fn start_job(
    state: web::Data<HttpState>,
    payload: web::Json<StartJobRequest>,
) -> ApiResult<HttpResponse> {
    let job = validate(|errors| payload.into_inner().parse(errors))?;
    let job_id = state.jobs.start_job(job).await?;
    info!(job_id = %job_id, "job started");
    Ok(HttpResponse::Ok().json(StartJobResponse {
        job_id: job_id.as_i64(),
    }))
}

/// Job completion report.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinishJobRequest {
    pub jobid: Option<Scalar>,
    pub steamid: Option<Scalar>,
    pub status: Option<Scalar>,
    #[serde(rename = "driven_km")]
    pub driven_km: Option<Scalar>,
    pub market: Option<Scalar>,
    pub income: Option<Scalar>,
    pub wear_truck_cabin: Option<Scalar>,
    pub wear_truck_chassis: Option<Scalar>,
    pub wear_truck_transmission: Option<Scalar>,
    pub wear_truck_wheels: Option<Scalar>,
    pub wear_truck_engine: Option<Scalar>,
    pub wear_trailer_chassis: Option<Scalar>,
    pub wear_trailer_wheels: Option<Scalar>,
    pub wear_trailer_body: Option<Scalar>,
    pub cargo_damage: Option<Scalar>,
    pub cargo_mass: Option<Scalar>,
    pub maxspeed: Option<Scalar>,
    pub xp: Option<Scalar>,
    pub auto_load: Option<Scalar>,
    pub auto_park: Option<Scalar>,
    pub used_diesel: Option<Scalar>,
}

impl FinishJobRequest {
    fn parse(self, errors: &mut FieldErrors) -> Option<JobCompletion> {
        let job_id = errors.job_id("jobid", self.jobid);
        let steam_id = errors.steam_id("steamid", self.steamid);
        let status = errors.text("status", self.status);
        let driven_km = errors.number("driven_km", self.driven_km);
        let market = errors.text("market", self.market);
        let income = errors.integer("income", self.income);
        let truck_wear = (
            errors.number("wearTruckCabin", self.wear_truck_cabin),
            errors.number("wearTruckChassis", self.wear_truck_chassis),
            errors.number("wearTruckTransmission", self.wear_truck_transmission),
            errors.number("wearTruckWheels", self.wear_truck_wheels),
            errors.number("wearTruckEngine", self.wear_truck_engine),
        );
        let trailer_wear = (
            errors.number("wearTrailerChassis", self.wear_trailer_chassis),
            errors.number("wearTrailerWheels", self.wear_trailer_wheels),
            errors.number("wearTrailerBody", self.wear_trailer_body),
        );
        let cargo_damage = errors.number("cargoDamage", self.cargo_damage);
        let cargo_mass = errors.number("cargoMass", self.cargo_mass);
        let max_speed = errors.number("maxspeed", self.maxspeed);
        let xp = errors.integer("xp", self.xp);
        let auto_load = errors.flag("autoLoad", self.auto_load);
        let auto_park = errors.flag("autoPark", self.auto_park);
        let used_diesel = errors.number("usedDiesel", self.used_diesel);
        Some(JobCompletion {
            job_id: job_id?,
            steam_id: steam_id?,
            status: JobStatus::parse(&status?),
            driven_km: driven_km?,
            market: market?,
            income: income?,
            truck_wear: TruckWear {
                cabin: truck_wear.0?,
                chassis: truck_wear.1?,
                transmission: truck_wear.2?,
                wheels: truck_wear.3?,
                engine: truck_wear.4?,
            },
            trailer_wear: TrailerWear {
                chassis: trailer_wear.0?,
                wheels: trailer_wear.1?,
                body: trailer_wear.2?,
            },
            cargo_damage: cargo_damage?,
            cargo_mass: cargo_mass?,
            max_speed: max_speed?,
            xp: xp?,
            auto_load: auto_load?,
            auto_park: auto_park?,
            used_diesel: used_diesel?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinishJobResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub already_finished: Option<bool>,
    pub message: String,
}

/// Close a job with the final delivery figures.
///
/// A repeated report for a closed job succeeds without changing anything.
#[utoipa::path(
    post,
    path = "/api/finish_job.php",
    request_body = FinishJobRequest,
    responses(
        (status = 200, description = "Job closed, or already closed", body = FinishJobResponse),
        (status = 400, description = "Missing or invalid fields", body = ErrorSchema),
        (status = 404, description = "No job for this id and driver", body = ErrorSchema),
        (status = 405, description = "Not a POST", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["ingestion"],
    operation_id = "finishJob",
    security([])
)]
pub async fn finish_job(
    state: web::Data<HttpState>,
    payload: web::Json<FinishJobRequest>,
) -> ApiResult<HttpResponse> {
    let completion = validate(|errors| payload.into_inner().parse(errors))?;
    let job_id = completion.job_id;
    let body = match state.jobs.finish_job(completion).await? {
        CompletionOutcome::Completed => {
            info!(job_id = %job_id, "job finished");
            FinishJobResponse {
                success: true,
                already_finished: None,
                message: format!("Job {job_id} updated successfully."),
            }
        }
        CompletionOutcome::AlreadyFinished => FinishJobResponse {
            success: true,
            already_finished: Some(true),
            message: format!("Job {job_id} was already finished."),
        },
        CompletionOutcome::NotFound => {
            return Err(Error::not_found("Job not found or user does not match."));
        }
    };
    Ok(HttpResponse::Ok().json(body))
}

/// Toll payment report.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct TollRequest {
    pub game: Option<Scalar>,
    pub amount: Option<Scalar>,
    #[serde(rename = "jobId", alias = "job_id")]
    pub job_id: Option<Scalar>,
    #[serde(rename = "steamId")]
    pub steam_id: Option<Scalar>,
    pub auth_token: Option<String>,
}

impl TollRequest {
    fn parse(self, errors: &mut FieldErrors) -> Option<TollReport> {
        let game = errors.text("game", self.game);
        let amount = errors.number("amount", self.amount);
        let job_id = errors.job_id("jobId", self.job_id);
        let steam_id = errors.steam_id("steamId", self.steam_id);
        Some(TollReport {
            job_id: job_id?,
            steam_id: steam_id?,
            game: game?,
            amount: amount?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TollResponse {
    pub success: bool,
    pub toll_id: i64,
}

/// Record a toll paid during a job.
#[utoipa::path(
    post,
    path = "/api/record_toll.php",
    request_body(
        description = "JSON or form-encoded report",
        content(
            (TollRequest = "application/json"),
            (TollRequest = "application/x-www-form-urlencoded")
        )
    ),
    responses(
        (status = 200, description = "Toll recorded", body = TollResponse),
        (status = 400, description = "Missing or invalid fields, or unknown job", body = ErrorSchema),
        (status = 401, description = "Missing or unknown credential", body = ErrorSchema),
        (status = 403, description = "Inactive account or someone else's job", body = ErrorSchema),
        (status = 405, description = "Not a POST", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["ingestion"],
    operation_id = "recordToll",
    security(("ApiToken" = []))
)]
pub async fn record_toll(
    req: HttpRequest,
    state: web::Data<HttpState>,
    payload: JsonOrForm<TollRequest>,
) -> ApiResult<HttpResponse> {
    let mut request = into_inner(payload);
    let body_token = request.auth_token.take();
    let toll = validate(|errors| request.parse(errors))?;
    let token = api_token(&req, body_token.as_deref())?;
    let job_id = toll.job_id;
    let toll_id = state.jobs.record_toll(token, toll).await?;
    info!(job_id = %job_id, toll_id, "toll recorded");
    Ok(HttpResponse::Ok().json(TollResponse {
        success: true,
        toll_id,
    }))
}

/// Fine report.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct FineRequest {
    pub game: Option<Scalar>,
    pub amount: Option<Scalar>,
    #[serde(rename = "jobId", alias = "job_id")]
    pub job_id: Option<Scalar>,
    #[serde(rename = "steamId", alias = "steamid")]
    pub steam_id: Option<Scalar>,
    #[serde(alias = "offense")]
    pub offence: Option<Scalar>,
    pub auth_token: Option<String>,
}

impl FineRequest {
    fn parse(self, errors: &mut FieldErrors) -> Option<FineReport> {
        let game = errors.text("game", self.game);
        let amount = errors.number("amount", self.amount);
        let job_id = errors.job_id("jobId", self.job_id);
        let steam_id = errors.steam_id("steamId", self.steam_id);
        let offence = errors.text("offence", self.offence);
        Some(FineReport::new(
            job_id?,
            steam_id?,
            game?.as_str(),
            amount?,
            offence?.as_str(),
        ))
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FineResponse {
    pub success: bool,
    pub penalty_id: i64,
}

/// Record a fine received during a job.
#[utoipa::path(
    post,
    path = "/api/record_fine.php",
    request_body(
        description = "JSON or form-encoded report",
        content(
            (FineRequest = "application/json"),
            (FineRequest = "application/x-www-form-urlencoded")
        )
    ),
    responses(
        (status = 200, description = "Fine recorded", body = FineResponse),
        (status = 400, description = "Missing or invalid fields, or unknown job", body = ErrorSchema),
        (status = 401, description = "Missing or unknown credential", body = ErrorSchema),
        (status = 403, description = "Inactive account or someone else's job", body = ErrorSchema),
        (status = 405, description = "Not a POST", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["ingestion"],
    operation_id = "recordFine",
    security(("ApiToken" = []))
)]
pub async fn record_fine(
    req: HttpRequest,
    state: web::Data<HttpState>,
    payload: JsonOrForm<FineRequest>,
) -> ApiResult<HttpResponse> {
    let mut request = into_inner(payload);
    let body_token = request.auth_token.take();
    let fine = validate(|errors| request.parse(errors))?;
    let token = api_token(&req, body_token.as_deref())?;
    let job_id = fine.job_id;
    let penalty_id = state.jobs.record_fine(token, fine).await?;
    info!(job_id = %job_id, penalty_id, "fine recorded");
    Ok(HttpResponse::Ok().json(FineResponse {
        success: true,
        penalty_id,
    }))
}

/// Ferry or train crossing report.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransportRequest {
    pub job_id: Option<Scalar>,
    #[serde(rename = "steamid")]
    pub steam_id: Option<Scalar>,
    pub transport_type: Option<Scalar>,
    pub source: Option<Scalar>,
    pub destination: Option<Scalar>,
    pub game: Option<Scalar>,
    pub amount: Option<Scalar>,
}

impl TransportRequest {
    fn parse(self, errors: &mut FieldErrors) -> Option<TransportReport> {
        let job_id = errors.job_id("jobId", self.job_id);
        let steam_id = errors.steam_id("steamid", self.steam_id);
        let transport_type = errors
            .text("transportType", self.transport_type)
            .and_then(|raw| match raw.parse::<TransportType>() {
                Ok(kind) => Some(kind),
                Err(err) => {
                    errors.push("transportType", ErrorCode::InvalidValue, err.to_string());
                    None
                }
            });
        let source = errors.text("source", self.source);
        let destination = errors.text("destination", self.destination);
        let game = errors.text("game", self.game);
        let amount = errors.number("amount", self.amount);
        Some(TransportReport {
            job_id: job_id?,
            steam_id: steam_id?,
            transport_type: transport_type?,
            source: source?,
            destination: destination?,
            game: game?,
            amount: amount?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TransportResponse {
    pub success: bool,
    pub message: String,
    pub transport_id: i64,
}

/// Record a ferry or train crossing.
#[utoipa::path(
    post,
    path = "/api/record_transport.php",
    request_body = TransportRequest,
    responses(
        (status = 201, description = "Crossing recorded", body = TransportResponse),
        (status = 400, description = "Missing or invalid fields", body = ErrorSchema),
        (status = 404, description = "No job for this id and driver", body = ErrorSchema),
        (status = 405, description = "Not a POST", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["ingestion"],
    operation_id = "recordTransport",
    security([])
)]
pub async fn record_transport(
    state: web::Data<HttpState>,
    payload: web::Json<TransportRequest>,
) -> ApiResult<HttpResponse> {
    let transport = validate(|errors| payload.into_inner().parse(errors))?;
    let job_id = transport.job_id;
    let transport_id = state.jobs.record_transport(transport).await?;
    info!(job_id = %job_id, transport_id, "transport recorded");
    Ok(HttpResponse::Created().json(TransportResponse {
        success: true,
        message: "Transport event recorded successfully.".to_owned(),
        transport_id,
    }))
}

/// Install token exchange.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ClaimRequest {
    pub token: Option<Scalar>,
    pub tracker_id: Option<Scalar>,
    pub force: Option<Scalar>,
}

impl ClaimRequest {
    fn parse(self, errors: &mut FieldErrors) -> Option<InstallClaim> {
        let token = errors
            .text("token", self.token)
            .and_then(|raw| match InstallToken::new(&raw) {
                Ok(token) => Some(token),
                Err(err) => {
                    errors.push("token", ErrorCode::InvalidValue, err.to_string());
                    None
                }
            });
        let tracker_id = errors
            .text("tracker_id", self.tracker_id)
            .and_then(|raw| match TrackerId::new(&raw) {
                Ok(id) => Some(id),
                Err(err) => {
                    errors.push("tracker_id", ErrorCode::InvalidValue, err.to_string());
                    None
                }
            });
        let force = match self.force {
            None => false,
            Some(raw) => errors.flag("force", Some(raw))?,
        };
        Some(InstallClaim {
            token: token?,
            tracker_id: tracker_id?,
            force,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClaimResponse {
    pub success: bool,
    pub user_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub already_registered: Option<bool>,
}

/// Bind a tracker installation to the install token's user.
#[utoipa::path(
    post,
    path = "/api/auth.php",
    request_body = ClaimRequest,
    responses(
        (status = 200, description = "Tracker bound", body = ClaimResponse),
        (status = 400, description = "Missing or invalid fields", body = ErrorSchema),
        (status = 401, description = "Unknown install token", body = ErrorSchema),
        (status = 405, description = "Not a POST", body = ErrorSchema),
        (status = 409, description = "Token held by another tracker", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["ingestion"],
    operation_id = "claimInstall",
    security([])
)]
pub async fn claim_install(
    state: web::Data<HttpState>,
    payload: web::Json<ClaimRequest>,
) -> ApiResult<HttpResponse> {
    let claim = validate(|errors| payload.into_inner().parse(errors))?;
    let body = match state.installs.claim(claim).await? {
        ClaimOutcome::Bound(user_id) => {
            info!(user_id = %user_id, "tracker bound");
            ClaimResponse {
                success: true,
                user_id: user_id.as_i64(),
                already_registered: None,
            }
        }
        ClaimOutcome::AlreadyRegistered(user_id) => ClaimResponse {
            success: true,
            user_id: user_id.as_i64(),
            already_registered: Some(true),
        },
        ClaimOutcome::HeldByOtherTracker => {
            return Err(Error::conflict(
                "Install token already used by another tracker. Use force to override.",
            ));
        }
        ClaimOutcome::UnknownToken => return Err(Error::unauthorized("Invalid token")),
    };
    Ok(HttpResponse::Ok().json(body))
}

#[cfg(test)]
#[path = "job_api_tests.rs"]
mod tests;
