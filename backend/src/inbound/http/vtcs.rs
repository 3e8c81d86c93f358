//! Virtual trucking company pages.
//!
//! ```text
//! GET  /vtcs.php           active companies, newest first
//! POST /vtcs.php           action=create_vtc
//! GET  /vtc.php?id=3       company detail with members
//! POST /vtc.php            action=join | leave, vtc_id=3
//! ```

use actix_web::{HttpRequest, HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{Error, NewVtc, VtcId, VtcSummary, VtcValidationError};

use super::ApiResult;
use super::current_user::{CurrentUser, Viewer};
use super::pages::{render, see_other};
use super::session::{SessionContext, presented_csrf};
use super::state::HttpState;
use super::validation::invalid_field;

#[derive(Debug, Serialize)]
struct VtcListPage {
    vtcs: Vec<VtcSummary>,
}

fn vtc_path(id: VtcId) -> String {
    format!("/vtc.php?id={id}")
}

fn vtc_not_found() -> Error {
    Error::not_found("VTC not found.")
}

fn parse_vtc_id(raw: Option<i64>) -> Result<VtcId, Error> {
    raw.and_then(|id| VtcId::new(id).ok())
        .ok_or_else(vtc_not_found)
}

#[get("/vtcs.php")]
pub async fn list_page(
    state: web::Data<HttpState>,
    session: SessionContext,
    Viewer(viewer): Viewer,
) -> ApiResult<HttpResponse> {
    let vtcs = state.vtcs.list().await?;
    render(&state, &session, viewer, VtcListPage { vtcs })
}

/// Company creation form.
#[derive(Debug, Default, Deserialize)]
pub struct CreateVtcForm {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tag: String,
    pub description: Option<String>,
    pub csrf_token: Option<String>,
}

#[post("/vtcs.php")]
pub async fn create(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    CurrentUser(user): CurrentUser,
    form: web::Form<CreateVtcForm>,
) -> ApiResult<HttpResponse> {
    let form = form.into_inner();
    session.verify_csrf(presented_csrf(&req, form.csrf_token.as_deref()), state.now())?;
    if form.action != "create_vtc" {
        return Err(invalid_field("action", "Unknown action."));
    }
    let vtc = NewVtc::try_new(&form.name, &form.tag, form.description.as_deref(), user.id)
        .map_err(|err| {
            let field = match err {
                VtcValidationError::EmptyName => "name",
                _ => "tag",
            };
            invalid_field(field, &err.to_string())
        })?;
    let id = state.vtcs.create(vtc).await?;
    info!(vtc_id = %id, owner_id = %user.id, "vtc created");
    Ok(see_other(vtc_path(id)))
}

/// `?id=` query parameter.
#[derive(Debug, Default, Deserialize)]
pub struct VtcQuery {
    pub id: Option<i64>,
}

#[get("/vtc.php")]
pub async fn detail_page(
    state: web::Data<HttpState>,
    session: SessionContext,
    Viewer(viewer): Viewer,
    query: web::Query<VtcQuery>,
) -> ApiResult<HttpResponse> {
    let id = parse_vtc_id(query.id)?;
    let page = state
        .vtcs
        .view(id, viewer.as_ref().map(|user| user.id))
        .await?;
    render(&state, &session, viewer, page)
}

/// Membership form.
#[derive(Debug, Default, Deserialize)]
pub struct MembershipForm {
    #[serde(default)]
    pub action: String,
    pub vtc_id: Option<i64>,
    pub csrf_token: Option<String>,
}

#[post("/vtc.php")]
pub async fn membership(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    CurrentUser(user): CurrentUser,
    form: web::Form<MembershipForm>,
) -> ApiResult<HttpResponse> {
    let form = form.into_inner();
    session.verify_csrf(presented_csrf(&req, form.csrf_token.as_deref()), state.now())?;
    let id = parse_vtc_id(form.vtc_id)?;
    match form.action.as_str() {
        "join" => {
            state.vtcs.join(id, user.id).await?;
            info!(vtc_id = %id, user_id = %user.id, "joined vtc");
        }
        "leave" => {
            state.vtcs.leave(id, user.id).await?;
            info!(vtc_id = %id, user_id = %user.id, "left vtc");
        }
        _ => return Err(invalid_field("action", "Unknown action.")),
    }
    Ok(see_other(vtc_path(id)))
}

/// Register the VTC pages on `cfg`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_page)
        .service(create)
        .service(detail_page)
        .service(membership);
}
