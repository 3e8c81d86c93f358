//! Site administration pages.
//!
//! ```text
//! GET  /admin_login.php     -> /admin_settings.php for administrators
//! GET  /admin_settings.php  registration flag and site counts
//! POST /admin_settings.php  action=toggle_registration | reset_site
//! ```

use actix_web::{HttpRequest, HttpResponse, get, post, web};
use serde::Deserialize;
use tracing::{info, warn};

use crate::domain::ResetConfirmation;

use super::ApiResult;
use super::current_user::AdminUser;
use super::pages::{render, see_other};
use super::session::{SessionContext, presented_csrf};
use super::state::HttpState;
use super::validation::invalid_field;

const SETTINGS_PATH: &str = "/admin_settings.php";

#[get("/admin_login.php")]
pub async fn admin_login(_admin: AdminUser) -> HttpResponse {
    see_other(SETTINGS_PATH)
}

#[get("/admin_settings.php")]
pub async fn settings_page(
    state: web::Data<HttpState>,
    session: SessionContext,
    AdminUser(admin): AdminUser,
) -> ApiResult<HttpResponse> {
    let settings = state.admin.settings().await?;
    render(&state, &session, Some(admin), settings)
}

/// Administrator form submission.
#[derive(Debug, Default, Deserialize)]
pub struct AdminForm {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub confirm_text: String,
    pub csrf_token: Option<String>,
}

#[post("/admin_settings.php")]
pub async fn settings_submit(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    AdminUser(admin): AdminUser,
    form: web::Form<AdminForm>,
) -> ApiResult<HttpResponse> {
    let form = form.into_inner();
    session.verify_csrf(presented_csrf(&req, form.csrf_token.as_deref()), state.now())?;
    match form.action.as_str() {
        "toggle_registration" => {
            let open = state.admin.toggle_registration().await?;
            info!(admin_id = %admin.id, registration_open = open, "registration toggled");
        }
        "reset_site" => {
            let confirmation = ResetConfirmation::parse(&form.confirm_text)
                .map_err(|err| invalid_field("confirm_text", &err.to_string()))?;
            let report = state.admin.reset_site(confirmation).await?;
            warn!(
                admin_id = %admin.id,
                jobs_deleted = report.jobs_deleted,
                vtcs_deleted = report.vtcs_deleted,
                users_deleted = report.users_deleted,
                "site reset"
            );
        }
        _ => return Err(invalid_field("action", "Unknown action.")),
    }
    Ok(see_other(SETTINGS_PATH))
}

/// Register the administration pages on `cfg`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(admin_login)
        .service(settings_page)
        .service(settings_submit);
}
