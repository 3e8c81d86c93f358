//! The signed-in driver's settings page.
//!
//! ```text
//! GET  /settings.php
//! POST /settings.php  action=update_profile | pause_account | reset_stats | delete_account
//! ```

use actix_web::{HttpRequest, HttpResponse, get, post, web};
use serde::Deserialize;

use crate::domain::{ApiToken, ProfileUpdate};

use super::ApiResult;
use super::current_user::CurrentUser;
use super::pages::{render, see_other};
use super::session::{SessionContext, presented_csrf};
use super::state::HttpState;
use super::validation::invalid_field;

const SETTINGS_PATH: &str = "/settings.php";

#[get("/settings.php")]
pub async fn settings_page(
    state: web::Data<HttpState>,
    session: SessionContext,
    CurrentUser(user): CurrentUser,
) -> ApiResult<HttpResponse> {
    let profile = user.clone();
    render(&state, &session, Some(user), serde_json::json!({ "profile": profile }))
}

/// Settings form; only the fields of the chosen action are read.
#[derive(Debug, Default, Deserialize)]
pub struct SettingsForm {
    #[serde(default)]
    pub action: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub wot_text: Option<String>,
    pub truckersmp_text: Option<String>,
    pub auth_token: Option<String>,
    pub csrf_token: Option<String>,
}

fn filled(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}

impl SettingsForm {
    fn profile_update(&mut self) -> Result<ProfileUpdate, crate::domain::Error> {
        let auth_token = filled(self.auth_token.take())
            .map(ApiToken::new)
            .transpose()
            .map_err(|err| invalid_field("auth_token", &err.to_string()))?;
        Ok(ProfileUpdate {
            display_name: filled(self.display_name.take()),
            bio: filled(self.bio.take()),
            wot_text: filled(self.wot_text.take()),
            truckersmp_text: filled(self.truckersmp_text.take()),
            auth_token,
        })
    }
}

#[post("/settings.php")]
pub async fn settings_submit(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    CurrentUser(user): CurrentUser,
    form: web::Form<SettingsForm>,
) -> ApiResult<HttpResponse> {
    let mut form = form.into_inner();
    session.verify_csrf(presented_csrf(&req, form.csrf_token.as_deref()), state.now())?;
    match form.action.as_str() {
        "update_profile" => {
            let update = form.profile_update()?;
            state.profiles.update_profile(&user, update).await?;
        }
        "pause_account" => {
            state.profiles.pause_account(&user).await?;
        }
        "reset_stats" => {
            state.profiles.reset_stats(&user).await?;
        }
        "delete_account" => {
            state.profiles.delete_account(&user).await?;
            session.purge();
            return Ok(see_other("/"));
        }
        _ => return Err(invalid_field("action", "Unknown action.")),
    }
    Ok(see_other(SETTINGS_PATH))
}

/// Register the settings page on `cfg`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(settings_page).service(settings_submit);
}
