//! Sign-in, registration and sign-out.
//!
//! ```text
//! GET  /login.php              Steam login URL and the pending login error
//! POST /login.php              email + password
//! GET  /auth_callback.php      Steam OpenID return for sign-in
//! GET  /register.php           registration page
//! POST /register.php           email registration
//! GET  /register_callback.php  Steam OpenID return for sign-up
//! POST /logout.php             end the session
//! ```
//!
//! Steam callbacks never answer with an error body: failures are stored as
//! the one-shot login error and the browser is sent back to the form.

use actix_web::{HttpRequest, HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use url::form_urlencoded;

use crate::domain::ports::{OpenIdAssertion, SteamLoginMode};
use crate::domain::{Error, ErrorCode, LoginCredentials, Registration};

use super::ApiResult;
use super::current_user::Viewer;
use super::pages::{render, see_other};
use super::session::{SessionContext, presented_csrf};
use super::state::HttpState;

const STEAM_FAILED: &str = "Steam authentication failed. Please try again.";
const STORAGE_FAILED: &str = "Database error occurred. Please try again.";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginPage {
    steam_login_url: String,
    login_error: Option<String>,
    return_to: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterPage {
    steam_register_url: String,
    registration_open: bool,
    login_error: Option<String>,
}

/// Only same-site paths are honoured as post-login targets.
fn local_path(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|path| path.starts_with('/') && !path.starts_with("//") && !path.contains('\\'))
        .map(str::to_owned)
}

#[derive(Debug, Default, Deserialize)]
pub struct ReturnQuery {
    #[serde(rename = "return")]
    pub return_to: Option<String>,
}

#[get("/login.php")]
pub async fn login_page(
    state: web::Data<HttpState>,
    session: SessionContext,
    Viewer(viewer): Viewer,
    query: web::Query<ReturnQuery>,
) -> ApiResult<HttpResponse> {
    if viewer.is_some() {
        return Ok(see_other("/"));
    }
    let login_error = session.take_login_error()?;
    let steam_login_url = state.accounts.steam_login_url(
        &state.absolute_url("/auth_callback.php"),
        &state.public_base_url,
    );
    let page = LoginPage {
        steam_login_url,
        login_error,
        return_to: local_path(query.return_to.as_deref()),
    };
    render(&state, &session, None, page)
}

/// Email sign-in form.
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(rename = "return")]
    pub return_to: Option<String>,
    pub csrf_token: Option<String>,
}

#[post("/login.php")]
pub async fn login_submit(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<LoginForm>,
) -> ApiResult<HttpResponse> {
    let form = form.into_inner();
    session.verify_csrf(presented_csrf(&req, form.csrf_token.as_deref()), state.now())?;
    let credentials = LoginCredentials::try_from_parts(&form.email, &form.password)
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    let user = state.accounts.login(credentials).await?;
    session.persist_user(user.id)?;
    info!(user_id = %user.id, "signed in with password");
    let target = local_path(form.return_to.as_deref()).unwrap_or_else(|| "/".to_owned());
    Ok(see_other(target))
}

fn flash_message(error: &Error) -> &str {
    match error.code() {
        ErrorCode::InternalError => STORAGE_FAILED,
        _ => error.message(),
    }
}

async fn steam_callback(
    req: &HttpRequest,
    state: &HttpState,
    session: &SessionContext,
    mode: SteamLoginMode,
) -> ApiResult<HttpResponse> {
    let pairs = form_urlencoded::parse(req.query_string().as_bytes()).into_owned();
    let assertion = match OpenIdAssertion::from_query(pairs) {
        Ok(assertion) => assertion,
        Err(err) => {
            warn!(error = %err, ?mode, "malformed steam callback");
            session.set_login_error(STEAM_FAILED)?;
            return Ok(see_other(mode.failure_path()));
        }
    };
    match state.accounts.steam_login(assertion, mode).await {
        Ok(user) => {
            session.persist_user(user.id)?;
            info!(user_id = %user.id, ?mode, "signed in with steam");
            Ok(see_other("/"))
        }
        Err(err) => {
            warn!(error = %err.message(), code = ?err.code(), ?mode, "steam sign-in failed");
            session.set_login_error(flash_message(&err))?;
            Ok(see_other(mode.failure_path()))
        }
    }
}

#[get("/auth_callback.php")]
pub async fn auth_callback(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    steam_callback(&req, &state, &session, SteamLoginMode::Login).await
}

#[get("/register_callback.php")]
pub async fn register_callback(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    steam_callback(&req, &state, &session, SteamLoginMode::Register).await
}

#[get("/register.php")]
pub async fn register_page(
    state: web::Data<HttpState>,
    session: SessionContext,
    Viewer(viewer): Viewer,
) -> ApiResult<HttpResponse> {
    if viewer.is_some() {
        return Ok(see_other("/"));
    }
    let registration_open = state.admin.registration_open().await?;
    let login_error = session.take_login_error()?;
    let steam_register_url = state.accounts.steam_login_url(
        &state.absolute_url("/register_callback.php"),
        &state.public_base_url,
    );
    let page = RegisterPage {
        steam_register_url,
        registration_open,
        login_error,
    };
    render(&state, &session, None, page)
}

/// Email registration form.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirm: String,
    pub csrf_token: Option<String>,
}

#[post("/register.php")]
pub async fn register_submit(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<RegisterForm>,
) -> ApiResult<HttpResponse> {
    let form = form.into_inner();
    session.verify_csrf(presented_csrf(&req, form.csrf_token.as_deref()), state.now())?;
    let registration = Registration::try_from_parts(
        &form.email,
        &form.username,
        &form.password,
        &form.password_confirm,
    )
    .map_err(|err| Error::invalid_request(err.to_string()))?;
    let user = state.accounts.register(registration).await?;
    session.persist_user(user.id)?;
    info!(user_id = %user.id, is_admin = user.is_admin, "registered with email");
    Ok(see_other("/"))
}

/// Form carrying only the CSRF token.
#[derive(Debug, Default, Deserialize)]
pub struct CsrfForm {
    pub csrf_token: Option<String>,
}

#[post("/logout.php")]
pub async fn logout(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<CsrfForm>,
) -> ApiResult<HttpResponse> {
    session.verify_csrf(presented_csrf(&req, form.csrf_token.as_deref()), state.now())?;
    session.purge();
    Ok(see_other("/"))
}

/// Register the sign-in pages on `cfg`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(login_page)
        .service(login_submit)
        .service(auth_callback)
        .service(register_callback)
        .service(register_page)
        .service(register_submit)
        .service(logout);
}

#[cfg(test)]
#[path = "login_tests.rs"]
mod tests;
