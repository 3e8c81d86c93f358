//! Read-only page view models and the helpers shared by every page.
//!
//! ```text
//! GET /               dashboard
//! GET /jobs?page=2    job list
//! GET /job/{id}       job detail
//! GET /user/{id}      driver profile
//! GET /profile.php    redirect to the signed-in driver's profile
//! GET /stats          leaderboards
//! ```
//!
//! Pages answer with JSON: the data a template would render, plus the
//! viewer and the session's CSRF token for any form on the page.

use actix_web::http::header::LOCATION;
use actix_web::{HttpResponse, get, web};
use serde::{Deserialize, Serialize};

use crate::domain::{Error, JobId, PageRequest, User, UserId};

use super::ApiResult;
use super::current_user::{CurrentUser, Viewer};
use super::session::SessionContext;
use super::state::HttpState;

/// Envelope around every page's content.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView<T> {
    /// Signed-in user, if any.
    pub viewer: Option<User>,
    /// Token forms on this page must echo back.
    pub csrf_token: String,
    #[serde(flatten)]
    pub content: T,
}

/// Render `content` as a page for `viewer`.
pub(crate) fn render<T: Serialize>(
    state: &HttpState,
    session: &SessionContext,
    viewer: Option<User>,
    content: T,
) -> ApiResult<HttpResponse> {
    let token = session.csrf_token(state.now())?;
    Ok(HttpResponse::Ok().json(PageView {
        viewer,
        csrf_token: token.value().to_owned(),
        content,
    }))
}

/// `303 See Other` to `location`.
pub(crate) fn see_other(location: impl Into<String>) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((LOCATION, location.into()))
        .finish()
}

/// `?page=` query parameter.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
}

#[get("/")]
pub async fn dashboard(
    state: web::Data<HttpState>,
    session: SessionContext,
    Viewer(viewer): Viewer,
) -> ApiResult<HttpResponse> {
    let dashboard = state.reports.dashboard().await?;
    render(&state, &session, viewer, dashboard)
}

#[get("/jobs")]
pub async fn jobs(
    state: web::Data<HttpState>,
    session: SessionContext,
    Viewer(viewer): Viewer,
    query: web::Query<PageQuery>,
) -> ApiResult<HttpResponse> {
    let page = state.reports.jobs_page(PageRequest::new(query.page)).await?;
    render(&state, &session, viewer, page)
}

#[get("/job/{id}")]
pub async fn job_detail(
    state: web::Data<HttpState>,
    session: SessionContext,
    Viewer(viewer): Viewer,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let id = JobId::new(path.into_inner()).map_err(|_| job_not_found())?;
    let detail = state
        .reports
        .job_detail(id)
        .await?
        .ok_or_else(job_not_found)?;
    render(&state, &session, viewer, detail)
}

fn job_not_found() -> Error {
    Error::not_found("Job not found.")
}

fn user_not_found() -> Error {
    Error::not_found("User not found.")
}

#[get("/user/{id}")]
pub async fn user_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    Viewer(viewer): Viewer,
    path: web::Path<i64>,
    query: web::Query<PageQuery>,
) -> ApiResult<HttpResponse> {
    let id = UserId::new(path.into_inner()).map_err(|_| user_not_found())?;
    let profile = state
        .reports
        .user_profile(id, PageRequest::new(query.page))
        .await?
        .ok_or_else(user_not_found)?;
    render(&state, &session, viewer, profile)
}

#[get("/profile.php")]
pub async fn own_profile(CurrentUser(user): CurrentUser) -> HttpResponse {
    see_other(format!("/user/{}", user.id))
}

#[get("/stats")]
pub async fn stats(
    state: web::Data<HttpState>,
    session: SessionContext,
    Viewer(viewer): Viewer,
) -> ApiResult<HttpResponse> {
    let leaderboards = state.reports.leaderboards().await?;
    render(&state, &session, viewer, leaderboards)
}

/// Register the read-only pages on `cfg`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(dashboard)
        .service(jobs)
        .service(job_detail)
        .service(user_profile)
        .service(own_profile)
        .service(stats);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use serde_json::Value;

    use super::*;
    use crate::domain::ports::{MockAccountCommand, MockReportsQuery};
    use crate::domain::test_fixtures::{STEAM_ID, user};
    use crate::domain::{JobListPage, PageRequest};
    use crate::inbound::http::test_utils::{http_state, test_session_middleware};

    async fn get(state: web::Data<HttpState>, uri: &str) -> (StatusCode, Option<String>, Value) {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .app_data(state)
                .configure(configure),
        )
        .await;
        let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        let status = res.status();
        let location = res
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = test::read_body(res).await;
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, location, json)
    }

    #[actix_web::test]
    async fn dashboard_carries_csrf_token_and_anonymous_viewer() {
        let (status, _, body) = get(http_state(|_| {}), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["viewer"], Value::Null);
        assert_eq!(body["csrfToken"].as_str().map(str::len), Some(64));
        assert!(body["recentJobs"].is_array());
    }

    #[actix_web::test]
    async fn job_list_clamps_the_page_number() {
        let mut reports = MockReportsQuery::new();
        reports
            .expect_jobs_page()
            .withf(|page| page.page() == 1)
            .times(1)
            .returning(|page: PageRequest| {
                Ok(JobListPage {
                    jobs: Vec::new(),
                    page: page.page(),
                    total_pages: 1,
                    total_jobs: 0,
                })
            });
        let state = http_state(|ports| ports.reports = Arc::new(reports));

        let (status, _, body) = get(state, "/jobs?page=-4").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["page"], 1);
        assert_eq!(body["totalPages"], 1);
    }

    #[actix_web::test]
    async fn missing_job_is_not_found() {
        let (status, _, body) = get(http_state(|_| {}), "/job/99").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Job not found.");
    }

    #[actix_web::test]
    async fn non_positive_user_id_is_not_found() {
        let (status, _, _) = get(http_state(|_| {}), "/user/0").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn own_profile_requires_login() {
        let mut accounts = MockAccountCommand::new();
        accounts
            .expect_current_user()
            .returning(|id| Ok(Some(user(id.as_i64(), Some(STEAM_ID)))));
        let state = http_state(|ports| ports.accounts = Arc::new(accounts));

        let (status, location, _) = get(state, "/profile.php").await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(location.as_deref(), Some("/login.php?return=%2Fprofile.php"));
    }
}
