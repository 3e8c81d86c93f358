//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use actix_web::{HttpResponse, test, web};
use serde::Deserialize;

use crate::domain::ports::{
    FixtureJobIngestionCommand, FixtureReportsQuery, MockAccountCommand, MockProfileCommand,
    MockSiteAdminCommand, MockTrackerInstallCommand, MockVtcCommand,
};
use crate::domain::test_fixtures::{fixture_clock, user_id};

use super::ApiResult;
use super::session::SessionContext;
use super::state::{HttpState, HttpStatePorts};

/// Public origin used by handler tests.
pub const TEST_BASE_URL: &str = "http://tracker.test";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Handler state whose ports panic unless a test installs its own.
///
/// Read and ingestion ports default to fixtures; the rest are bare mocks so
/// an unexpected call fails the test.
pub fn http_state(customise: impl FnOnce(&mut HttpStatePorts)) -> web::Data<HttpState> {
    let mut ports = HttpStatePorts {
        jobs: Arc::new(FixtureJobIngestionCommand),
        installs: Arc::new(MockTrackerInstallCommand::new()),
        accounts: Arc::new(MockAccountCommand::new()),
        profiles: Arc::new(MockProfileCommand::new()),
        admin: Arc::new(MockSiteAdminCommand::new()),
        vtcs: Arc::new(MockVtcCommand::new()),
        reports: Arc::new(FixtureReportsQuery),
    };
    customise(&mut ports);
    web::Data::new(HttpState::new(ports, fixture_clock(), TEST_BASE_URL))
}

/// The `session` cookie set by a response, if any.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
}

const TEST_SESSION_PATH: &str = "/test/session";

#[derive(Deserialize)]
struct SessionQuery {
    user: Option<i64>,
}

async fn open_test_session(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<SessionQuery>,
) -> ApiResult<HttpResponse> {
    if let Some(id) = query.user {
        session.persist_user(user_id(id))?;
    }
    let token = session.csrf_token(state.now())?;
    Ok(HttpResponse::Ok().body(token.value().to_owned()))
}

/// Mount the route behind [`session_request`].
pub fn session_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(TEST_SESSION_PATH, web::get().to(open_test_session));
}

/// Request that opens a session, signed in as `user` when given.
pub fn session_request(user: Option<i64>) -> test::TestRequest {
    let uri = match user {
        Some(id) => format!("{TEST_SESSION_PATH}?user={id}"),
        None => TEST_SESSION_PATH.to_owned(),
    };
    test::TestRequest::get().uri(&uri)
}

/// Session cookie and CSRF token from a [`session_request`] response.
pub async fn session_from<B: MessageBody>(res: ServiceResponse<B>) -> (Cookie<'static>, String) {
    let cookie = session_cookie(&res).expect("session cookie");
    let body = test::read_body(res).await;
    let token = String::from_utf8(body.to_vec()).expect("utf8 token");
    (cookie, token)
}
