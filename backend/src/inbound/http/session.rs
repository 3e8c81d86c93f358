//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Wraps the Actix cookie session so handlers only deal with domain-level
//! operations: the signed-in user id, the CSRF token bound to the session
//! and the one-shot login error flash.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use chrono::{DateTime, Utc};
use futures_util::future::LocalBoxFuture;
use tracing::{debug, warn};

use crate::domain::{CsrfError, CsrfToken, Error, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const CSRF_KEY: &str = "csrf";
pub(crate) const LOGIN_ERROR_KEY: &str = "login_error";

/// Header browsers may use instead of the `csrf_token` form field.
pub const CSRF_HEADER: &str = "X-CSRF-Token";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

fn read_failure(error: impl std::fmt::Display) -> Error {
    Error::internal(format!("failed to read session: {error}"))
}

fn write_failure(error: impl std::fmt::Display) -> Error {
    Error::internal(format!("failed to persist session: {error}"))
}

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the authenticated user's id and rotate the session key.
    pub fn persist_user(&self, user_id: UserId) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, user_id.as_i64())
            .map_err(write_failure)
    }

    /// Fetch the current user id from the session, if present.
    pub fn user_id(&self) -> Result<Option<UserId>, Error> {
        let raw = self.0.get::<i64>(USER_ID_KEY).map_err(read_failure)?;
        match raw.map(UserId::new) {
            Some(Ok(id)) => Ok(Some(id)),
            Some(Err(error)) => {
                warn!(%error, "invalid user id in session cookie");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Require an authenticated user id or return `401 Unauthorized`.
    pub fn require_user_id(&self) -> Result<UserId, Error> {
        self.user_id()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// The session's CSRF token, issuing a new one when absent or expired.
    pub fn csrf_token(&self, now: DateTime<Utc>) -> Result<CsrfToken, Error> {
        let current = self.0.get::<CsrfToken>(CSRF_KEY).map_err(read_failure)?;
        if let Some(token) = current.filter(|token| !token.is_expired(now)) {
            return Ok(token);
        }
        let token = CsrfToken::generate(now);
        self.0.insert(CSRF_KEY, &token).map_err(write_failure)?;
        Ok(token)
    }

    /// Check a submitted token against the one bound to the session.
    ///
    /// Any failure is `403 Forbidden`.
    pub fn verify_csrf(&self, presented: Option<&str>, now: DateTime<Utc>) -> Result<(), Error> {
        let stored = self.0.get::<CsrfToken>(CSRF_KEY).map_err(read_failure)?;
        let outcome = match (stored, presented) {
            (Some(token), Some(value)) => token.verify(value, now),
            _ => Err(CsrfError::Missing),
        };
        outcome.map_err(|error| {
            debug!(%error, "csrf check failed");
            Error::forbidden("Invalid CSRF token.")
        })
    }

    /// Store a message for the next login page view.
    pub fn set_login_error(&self, message: &str) -> Result<(), Error> {
        self.0
            .insert(LOGIN_ERROR_KEY, message)
            .map_err(write_failure)
    }

    /// Remove and return the pending login error.
    pub fn take_login_error(&self) -> Result<Option<String>, Error> {
        self.0
            .remove_as::<String>(LOGIN_ERROR_KEY)
            .transpose()
            .map_err(read_failure)
    }

    /// Drop every value and expire the cookie.
    pub fn purge(&self) {
        self.0.purge();
    }
}

/// Token submitted with a state-changing request: form field first, then the
/// `X-CSRF-Token` header.
pub fn presented_csrf<'a>(req: &'a HttpRequest, field: Option<&'a str>) -> Option<&'a str> {
    field.filter(|value| !value.is_empty()).or_else(|| {
        req.headers()
            .get(CSRF_HEADER)
            .and_then(|value| value.to_str().ok())
    })
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_fixtures::fixed_now;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test as actix_test, web};
    use chrono::Duration;

    fn session_test_app() -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new().wrap(crate::inbound::http::test_utils::test_session_middleware())
    }

    fn session_cookie(
        res: &actix_web::dev::ServiceResponse,
    ) -> actix_web::cookie::Cookie<'static> {
        res.response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie set")
            .into_owned()
    }

    #[actix_web::test]
    async fn round_trips_user_id() {
        let app = actix_test::init_service(
            session_test_app()
                .route(
                    "/set",
                    web::get().to(|session: SessionContext| async move {
                        let id = UserId::new(42).expect("fixture id");
                        session.persist_user(id)?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    }),
                )
                .route(
                    "/get",
                    web::get().to(|session: SessionContext| async move {
                        let id = session.require_user_id()?;
                        Ok::<_, Error>(HttpResponse::Ok().body(id.to_string()))
                    }),
                ),
        )
        .await;

        let set_res =
            actix_test::call_service(&app, actix_test::TestRequest::get().uri("/set").to_request()).await;
        assert_eq!(set_res.status(), StatusCode::OK);
        let cookie = session_cookie(&set_res);

        let get_res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/get").cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(get_res.status(), StatusCode::OK);
        assert_eq!(actix_test::read_body(get_res).await, "42");
    }

    #[actix_web::test]
    async fn missing_user_is_unauthorised() {
        let app = actix_test::init_service(session_test_app().route(
            "/require",
            web::get().to(|session: SessionContext| async move {
                let _ = session.require_user_id()?;
                Ok::<_, Error>(HttpResponse::Ok())
            }),
        ))
        .await;

        let res =
            actix_test::call_service(&app, actix_test::TestRequest::get().uri("/require").to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn tampered_user_id_is_ignored() {
        let app = actix_test::init_service(
            session_test_app()
                .route(
                    "/set-invalid",
                    web::get().to(|session: Session| async move {
                        session.insert(USER_ID_KEY, -5_i64).expect("set invalid id");
                        HttpResponse::Ok()
                    }),
                )
                .route(
                    "/require",
                    web::get().to(|session: SessionContext| async move {
                        let _ = session.require_user_id()?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    }),
                ),
        )
        .await;

        let set_res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/set-invalid").to_request(),
        )
        .await;
        let cookie = session_cookie(&set_res);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/require")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn csrf_token_is_stable_and_verifies() {
        let app = actix_test::init_service(
            session_test_app()
                .route(
                    "/issue",
                    web::get().to(|session: SessionContext| async move {
                        let token = session.csrf_token(fixed_now())?;
                        Ok::<_, Error>(HttpResponse::Ok().body(token.value().to_owned()))
                    }),
                )
                .route(
                    "/check/{value}",
                    web::post().to(
                        |session: SessionContext, value: web::Path<String>| async move {
                            let later = fixed_now() + Duration::minutes(5);
                            session.verify_csrf(Some(value.as_str()), later)?;
                            Ok::<_, Error>(HttpResponse::Ok())
                        },
                    ),
                ),
        )
        .await;

        let issued =
            actix_test::call_service(&app, actix_test::TestRequest::get().uri("/issue").to_request()).await;
        let cookie = session_cookie(&issued);
        let token = String::from_utf8(actix_test::read_body(issued).await.to_vec()).expect("utf8");
        assert_eq!(token.len(), 64);

        let ok = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/check/{token}"))
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(ok.status(), StatusCode::OK);

        let forged = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/check/forged")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(forged.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn login_error_is_read_once() {
        let app = actix_test::init_service(
            session_test_app()
                .route(
                    "/fail",
                    web::get().to(|session: SessionContext| async move {
                        session.set_login_error("Steam login failed.")?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    }),
                )
                .route(
                    "/take",
                    web::get().to(|session: SessionContext| async move {
                        let first = session.take_login_error()?.unwrap_or_default();
                        let second = session.take_login_error()?;
                        assert!(second.is_none(), "flash is consumed by the first read");
                        Ok::<_, Error>(HttpResponse::Ok().body(first))
                    }),
                ),
        )
        .await;

        let failed =
            actix_test::call_service(&app, actix_test::TestRequest::get().uri("/fail").to_request()).await;
        let cookie = session_cookie(&failed);
        let taken = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/take").cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(actix_test::read_body(taken).await, "Steam login failed.");
    }

    #[test]
    fn header_token_is_used_when_field_is_blank() {
        let req = actix_test::TestRequest::default()
            .insert_header((CSRF_HEADER, "from-header"))
            .to_http_request();
        assert_eq!(presented_csrf(&req, Some("")), Some("from-header"));
        assert_eq!(presented_csrf(&req, Some("from-field")), Some("from-field"));
    }
}
