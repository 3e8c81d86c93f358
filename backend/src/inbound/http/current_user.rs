//! Per-request user resolution for page handlers.
//!
//! The session only stores the user id; the row is loaded on every request
//! so profile edits and admin changes apply immediately.
//!
//! - [`Viewer`]: anyone, signed in or not.
//! - [`CurrentUser`]: signed in, otherwise `303` to `/login.php?return=…`.
//! - [`AdminUser`]: signed-in administrator, otherwise `403`.

use actix_session::SessionExt;
use actix_web::error::InternalError;
use actix_web::http::header::LOCATION;
use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use url::form_urlencoded;

use crate::domain::{Error, User};

use super::session::SessionContext;
use super::state::HttpState;

/// Login page a guarded request is sent to.
pub const LOGIN_PATH: &str = "/login.php";

/// `/login.php?return=<encoded path and query>`.
pub fn login_redirect_location(req: &HttpRequest) -> String {
    let target = req
        .uri()
        .path_and_query()
        .map_or_else(|| req.path().to_owned(), |pq| pq.as_str().to_owned());
    let encoded: String = form_urlencoded::byte_serialize(target.as_bytes()).collect();
    format!("{LOGIN_PATH}?return={encoded}")
}

fn login_redirect(req: &HttpRequest) -> actix_web::Error {
    let response = HttpResponse::SeeOther()
        .insert_header((LOCATION, login_redirect_location(req)))
        .finish();
    InternalError::from_response("login required", response).into()
}

async fn resolve_user(state: &HttpState, session: &SessionContext) -> Result<Option<User>, Error> {
    let Some(id) = session.user_id()? else {
        return Ok(None);
    };
    state.accounts.current_user(id).await
}

fn request_parts(req: &HttpRequest) -> Result<(web::Data<HttpState>, SessionContext), Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .cloned()
        .ok_or_else(|| Error::internal("HTTP state is not configured"))?;
    Ok((state, SessionContext::new(req.get_session())))
}

/// The signed-in user, if any.
pub struct Viewer(pub Option<User>);

impl FromRequest for Viewer {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let parts = request_parts(req);
        Box::pin(async move {
            let (state, session) = parts?;
            Ok(Self(resolve_user(&state, &session).await?))
        })
    }
}

/// A signed-in user; anonymous requests are redirected to the login page.
pub struct CurrentUser(pub User);

impl FromRequest for CurrentUser {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let parts = request_parts(req);
        let req = req.clone();
        Box::pin(async move {
            let (state, session) = parts?;
            match resolve_user(&state, &session).await? {
                Some(user) => Ok(Self(user)),
                None => Err(login_redirect(&req)),
            }
        })
    }
}

/// A signed-in administrator.
pub struct AdminUser(pub User);

impl FromRequest for AdminUser {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let current = CurrentUser::from_request(req, payload);
        Box::pin(async move {
            let CurrentUser(user) = current.await?;
            if user.is_admin {
                Ok(Self(user))
            } else {
                Err(Error::forbidden("Administrator access required.").into())
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockAccountCommand;
    use crate::domain::test_fixtures::{STEAM_ID, user};
    use crate::domain::ErrorCode;
    use crate::inbound::http::test_utils::{
        http_state, session_from, session_request, session_routes, test_session_middleware,
    };
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use rstest::rstest;

    async fn call(accounts: MockAccountCommand, uri: &str, signed_in: bool) -> HttpResponseParts {
        let state = http_state(|ports| ports.accounts = std::sync::Arc::new(accounts));
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .app_data(state)
                .configure(session_routes)
                .route(
                    "/viewer",
                    web::get().to(|viewer: Viewer| async move {
                        HttpResponse::Ok().body(viewer.0.map(|u| u.username).unwrap_or_default())
                    }),
                )
                .route(
                    "/settings.php",
                    web::get().to(|CurrentUser(user): CurrentUser| async move {
                        HttpResponse::Ok().body(user.username)
                    }),
                )
                .route(
                    "/admin_settings.php",
                    web::get().to(|AdminUser(user): AdminUser| async move {
                        HttpResponse::Ok().body(user.username)
                    }),
                ),
        )
        .await;

        let mut request = test::TestRequest::get().uri(uri);
        if signed_in {
            let opened = test::call_service(&app, session_request(Some(3)).to_request()).await;
            let (cookie, _) = session_from(opened).await;
            request = request.cookie(cookie);
        }
        let res = test::call_service(&app, request.to_request()).await;
        let status = res.status();
        let location = res
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = String::from_utf8(test::read_body(res).await.to_vec()).expect("utf8");
        HttpResponseParts {
            status,
            location,
            body,
        }
    }

    struct HttpResponseParts {
        status: StatusCode,
        location: Option<String>,
        body: String,
    }

    fn accounts_returning(is_admin: bool) -> MockAccountCommand {
        let mut accounts = MockAccountCommand::new();
        accounts.expect_current_user().returning(move |id| {
            let mut found = user(id.as_i64(), Some(STEAM_ID));
            found.is_admin = is_admin;
            Ok(Some(found))
        });
        accounts
    }

    #[actix_web::test]
    async fn anonymous_login_required_page_redirects_with_return_path() {
        let res = call(MockAccountCommand::new(), "/settings.php?tab=2", false).await;
        assert_eq!(res.status, StatusCode::SEE_OTHER);
        assert_eq!(
            res.location.as_deref(),
            Some("/login.php?return=%2Fsettings.php%3Ftab%3D2")
        );
    }

    #[actix_web::test]
    async fn signed_in_user_reaches_login_required_page() {
        let res = call(accounts_returning(false), "/settings.php", true).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body, "driver3");
    }

    #[rstest]
    #[case(false, StatusCode::FORBIDDEN)]
    #[case(true, StatusCode::OK)]
    #[actix_web::test]
    async fn admin_pages_require_the_flag(#[case] is_admin: bool, #[case] expected: StatusCode) {
        let res = call(accounts_returning(is_admin), "/admin_settings.php", true).await;
        assert_eq!(res.status, expected);
        if !is_admin {
            let error: Error = serde_json::from_str(&res.body).expect("error envelope");
            assert_eq!(error.code(), ErrorCode::Forbidden);
        }
    }

    #[actix_web::test]
    async fn viewer_is_anonymous_when_the_user_row_is_gone() {
        let mut accounts = MockAccountCommand::new();
        accounts.expect_current_user().returning(|_| Ok(None));
        let res = call(accounts, "/viewer", true).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body, "");
    }
}
