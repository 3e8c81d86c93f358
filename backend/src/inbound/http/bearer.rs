//! Machine API credentials.
//!
//! The tracker client authenticates toll and fine reports with the API token
//! from the user's settings page. It may send it as `Authorization: Bearer`,
//! as a bare `Authorization` value, as `X-Auth-Token`, or in the body field
//! `auth_token`, checked in that order.

use actix_web::HttpRequest;
use actix_web::http::header::AUTHORIZATION;

use crate::domain::{ApiToken, Error};

/// Header checked after `Authorization`.
pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

const BEARER_SCHEME: &str = "bearer";

fn header_value<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
    req.headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Drop a `Bearer` scheme; a scheme with no credential leaves nothing.
fn strip_bearer(raw: &str) -> &str {
    let (scheme, rest) = raw.split_once(char::is_whitespace).unwrap_or((raw, ""));
    if scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        rest.trim()
    } else {
        raw
    }
}

/// Resolve the API token for a request; `401` when none is supplied.
pub fn api_token(req: &HttpRequest, body_token: Option<&str>) -> Result<ApiToken, Error> {
    let candidate = header_value(req, AUTHORIZATION.as_str())
        .map(strip_bearer)
        .filter(|token| !token.is_empty())
        .or_else(|| header_value(req, AUTH_TOKEN_HEADER))
        .or_else(|| body_token.map(str::trim).filter(|token| !token.is_empty()));
    candidate
        .and_then(|token| ApiToken::new(token).ok())
        .ok_or_else(|| Error::unauthorized("Missing auth token"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use actix_web::test::TestRequest;
    use rstest::rstest;

    #[rstest]
    #[case(Some("Bearer abc123"), None, None, "abc123")]
    #[case(Some("bearer abc123"), None, None, "abc123")]
    #[case(Some("raw-token"), None, None, "raw-token")]
    #[case(None, Some("from-header"), Some("from-body"), "from-header")]
    #[case(None, None, Some("from-body"), "from-body")]
    #[case(Some("Bearer "), Some("fallback"), None, "fallback")]
    #[case(Some("bearer"), None, Some("from-body"), "from-body")]
    #[case(Some("BEARER   spaced"), None, None, "spaced")]
    fn resolves_in_priority_order(
        #[case] authorization: Option<&str>,
        #[case] x_auth: Option<&str>,
        #[case] body: Option<&str>,
        #[case] expected: &str,
    ) {
        let mut builder = TestRequest::default();
        if let Some(value) = authorization {
            builder = builder.insert_header((AUTHORIZATION, value));
        }
        if let Some(value) = x_auth {
            builder = builder.insert_header((AUTH_TOKEN_HEADER, value));
        }
        let req = builder.to_http_request();

        let token = api_token(&req, body).expect("token resolved");
        assert_eq!(token.expose(), expected);
    }

    #[rstest]
    fn bare_scheme_alone_is_unauthorised() {
        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer "))
            .to_http_request();
        let error = api_token(&req, None).expect_err("scheme is not a token");
        assert_eq!(error.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    fn missing_token_is_unauthorised() {
        let req = TestRequest::default().to_http_request();
        let error = api_token(&req, Some("  ")).expect_err("no token");
        assert_eq!(error.code(), ErrorCode::Unauthorized);
        assert_eq!(error.message(), "Missing auth token");
    }
}
