//! Request tracing middleware.
//!
//! Every request runs inside a `request` span carrying a fresh UUID trace id.
//! The id lives in task-local storage for the duration of the handler so
//! domain errors raised there embed it, and it is echoed back in the
//! `trace-id` response header. Once the handler finishes, one completion
//! event is logged with the status code and latency; server errors are
//! logged at `warn`.
//!
//! Task-locals do not follow spawned tasks. Wrap spawned work in
//! [`TraceId::scope`] to keep the id.

use std::task::{Context, Poll};
use std::time::Instant;

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderName, HeaderValue};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{Instrument, Span, error, info, info_span, warn};

use crate::domain::{TRACE_ID_HEADER, TraceId};

/// Middleware factory assigning a trace id to every request.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use mytrucktracker::Trace;
///
/// let app = App::new().wrap(Trace);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Trace;

impl<S, B> Transform<S, ServiceRequest> for Trace
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TraceMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TraceMiddleware { service }))
    }
}

/// Service produced by [`Trace`].
pub struct TraceMiddleware<S> {
    service: S,
}

fn request_span(req: &ServiceRequest, trace_id: TraceId) -> Span {
    let client = req
        .headers()
        .get(actix_web::http::header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-");
    info_span!(
        "request",
        trace_id = %trace_id,
        method = %req.method(),
        path = req.path(),
        client
    )
}

fn attach_header<B>(res: &mut ServiceResponse<B>, trace_id: TraceId) {
    match HeaderValue::from_str(&trace_id.to_string()) {
        Ok(value) => {
            res.headers_mut()
                .insert(HeaderName::from_static(TRACE_ID_HEADER), value);
        }
        Err(error) => error!(%error, "trace id is not a valid header value"),
    }
}

impl<S, B> Service<ServiceRequest> for TraceMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let trace_id = TraceId::generate();
        let span = request_span(&req, trace_id);
        let started = Instant::now();
        let fut = self.service.call(req);
        let handled = async move {
            let mut res = fut.await?;
            attach_header(&mut res, trace_id);
            let status = res.status();
            let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
            if status.is_server_error() {
                warn!(status = status.as_u16(), elapsed_ms, "request failed");
            } else {
                info!(status = status.as_u16(), elapsed_ms, "request completed");
            }
            Ok(res)
        };
        Box::pin(TraceId::scope(trace_id, handled.instrument(span)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::BoxBody;
    use actix_web::{App, HttpResponse, Responder, test, web};
    use rstest::rstest;

    use crate::domain::{ApiResult, Error};

    async fn serve<F, Fut, R>(handler: F) -> (ServiceResponse<BoxBody>, String)
    where
        F: Fn() -> Fut + Clone + 'static,
        Fut: Future<Output = R> + 'static,
        R: Responder + 'static,
    {
        let app = test::init_service(
            App::new()
                .wrap(Trace)
                .route("/api/finish_job.php", web::post().to(handler)),
        )
        .await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/finish_job.php")
                .to_request(),
        )
        .await;
        let trace_id = res
            .headers()
            .get(TRACE_ID_HEADER)
            .expect("trace id header")
            .to_str()
            .expect("ascii header")
            .to_owned();
        (res, trace_id)
    }

    #[rstest]
    #[actix_web::test]
    async fn handlers_see_the_echoed_trace_id() {
        let (res, trace_id) = serve(|| async {
            let id = TraceId::current().expect("trace id in scope");
            HttpResponse::Ok().body(id.to_string())
        })
        .await;
        let body = test::read_body(res).await;
        assert_eq!(std::str::from_utf8(&body).expect("utf8 body"), trace_id);
    }

    #[rstest]
    #[actix_web::test]
    async fn domain_errors_carry_the_request_trace_id() {
        let (res, trace_id) = serve(|| async {
            ApiResult::<HttpResponse>::Err(Error::not_found(
                "Job not found or user does not match.",
            ))
        })
        .await;
        let body: Error = test::read_body_json(res).await;
        assert_eq!(body.trace_id(), Some(trace_id.as_str()));
    }

    #[rstest]
    #[actix_web::test]
    async fn each_request_gets_its_own_trace_id() {
        let (_, first) = serve(|| async { HttpResponse::NoContent().finish() }).await;
        let (_, second) = serve(|| async { HttpResponse::NoContent().finish() }).await;
        assert_ne!(first, second);
    }
}
