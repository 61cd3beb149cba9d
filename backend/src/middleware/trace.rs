//! Request correlation and access logging.
//!
//! [`Trace`] gives every request a [`TraceId`], reusing a well-formed
//! `trace-id` header from the caller when present. The identifier is in scope
//! for the whole handler, is echoed back as a response header, and is
//! recorded on a `request` span together with the final status and latency.

use std::task::{Context, Poll};
use std::time::Instant;

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderName, HeaderValue};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{Instrument, info, info_span, warn};

use crate::domain::{TRACE_ID_HEADER, TraceId};

/// Correlation middleware.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use courier_backend::Trace;
///
/// let app = App::new().wrap(Trace);
/// ```
#[derive(Clone, Copy, Debug, Default)]
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

fn inbound_trace_id(req: &ServiceRequest) -> Option<TraceId> {
    req.headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(TraceId::from_header)
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
        let trace_id = inbound_trace_id(&req).unwrap_or_else(TraceId::generate);
        let span = info_span!(
            "request",
            %trace_id,
            method = %req.method(),
            path = %req.path(),
        );
        let started = Instant::now();
        let inner = TraceId::scope(trace_id, self.service.call(req));

        Box::pin(
            async move {
                let mut res = inner.await?;
                info!(
                    status = res.status().as_u16(),
                    elapsed_ms = started.elapsed().as_millis(),
                    "request completed"
                );
                match HeaderValue::from_str(&trace_id.to_string()) {
                    Ok(value) => {
                        res.headers_mut()
                            .insert(HeaderName::from_static(TRACE_ID_HEADER), value);
                    }
                    Err(error) => warn!(%error, "trace id is not a valid header value"),
                }
                Ok(res)
            }
            .instrument(span),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ApiResult, Error as DomainError};
    use actix_web::body::BoxBody;
    use actix_web::{App, HttpResponse, test as actix_test, web};

    const CLIENT_ID: &str = "6f9619ff-8b86-d011-b42d-00cf4fc964ff";

    async fn echo_current() -> HttpResponse {
        let id = TraceId::current().map(|id| id.to_string()).unwrap_or_default();
        HttpResponse::Ok().body(id)
    }

    async fn missing_awb() -> ApiResult<HttpResponse> {
        Err(DomainError::not_found("no such AWB"))
    }

    async fn call(inbound: Option<&str>, error: bool) -> (ServiceResponse<BoxBody>, String) {
        let route = if error {
            web::get().to(missing_awb)
        } else {
            web::get().to(echo_current)
        };
        let app = actix_test::init_service(App::new().wrap(Trace).route("/", route)).await;
        let mut req = actix_test::TestRequest::get().uri("/");
        if let Some(value) = inbound {
            req = req.insert_header((TRACE_ID_HEADER, value));
        }
        let res = actix_test::call_service(&app, req.to_request()).await;
        let header = res
            .headers()
            .get(TRACE_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .expect("trace id header")
            .to_owned();
        (res, header)
    }

    #[actix_web::test]
    async fn handler_sees_the_echoed_id() {
        let (res, header) = call(None, false).await;
        assert!(header.parse::<TraceId>().is_ok());
        let body = actix_test::read_body(res).await;
        assert_eq!(body, header.as_bytes());
    }

    #[actix_web::test]
    async fn valid_client_id_is_reused() {
        let (_, header) = call(Some(CLIENT_ID), false).await;
        assert_eq!(header, CLIENT_ID);
    }

    #[actix_web::test]
    async fn malformed_client_id_is_replaced() {
        let (_, header) = call(Some("abc"), false).await;
        assert_ne!(header, "abc");
        assert!(header.parse::<TraceId>().is_ok());
    }

    #[actix_web::test]
    async fn error_body_carries_the_same_id() {
        let (res, header) = call(Some(CLIENT_ID), true).await;
        let body: DomainError = actix_test::read_body_json(res).await;
        assert_eq!(body.trace_id(), Some(header.as_str()));
    }
}
