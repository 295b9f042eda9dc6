//! Per-request trace context.
//!
//! `RequestTrace` assigns every request a UUID trace id, stores it in request
//! extensions as [`TraceId`] and in a task-local, opens a `request` span
//! carrying `trace_id`, `method`, `path` and (once verified) `user_id`, and
//! echoes the id in the `x-request-id` response header.
//!
//! Errors that escape the inner chain are rendered while the task-local is
//! still set, so the error body's `trace_id` matches the request. Wire it
//! outermost:
//!
//! App::new()
//!     .wrap(StructuredLogger)
//!     .wrap(RequestTrace)
//!     // routes...

use std::future::{ready, Future, Ready};

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::error::InternalError;
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::{Error, HttpMessage};
use futures_util::future::LocalBoxFuture;
use tokio::task_local;
use tracing::{field, info_span, Instrument};
use uuid::Uuid;

task_local! {
    static TRACE_ID: String;
}

const REQUEST_ID: &str = "x-request-id";

/// Trace id of the current request, stored in request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceId(pub String);

/// Trace id for the current task, or `"unknown"` outside a request.
pub fn trace_id() -> String {
    TRACE_ID
        .try_with(|id| id.clone())
        .unwrap_or_else(|_| "unknown".to_string())
}

/// Run a future with `trace_id` as the current task's trace id.
pub async fn with_trace_id<F>(trace_id: String, future: F) -> F::Output
where
    F: Future,
{
    TRACE_ID.scope(trace_id, future).await
}

pub struct RequestTrace;

impl<S, B> Transform<S, ServiceRequest> for RequestTrace
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestTraceMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestTraceMiddleware { service }))
    }
}

pub struct RequestTraceMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestTraceMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let trace_id = Uuid::new_v4().to_string();
        req.extensions_mut().insert(TraceId(trace_id.clone()));

        let span = info_span!(
            "request",
            trace_id = %trace_id,
            method = %req.method(),
            path = %req.path(),
            user_id = field::Empty,
        );

        let header_value = HeaderValue::from_str(&trace_id)
            .unwrap_or_else(|_| HeaderValue::from_static("invalid-uuid"));

        // No clone of the request may outlive this call: routing needs sole
        // ownership of it to fill in path parameters.
        let fut = self.service.call(req);

        Box::pin(
            with_trace_id(trace_id, async move {
                match fut.await {
                    Ok(mut res) => {
                        res.headers_mut()
                            .insert(HeaderName::from_static(REQUEST_ID), header_value);
                        Ok(res)
                    }
                    Err(err) => {
                        let mut response = err.error_response();
                        response
                            .headers_mut()
                            .insert(HeaderName::from_static(REQUEST_ID), header_value);
                        Err(InternalError::from_response(err.to_string(), response).into())
                    }
                }
            })
            .instrument(span),
        )
    }
}

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;
    use actix_web::{test, web, App, HttpResponse};

    use super::*;
    use crate::error::AppError;

    #[tokio::test]
    async fn test_trace_id_outside_context() {
        assert_eq!(trace_id(), "unknown");
    }

    #[tokio::test]
    async fn test_nested_trace_contexts() {
        let result = with_trace_id("outer".to_string(), async {
            assert_eq!(trace_id(), "outer");

            let inner = with_trace_id("inner".to_string(), async { trace_id() }).await;

            assert_eq!(trace_id(), "outer");
            inner
        })
        .await;

        assert_eq!(result, "inner");
        assert_eq!(trace_id(), "unknown");
    }

    async fn echo_trace(req: actix_web::HttpRequest) -> HttpResponse {
        let from_ext = req
            .extensions()
            .get::<TraceId>()
            .map(|t| t.0.clone())
            .unwrap_or_default();
        HttpResponse::Ok().body(format!("{from_ext}|{}", trace_id()))
    }

    async fn fail() -> Result<HttpResponse, AppError> {
        Err(AppError::MissingCredential)
    }

    #[actix_web::test]
    async fn sets_request_id_header_matching_extension_and_task_local() {
        let app = test::init_service(
            App::new()
                .wrap(RequestTrace)
                .route("/echo", web::get().to(echo_trace)),
        )
        .await;

        let req = test::TestRequest::get().uri("/echo").to_request();
        let resp = test::call_service(&app, req).await;
        let header = resp
            .headers()
            .get("x-request-id")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        let body = test::read_body(resp).await;
        let body = String::from_utf8(body.to_vec()).unwrap();

        assert_eq!(body, format!("{header}|{header}"));
    }

    #[actix_web::test]
    async fn error_bodies_carry_the_request_trace_id() {
        let app = test::init_service(
            App::new()
                .wrap(RequestTrace)
                .route("/fail", web::get().to(fail)),
        )
        .await;

        let req = test::TestRequest::get().uri("/fail").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 401);

        let request_id = resp.headers().get("x-request-id").unwrap().clone();
        let trace_header = resp.headers().get("x-trace-id").unwrap().clone();
        assert_eq!(request_id, trace_header);

        let json: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(json["trace_id"], request_id.to_str().unwrap());
    }

    async fn echo_id(path: web::Path<String>) -> HttpResponse {
        HttpResponse::Ok().body(path.into_inner())
    }

    #[actix_web::test]
    async fn routes_with_path_parameters_resolve_under_the_trace() {
        let app = test::init_service(
            App::new()
                .wrap(RequestTrace)
                .service(web::scope("/items").route("/{item_id}", web::put().to(echo_id))),
        )
        .await;

        let resp =
            test::call_service(&app, test::TestRequest::put().uri("/items/abc").to_request()).await;
        assert_eq!(resp.status().as_u16(), 200);
        assert!(resp.headers().contains_key("x-request-id"));
        assert_eq!(test::read_body(resp).await, "abc");
    }

    #[actix_web::test]
    async fn escaped_errors_are_rendered_with_the_trace_id() {
        let app = test::init_service(
            App::new()
                .wrap_fn(|_req, _srv| {
                    ready(Err::<ServiceResponse, Error>(AppError::MissingCredential.into()))
                })
                .wrap(RequestTrace)
                .route("/items/{item_id}", web::get().to(echo_id)),
        )
        .await;

        let err = app
            .call(test::TestRequest::get().uri("/items/1").to_request())
            .await
            .err()
            .unwrap();
        let resp = err.error_response();
        assert_eq!(resp.status().as_u16(), 401);

        let request_id = resp.headers().get("x-request-id").unwrap().clone();
        assert_eq!(resp.headers().get("x-trace-id").unwrap(), &request_id);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["trace_id"], request_id.to_str().unwrap());
        assert_eq!(json["code"], "UNAUTHORIZED_MISSING_BEARER");
    }
}
