//! Completion logging for every request.
//!
//! Emits one `request_completed` event per request at info/warn/error
//! depending on the status class. When the inner chain failed with an
//! [`AppError`], its error code is logged alongside so gate rejections
//! (401/403/404/429) can be told apart without reading response bodies.

use std::future::{ready, Ready};
use std::time::Instant;

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error as ActixError, HttpMessage};
use futures_util::future::LocalBoxFuture;
use tracing::{error, info, warn};

use crate::error::AppError;
use crate::middleware::request_trace::TraceId;

pub struct StructuredLogger;

impl<S, B> Transform<S, ServiceRequest> for StructuredLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type InitError = ();
    type Transform = StructuredLoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(StructuredLoggerMiddleware { service }))
    }
}

pub struct StructuredLoggerMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for StructuredLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let method = req.method().to_string();
        let path = req.path().to_string();

        let trace_id = req
            .extensions()
            .get::<TraceId>()
            .map(|t| t.0.clone())
            .unwrap_or_else(|| "unknown".to_string());

        let fut = self.service.call(req);

        Box::pin(async move {
            let result = fut.await;

            let (status, error_code) = match &result {
                Ok(res) => (
                    res.status(),
                    res.response()
                        .error()
                        .and_then(|err| err.as_error::<AppError>())
                        .map(|app| app.code().as_str()),
                ),
                Err(err) => (
                    err.as_response_error().status_code(),
                    err.as_error::<AppError>().map(|app| app.code().as_str()),
                ),
            };

            let duration_us = start.elapsed().as_micros() as u64;
            let status_code = status.as_u16();
            let error_code = error_code.unwrap_or("-");

            if status.is_server_error() {
                error!(http.method=%method, url.path=%path, http.status_code=%status_code, error.code=%error_code, duration_us=%duration_us, trace_id=%trace_id, message="request_completed");
            } else if status.is_client_error() {
                warn!(http.method=%method, url.path=%path, http.status_code=%status_code, error.code=%error_code, duration_us=%duration_us, trace_id=%trace_id, message="request_completed");
            } else {
                info!(http.method=%method, url.path=%path, http.status_code=%status_code, duration_us=%duration_us, trace_id=%trace_id, message="request_completed");
            }

            result
        })
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{test, web, App, HttpResponse};

    use super::*;
    use crate::middleware::request_trace::RequestTrace;

    async fn ok() -> HttpResponse {
        HttpResponse::Ok().finish()
    }

    async fn forbidden() -> Result<HttpResponse, AppError> {
        Err(AppError::forbidden(crate::ownership::ResourceKind::Photo))
    }

    #[actix_web::test]
    async fn passes_responses_through_unchanged() {
        let app = test::init_service(
            App::new()
                .wrap(StructuredLogger)
                .wrap(RequestTrace)
                .route("/ok", web::get().to(ok))
                .route("/forbidden", web::get().to(forbidden)),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/ok").to_request()).await;
        assert_eq!(resp.status().as_u16(), 200);

        let resp =
            test::call_service(&app, test::TestRequest::get().uri("/forbidden").to_request()).await;
        assert_eq!(resp.status().as_u16(), 403);
    }
}
