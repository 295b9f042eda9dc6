use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::error::AppError;
use crate::state::app_state::AppState;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    app_version: &'static str,
    rate_limiter: &'static str,
}

async fn health(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let rate_limiter = if app_state.rate_limiter_enabled() {
        "enabled"
    } else {
        "disabled"
    };

    Ok(HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        app_version: env!("CARGO_PKG_VERSION"),
        rate_limiter,
    }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("").route(web::get().to(health)));
}
