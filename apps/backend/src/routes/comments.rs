use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::extractors::CurrentUser;
use crate::middleware::RateLimit;
use crate::ownership::ResourceKind;
use crate::routes::{owned, ResourceBody, SuccessBody};
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub photo_id: String,
}

async fn create_comment(
    user: CurrentUser,
    body: web::Json<CreateCommentRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let photo_id =
        Uuid::parse_str(&body.photo_id).map_err(|_| AppError::bad_request("Invalid photo ID"))?;

    let record = app_state.resources.create(
        ResourceKind::Comment,
        user.id,
        Some((ResourceKind::Photo, photo_id)),
    )?;

    Ok(HttpResponse::Created().json(SuccessBody::with_data(
        "Comment created successfully",
        ResourceBody::from(record),
    )))
}

async fn create_reply(
    user: CurrentUser,
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let parent_id = Uuid::parse_str(&path.into_inner())
        .map_err(|_| AppError::bad_request("Invalid parent comment ID"))?;

    let record = app_state.resources.create(
        ResourceKind::Comment,
        user.id,
        Some((ResourceKind::Comment, parent_id)),
    )?;

    Ok(HttpResponse::Created().json(SuccessBody::with_data(
        "Reply created successfully",
        ResourceBody::from(record),
    )))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig, state: &AppState) {
    let limit = || RateLimit::new(state.counter_store.clone(), state.rate_limit);

    cfg.service(web::resource("").route(web::post().to(create_comment).wrap(limit())));
    cfg.service(
        web::resource("/reply/{parent_comment_id}")
            .route(web::post().to(create_reply).wrap(limit())),
    );
    cfg.service(owned::resource(ResourceKind::Comment, state));
}
