use actix_web::{web, HttpResponse};

use crate::error::AppError;
use crate::extractors::CurrentUser;
use crate::ownership::ResourceKind;
use crate::routes::{owned, ResourceBody, SuccessBody};
use crate::state::app_state::AppState;

async fn create_social_media(
    user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let record = app_state
        .resources
        .create(ResourceKind::SocialMedia, user.id, None)?;

    Ok(HttpResponse::Created().json(SuccessBody::with_data(
        "Social Media created successfully",
        ResourceBody::from(record),
    )))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.service(web::resource("").route(web::post().to(create_social_media)));
    cfg.service(owned::resource(ResourceKind::SocialMedia, state));
}
