//! The caller's own account: update and delete.
//!
//! Mounted behind `JwtExtract`; the account acted on is always the one the
//! token names.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::AppError;
use crate::extractors::CurrentUser;
use crate::routes::auth::{validate_email, validate_username, AccountBody};
use crate::routes::SuccessBody;
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    pub email: String,
    pub username: String,
}

#[derive(Debug, Serialize)]
struct DeletedAccountBody {
    resources_removed: usize,
}

async fn update_account(
    user: CurrentUser,
    body: web::Json<UpdateAccountRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let req = body.into_inner();
    validate_email(&req.email)?;
    let username = validate_username(&req.username)?;

    let updated = app_state
        .accounts
        .users
        .update(user.id, req.email.trim(), username)?;
    info!(user_id = %updated.id, "account updated");

    Ok(HttpResponse::Ok().json(SuccessBody::with_data(
        "User account updated successfully",
        AccountBody::from(updated),
    )))
}

async fn delete_account(
    user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let removed = app_state.accounts.users.delete(user.id)?;
    let resources_removed = app_state.resources.delete_owned_by(removed.id);
    info!(user_id = %removed.id, resources_removed, "account deleted");

    Ok(HttpResponse::Ok().json(SuccessBody::with_data(
        "Your account has been successfully deleted",
        DeletedAccountBody { resources_removed },
    )))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("")
            .route(web::put().to(update_account))
            .route(web::delete().to(delete_account)),
    );
}
