//! Update and delete handlers shared by every owned resource kind.
//!
//! These run behind `RequireOwner`, so by the time they execute the caller
//! is known to own the record.

use actix_web::{web, HttpResponse, Resource};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::extractors::ResourceId;
use crate::middleware::RequireOwner;
use crate::ownership::ResourceKind;
use crate::routes::SuccessBody;
use crate::state::app_state::AppState;

/// `/{<kind>_id}` with update and delete, each behind the ownership check.
///
/// Only the guarded methods are routed; anything else gets a plain 405.
pub fn resource(kind: ResourceKind, state: &AppState) -> Resource {
    let guard = || RequireOwner::new(kind, state.ownership.clone());

    web::resource(format!("/{{{}}}", kind.path_param()))
        .route(web::put().to(update).wrap(guard()))
        .route(web::delete().to(delete).wrap(guard()))
}

#[derive(Debug, Serialize)]
struct UpdatedBody {
    id: Uuid,
}

#[derive(Debug, Serialize)]
struct DeletedBody {
    removed: usize,
}

pub async fn update(resource: ResourceId) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(SuccessBody::with_data(
        format!("{} updated successfully", resource.kind.label()),
        UpdatedBody { id: resource.id },
    )))
}

pub async fn delete(
    resource: ResourceId,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let removed = app_state.resources.delete(resource.kind, resource.id)?;

    Ok(HttpResponse::Ok().json(SuccessBody::with_data(
        format!("{} deleted successfully", resource.kind.label()),
        DeletedBody { removed },
    )))
}
