use actix_web::web;
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::JwtExtract;
use crate::repos::ResourceRecord;
use crate::state::app_state::AppState;

pub mod auth;
pub mod comments;
pub mod health;
pub mod owned;
pub mod photos;
pub mod social_media;
pub mod users;

/// Success envelope shared by every handler.
#[derive(Debug, Serialize)]
pub struct SuccessBody<T: Serialize> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T: Serialize> SuccessBody<T> {
    pub fn with_data(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ResourceBody {
    pub id: Uuid,
    pub kind: &'static str,
    pub owner_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
}

impl From<ResourceRecord> for ResourceBody {
    fn from(record: ResourceRecord) -> Self {
        Self {
            id: record.id,
            kind: record.kind.noun(),
            owner_id: record.owner_id,
            parent_id: record.parent.map(|(_, id)| id),
        }
    }
}

/// JSON body config whose parse failures render as `BAD_REQUEST` errors.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err, _req| AppError::bad_request(err.to_string()).into())
}

/// Register every route with its gatekeeping chain.
///
/// Identity verification wraps each protected scope; rate limiting and
/// ownership checks wrap individual routes inside it. `/auth` is open.
pub fn configure(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.app_data(json_config());

    cfg.service(web::scope("/health").configure(health::configure_routes));
    cfg.service(web::scope("/auth").configure(auth::configure_routes));

    cfg.service(
        web::scope("/users")
            .wrap(JwtExtract::new(state.tokens.clone()))
            .configure(users::configure_routes),
    );

    cfg.service(
        web::scope("/photos")
            .wrap(JwtExtract::new(state.tokens.clone()))
            .configure(|cfg| photos::configure_routes(cfg, state)),
    );

    cfg.service(
        web::scope("/comments")
            .wrap(JwtExtract::new(state.tokens.clone()))
            .configure(|cfg| comments::configure_routes(cfg, state)),
    );

    cfg.service(
        web::scope("/socialmedias")
            .wrap(JwtExtract::new(state.tokens.clone()))
            .configure(|cfg| social_media::configure_routes(cfg, state)),
    );
}
