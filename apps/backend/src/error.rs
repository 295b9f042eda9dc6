use std::time::Duration;

use actix_web::error::ResponseError;
use actix_web::http::header;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::Serialize;
use thiserror::Error;

use crate::auth::jwt::TokenError;
use crate::errors::{ErrorCode, StoreError};
use crate::middleware::request_trace::trace_id;
use crate::ownership::ResourceKind;

/// Error body returned for every failed request.
#[derive(Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    pub code: String,
    pub trace_id: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bearer token is required")]
    MissingCredential,
    #[error("Token must be a Bearer token")]
    MalformedCredential,
    #[error("invalid token: {0}")]
    InvalidCredential(#[from] TokenError),
    #[error("Invalid email or password")]
    InvalidLogin,
    #[error("Account not found")]
    AccountNotFound,
    #[error("Invalid ID format")]
    InvalidResourceId,
    #[error("Bad request: {detail}")]
    BadRequest { detail: String },
    #[error("{} not found", .kind.label())]
    ResourceNotFound { kind: ResourceKind },
    #[error("You are not authorized to modify this {kind}")]
    Forbidden { kind: ResourceKind },
    #[error(
        "Rate limit exceeded. You are limited to {limit} requests per {}s. Try again in {retry_after_secs} seconds.",
        .window.as_secs()
    )]
    RateLimited {
        limit: u64,
        window: Duration,
        retry_after_secs: u64,
    },
    #[error("{detail}")]
    Store {
        detail: String,
        #[source]
        source: StoreError,
    },
    #[error("Internal error: {detail}")]
    Internal { detail: String },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::MissingCredential => ErrorCode::UnauthorizedMissingBearer,
            AppError::MalformedCredential => ErrorCode::UnauthorizedMalformedBearer,
            AppError::InvalidCredential(TokenError::Expired) => ErrorCode::UnauthorizedExpiredJwt,
            AppError::InvalidCredential(_) => ErrorCode::UnauthorizedInvalidJwt,
            AppError::InvalidLogin => ErrorCode::UnauthorizedInvalidCredentials,
            AppError::AccountNotFound => ErrorCode::AccountNotFound,
            AppError::InvalidResourceId => ErrorCode::InvalidResourceId,
            AppError::BadRequest { .. } => ErrorCode::BadRequest,
            AppError::ResourceNotFound { kind } => kind.not_found_code(),
            AppError::Forbidden { .. } => ErrorCode::Forbidden,
            AppError::RateLimited { .. } => ErrorCode::RateLimited,
            AppError::Store { .. } => ErrorCode::StoreUnavailable,
            AppError::Internal { .. } => ErrorCode::Internal,
            AppError::Config { .. } => ErrorCode::ConfigError,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingCredential
            | AppError::MalformedCredential
            | AppError::InvalidCredential(_)
            | AppError::InvalidLogin => StatusCode::UNAUTHORIZED,
            AppError::InvalidResourceId | AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::ResourceNotFound { .. } | AppError::AccountNotFound => StatusCode::NOT_FOUND,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Store { .. } | AppError::Internal { .. } | AppError::Config { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::BadRequest {
            detail: detail.into(),
        }
    }

    pub fn not_found(kind: ResourceKind) -> Self {
        Self::ResourceNotFound { kind }
    }

    pub fn forbidden(kind: ResourceKind) -> Self {
        Self::Forbidden { kind }
    }

    pub fn store(detail: impl Into<String>, source: StoreError) -> Self {
        Self::Store {
            detail: detail.into(),
            source,
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status();
        let trace_id = trace_id();

        let body = ErrorBody {
            success: false,
            message: self.to_string(),
            code: self.code().to_string(),
            trace_id: trace_id.clone(),
        };

        let mut builder = HttpResponse::build(status);
        builder.insert_header(("x-trace-id", trace_id));
        if let AppError::RateLimited {
            retry_after_secs, ..
        } = self
        {
            builder.insert_header((header::RETRY_AFTER, retry_after_secs.to_string()));
        }
        builder.json(body)
    }
}

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;
    use serde_json::Value;

    use super::*;

    #[test]
    fn credential_errors_map_to_401() {
        assert_eq!(AppError::MissingCredential.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::MalformedCredential.status(), StatusCode::UNAUTHORIZED);
        let expired = AppError::from(TokenError::Expired);
        assert_eq!(expired.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(expired.code(), ErrorCode::UnauthorizedExpiredJwt);
        assert_eq!(
            AppError::from(TokenError::InvalidSignature).code(),
            ErrorCode::UnauthorizedInvalidJwt
        );
    }

    #[test]
    fn authorization_errors_map_to_their_statuses() {
        assert_eq!(AppError::InvalidResourceId.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::not_found(ResourceKind::Photo).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::forbidden(ResourceKind::Comment).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::store("boom", StoreError::Unavailable("down".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn messages_match_the_client_contract() {
        assert_eq!(
            AppError::MissingCredential.to_string(),
            "Bearer token is required"
        );
        assert_eq!(
            AppError::not_found(ResourceKind::SocialMedia).to_string(),
            "Social Media not found"
        );
        assert_eq!(
            AppError::forbidden(ResourceKind::Photo).to_string(),
            "You are not authorized to modify this photo"
        );
        assert_eq!(
            AppError::forbidden(ResourceKind::SocialMedia).to_string(),
            "You are not authorized to modify this socialmedia"
        );
        assert_eq!(
            AppError::from(TokenError::Expired).to_string(),
            "invalid token: token has expired"
        );
    }

    #[actix_web::test]
    async fn rate_limited_response_carries_retry_after() {
        let err = AppError::RateLimited {
            limit: 10,
            window: Duration::from_secs(60),
            retry_after_secs: 42,
        };
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            resp.headers().get(header::RETRY_AFTER).unwrap(),
            "42"
        );

        let body = to_bytes(resp.into_body()).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["code"], "RATE_LIMITED");
        let message = json["message"].as_str().unwrap();
        assert!(message.contains("10 requests per 60s"), "{message}");
        assert!(message.contains("42 seconds"), "{message}");
    }
}
