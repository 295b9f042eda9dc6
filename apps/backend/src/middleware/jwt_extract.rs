//! Identity extraction middleware
//!
//! Verifies the `Authorization: Bearer <token>` header and stores the
//! resulting [`VerifiedIdentity`] in request extensions. Requests without a
//! valid credential are answered with a 401 response before reaching
//! anything downstream. The counter and resource stores are never touched
//! here.

use std::future::{ready, Ready};
use std::rc::Rc;

use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{self, HeaderValue};
use actix_web::{Error, HttpMessage};
use futures_util::future::LocalBoxFuture;
use tracing::{debug, Span};

use crate::auth::claims::VerifiedIdentity;
use crate::auth::jwt::TokenService;
use crate::error::AppError;

pub struct JwtExtract {
    tokens: Rc<TokenService>,
}

impl JwtExtract {
    pub fn new(tokens: TokenService) -> Self {
        Self {
            tokens: Rc::new(tokens),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtExtract
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtExtractMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtExtractMiddleware {
            service: Rc::new(service),
            tokens: Rc::clone(&self.tokens),
        }))
    }
}

pub struct JwtExtractMiddleware<S> {
    service: Rc<S>,
    tokens: Rc<TokenService>,
}

impl<S, B> Service<ServiceRequest> for JwtExtractMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let tokens = Rc::clone(&self.tokens);

        Box::pin(async move {
            let identity = match authenticate(&tokens, req.headers().get(header::AUTHORIZATION)) {
                Ok(identity) => identity,
                Err(e) => {
                    debug!(code = %e.code(), "rejected credential");
                    return Ok(req.error_response(e).map_into_right_body());
                }
            };

            Span::current().record("user_id", tracing::field::display(identity.subject_id));
            req.extensions_mut().insert(identity);

            service.call(req).await.map(ServiceResponse::map_into_left_body)
        })
    }
}

fn authenticate(
    tokens: &TokenService,
    header_value: Option<&HeaderValue>,
) -> Result<VerifiedIdentity, AppError> {
    let token = bearer_token(header_value)?;
    Ok(tokens.verify(token)?)
}

/// Pull the token out of an `Authorization` header value.
///
/// Absent or blank is `MissingCredential`; anything other than exactly
/// `Bearer <token>` is `MalformedCredential`.
pub fn bearer_token(header_value: Option<&HeaderValue>) -> Result<&str, AppError> {
    let value = header_value.ok_or(AppError::MissingCredential)?;
    let value = value.to_str().map_err(|_| AppError::MalformedCredential)?;

    if value.trim().is_empty() {
        return Err(AppError::MissingCredential);
    }

    let parts: Vec<&str> = value.split_whitespace().collect();
    if parts.len() != 2 || parts[0] != "Bearer" {
        return Err(AppError::MalformedCredential);
    }

    Ok(parts[1])
}
