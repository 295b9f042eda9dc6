//! Ownership authorization middleware
//!
//! Wraps a resource route (e.g. `/photos/{photo_id}`) and only lets the
//! request through when the verified caller owns the resource named in the
//! path. Must sit inside `JwtExtract`. Reads only; the request is passed
//! on unchanged.

use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;

use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, HttpMessage};
use futures_util::future::LocalBoxFuture;
use tracing::debug;

use crate::auth::claims::VerifiedIdentity;
use crate::error::AppError;
use crate::ownership::{OwnershipRegistry, ResourceKind};

pub struct RequireOwner {
    kind: ResourceKind,
    registry: Arc<OwnershipRegistry>,
}

impl RequireOwner {
    pub fn new(kind: ResourceKind, registry: Arc<OwnershipRegistry>) -> Self {
        Self { kind, registry }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireOwner
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireOwnerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireOwnerMiddleware {
            service: Rc::new(service),
            kind: self.kind,
            registry: Arc::clone(&self.registry),
        }))
    }
}

pub struct RequireOwnerMiddleware<S> {
    service: Rc<S>,
    kind: ResourceKind,
    registry: Arc<OwnershipRegistry>,
}

impl<S, B> Service<ServiceRequest> for RequireOwnerMiddleware<S>
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
        let registry = Arc::clone(&self.registry);
        let kind = self.kind;

        Box::pin(async move {
            let caller = req.extensions().get::<VerifiedIdentity>().cloned();
            let raw_id = req.match_info().get(kind.path_param()).map(str::to_owned);

            if let Err(e) = authorize(&registry, kind, raw_id.as_deref(), caller).await {
                debug!(resource = %kind, code = %e.code(), "ownership check failed");
                return Ok(req.error_response(e).map_into_right_body());
            }

            service.call(req).await.map(ServiceResponse::map_into_left_body)
        })
    }
}

async fn authorize(
    registry: &OwnershipRegistry,
    kind: ResourceKind,
    raw_id: Option<&str>,
    caller: Option<VerifiedIdentity>,
) -> Result<(), AppError> {
    let caller = caller.ok_or(AppError::MissingCredential)?;
    registry.authorize(kind, raw_id, &caller).await.map(|_| ())
}
