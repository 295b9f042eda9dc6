//! Fixed-window rate limiting middleware
//!
//! Counts each request against `user:<id>:<path>` when the identity
//! middleware has run, otherwise `ip:<peer>:<path>`. The path is the
//! percent-decoded one the router matched, so encoded aliases of a route
//! share its counter. Over the limit the request is rejected with 429 and a
//! `Retry-After` hint.
//!
//! Built without a counter store the middleware passes everything through.
//! With a store, a failed increment rejects the request with 500.

use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;

use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, HttpMessage};
use futures_util::future::LocalBoxFuture;
use tracing::{debug, error, warn};

use crate::auth::claims::VerifiedIdentity;
use crate::error::AppError;
use crate::ratelimit::{
    counter_key, retry_after_secs, CounterStore, Decision, FixedWindowLimiter, Identifier,
    RateLimitConfig,
};

pub struct RateLimit {
    limiter: Option<Rc<FixedWindowLimiter>>,
}

impl RateLimit {
    pub fn new(store: Option<Arc<dyn CounterStore>>, config: RateLimitConfig) -> Self {
        let limiter = match store {
            Some(store) => Some(Rc::new(FixedWindowLimiter::new(store, config))),
            None => {
                debug!("no counter store configured; rate limiting disabled");
                None
            }
        };
        Self { limiter }
    }

    pub fn is_enabled(&self) -> bool {
        self.limiter.is_some()
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service: Rc::new(service),
            limiter: self.limiter.clone(),
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
    limiter: Option<Rc<FixedWindowLimiter>>,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
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
        let Some(limiter) = self.limiter.clone() else {
            return Box::pin(async move {
                service.call(req).await.map(ServiceResponse::map_into_left_body)
            });
        };

        Box::pin(async move {
            let key = counter_key(&identify(&req), req.match_info().as_str());

            if let Err(e) = check(&limiter, &key).await {
                return Ok(req.error_response(e).map_into_right_body());
            }

            service.call(req).await.map(ServiceResponse::map_into_left_body)
        })
    }
}

async fn check(limiter: &FixedWindowLimiter, key: &str) -> Result<(), AppError> {
    let config = limiter.config();

    let decision = limiter.hit(key).await.map_err(|e| {
        error!(key = %key, error = %e, "rate limit counter unavailable");
        AppError::store("Rate limiter internal error", e)
    })?;

    if let Decision::Rejected { count, retry_after } = decision {
        let retry_after_secs = retry_after_secs(retry_after);
        warn!(
            key = %key,
            count,
            limit = config.limit(),
            retry_after_secs,
            "rate limit exceeded"
        );
        return Err(AppError::RateLimited {
            limit: config.limit(),
            window: config.window(),
            retry_after_secs,
        });
    }

    Ok(())
}

/// Who this request counts against.
fn identify(req: &ServiceRequest) -> Identifier {
    if let Some(identity) = req.extensions().get::<VerifiedIdentity>() {
        return Identifier::User(identity.subject_id);
    }
    req.peer_addr()
        .map(|addr| Identifier::Ip(addr.ip().to_string()))
        .unwrap_or_else(Identifier::unknown_ip)
}
