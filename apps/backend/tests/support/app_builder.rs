use std::sync::Arc;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web, App, Error};
use photoshare_backend::auth::password::Sha256Hasher;
use photoshare_backend::infra::state::build_state;
use photoshare_backend::middleware::{RequestTrace, StructuredLogger};
use photoshare_backend::ratelimit::{CounterStore, MemoryCounterStore, RateLimitConfig};
use photoshare_backend::routes;
use photoshare_backend::state::app_state::AppState;

use super::auth::security;
use super::mailer::{ChannelMailer, Outbox};

/// Build the full application (ambient middleware plus production routes)
/// around `state`.
pub async fn create_test_app(
    state: AppState,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = Error> {
    // Wrap AppState with web::Data at the boundary
    let data = web::Data::new(state);

    test::init_service(
        App::new()
            .wrap(StructuredLogger)
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(|cfg| routes::configure(cfg, &data)),
    )
    .await
}

/// State with the given counter store and limit.
pub async fn state_with_store(
    store: Arc<dyn CounterStore>,
    rate_limit: RateLimitConfig,
) -> AppState {
    build_state()
        .with_security(security())
        .with_rate_limit(rate_limit)
        .with_counter_store(store)
        .build()
        .await
        .expect("state should build")
}

/// State backed by a fresh in-process counter store.
pub async fn state_with_limit(limit: u64, window: std::time::Duration) -> AppState {
    state_with_store(
        Arc::new(MemoryCounterStore::new()),
        RateLimitConfig::new(limit, window).expect("valid rate limit"),
    )
    .await
}

/// State with no counter store: the limiter is disabled.
pub async fn state_without_store() -> AppState {
    build_state()
        .with_security(security())
        .build()
        .await
        .expect("state should build")
}

/// State whose welcome emails arrive in the returned outbox. Passwords are
/// hashed with few rounds to keep tests quick.
pub async fn state_with_outbox() -> (AppState, Outbox) {
    let (mailer, outbox) = ChannelMailer::new();
    let state = build_state()
        .with_security(security())
        .with_mailer(Arc::new(mailer))
        .with_password_hasher(Arc::new(Sha256Hasher::new(10)))
        .build()
        .await
        .expect("state should build");
    (state, outbox)
}
