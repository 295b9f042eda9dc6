#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod auth;
pub mod config;
pub mod error;
pub mod errors;
pub mod extractors;
pub mod infra;
pub mod middleware;
pub mod notify;
pub mod ownership;
pub mod ratelimit;
pub mod repos;
pub mod routes;
pub mod state;

// Re-exports for public API
pub use auth::{Claims, PasswordHasher, Sha256Hasher, TokenError, TokenService, VerifiedIdentity};
pub use config::Config;
pub use error::AppError;
pub use errors::{ErrorCode, StoreError};
pub use extractors::{CurrentUser, ResourceId};
pub use infra::state::{build_state, StateBuilder};
pub use middleware::{JwtExtract, RateLimit, RequestTrace, RequireOwner, StructuredLogger};
pub use ownership::{OwnershipLookup, OwnershipRegistry, ResourceKind};
pub use notify::{Mailer, WelcomeNotifier};
pub use ratelimit::{CounterStore, FixedWindowLimiter, MemoryCounterStore, RateLimitConfig};
pub use repos::{MemoryResourceStore, MemoryUserStore};
pub use state::app_state::{Accounts, AppState};
pub use state::security_config::SecurityConfig;

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    backend_test_support::logging::init();
}
