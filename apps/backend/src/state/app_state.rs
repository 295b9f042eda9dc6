use std::fmt;
use std::sync::Arc;

use crate::auth::jwt::TokenService;
use crate::auth::password::PasswordHasher;
use crate::notify::WelcomeNotifier;
use crate::ownership::OwnershipRegistry;
use crate::ratelimit::{CounterStore, RateLimitConfig};
use crate::repos::{MemoryResourceStore, MemoryUserStore};

/// Account storage and the collaborators the account routes need.
#[derive(Clone)]
pub struct Accounts {
    pub users: MemoryUserStore,
    pub hasher: Arc<dyn PasswordHasher>,
    /// Queue for welcome emails sent after registration
    pub notifier: WelcomeNotifier,
}

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    /// Token issuing and verification
    pub tokens: TokenService,
    /// Counter store for rate limiting; `None` disables the limiter
    pub counter_store: Option<Arc<dyn CounterStore>>,
    pub rate_limit: RateLimitConfig,
    /// Owned resource records behind the route handlers
    pub resources: MemoryResourceStore,
    pub ownership: Arc<OwnershipRegistry>,
    pub accounts: Accounts,
}

impl AppState {
    pub fn new(
        tokens: TokenService,
        counter_store: Option<Arc<dyn CounterStore>>,
        rate_limit: RateLimitConfig,
        resources: MemoryResourceStore,
        accounts: Accounts,
    ) -> Self {
        let ownership = Arc::new(resources.registry());
        Self {
            tokens,
            counter_store,
            rate_limit,
            resources,
            ownership,
            accounts,
        }
    }

    /// Replace the ownership registry, e.g. with lookups backed by another
    /// store.
    pub fn with_ownership(mut self, ownership: OwnershipRegistry) -> Self {
        self.ownership = Arc::new(ownership);
        self
    }

    pub fn rate_limiter_enabled(&self) -> bool {
        self.counter_store.is_some()
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("tokens", &self.tokens)
            .field("counter_store", &self.counter_store.as_ref().map(|_| "configured"))
            .field("rate_limit", &self.rate_limit)
            .field("resources", &self.resources.len())
            .field("ownership", &self.ownership)
            .field("users", &self.accounts.users.len())
            .field("notifier", &self.accounts.notifier)
            .finish()
    }
}
