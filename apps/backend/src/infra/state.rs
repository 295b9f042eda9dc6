use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::auth::jwt::TokenService;
use crate::auth::password::{PasswordHasher, Sha256Hasher};
use crate::error::AppError;
use crate::infra::redis::RedisCounterStore;
use crate::notify::{LogMailer, Mailer, WelcomeNotifier, DEFAULT_QUEUE_CAPACITY};
use crate::ratelimit::{CounterStore, RateLimitConfig};
use crate::repos::{MemoryResourceStore, MemoryUserStore};
use crate::state::app_state::{Accounts, AppState};
use crate::state::security_config::SecurityConfig;

/// How long startup waits for Redis before giving up on it.
pub const REDIS_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Builder for creating AppState instances (used in both tests and main)
pub struct StateBuilder {
    security_config: SecurityConfig,
    rate_limit: RateLimitConfig,
    redis_url: Option<String>,
    counter_store: Option<Arc<dyn CounterStore>>,
    resources: Option<MemoryResourceStore>,
    users: Option<MemoryUserStore>,
    hasher: Option<Arc<dyn PasswordHasher>>,
    mailer: Option<Arc<dyn Mailer>>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            security_config: SecurityConfig::default(),
            rate_limit: RateLimitConfig::default(),
            redis_url: None,
            counter_store: None,
            resources: None,
            users: None,
            hasher: None,
            mailer: None,
        }
    }

    pub fn with_security(mut self, security_config: SecurityConfig) -> Self {
        self.security_config = security_config;
        self
    }

    pub fn with_rate_limit(mut self, rate_limit: RateLimitConfig) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    /// Connect to Redis for rate limit counters at build time.
    pub fn with_redis_url(mut self, redis_url: Option<String>) -> Self {
        self.redis_url = redis_url;
        self
    }

    /// Use an already-built counter store; takes precedence over a Redis URL.
    pub fn with_counter_store(mut self, store: Arc<dyn CounterStore>) -> Self {
        self.counter_store = Some(store);
        self
    }

    pub fn with_resources(mut self, resources: MemoryResourceStore) -> Self {
        self.resources = Some(resources);
        self
    }

    pub fn with_users(mut self, users: MemoryUserStore) -> Self {
        self.users = Some(users);
        self
    }

    pub fn with_password_hasher(mut self, hasher: Arc<dyn PasswordHasher>) -> Self {
        self.hasher = Some(hasher);
        self
    }

    /// Mailer for welcome emails; defaults to logging them.
    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = Some(mailer);
        self
    }

    /// Assemble the state.
    ///
    /// An unreachable counter store is not an error: the state is built
    /// without one and rate limiting stays off for the life of the process.
    pub async fn build(self) -> Result<AppState, AppError> {
        if self.security_config.jwt_secret.is_empty() {
            return Err(AppError::config("JWT secret must not be empty"));
        }

        let counter_store = match (self.counter_store, self.redis_url) {
            (Some(store), _) => Some(store),
            (None, Some(url)) => match RedisCounterStore::connect(&url, REDIS_CONNECT_TIMEOUT)
                .await
            {
                Ok(store) => Some(Arc::new(store) as Arc<dyn CounterStore>),
                Err(e) => {
                    warn!(error = %e, "Redis unavailable; rate limiting disabled");
                    None
                }
            },
            (None, None) => {
                warn!("No counter store configured; rate limiting disabled");
                None
            }
        };

        if counter_store.is_some() {
            info!(
                limit = self.rate_limit.limit(),
                window_secs = self.rate_limit.window().as_secs(),
                "Rate limiting enabled"
            );
        }

        let mailer = self.mailer.unwrap_or_else(|| Arc::new(LogMailer));
        // The worker runs until the last notifier handle is dropped.
        let (notifier, _worker) = WelcomeNotifier::spawn(mailer, DEFAULT_QUEUE_CAPACITY);

        let accounts = Accounts {
            users: self.users.unwrap_or_default(),
            hasher: self
                .hasher
                .unwrap_or_else(|| Arc::new(Sha256Hasher::default())),
            notifier,
        };

        Ok(AppState::new(
            TokenService::new(&self.security_config),
            counter_store,
            self.rate_limit,
            self.resources.unwrap_or_default(),
            accounts,
        ))
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}
