use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, warn};

use crate::error::AppError;
use crate::errors::StoreError;
use crate::ratelimit::store::CounterStore;

pub const DEFAULT_LIMIT: u64 = 10;
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Requests allowed per fixed window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    limit: u64,
    window: Duration,
}

impl RateLimitConfig {
    pub fn new(limit: u64, window: Duration) -> Result<Self, AppError> {
        if limit == 0 {
            return Err(AppError::config("rate limit must allow at least one request"));
        }
        if window.is_zero() {
            return Err(AppError::config("rate limit window must be non-zero"));
        }
        Ok(Self { limit, window })
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            window: DEFAULT_WINDOW,
        }
    }
}

/// Outcome of counting one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed { count: i64 },
    Rejected { count: i64, retry_after: Duration },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed { .. })
    }
}

/// Whole seconds a client should wait, rounded up, never below one.
pub fn retry_after_secs(remaining: Duration) -> u64 {
    let secs = remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
    secs.max(1)
}

/// Fixed-window counter over a shared store.
///
/// The first hit in a window creates the counter and sets its expiry;
/// later hits only increment, so the window never slides.
#[derive(Clone)]
pub struct FixedWindowLimiter {
    store: Arc<dyn CounterStore>,
    config: RateLimitConfig,
}

impl FixedWindowLimiter {
    pub fn new(store: Arc<dyn CounterStore>, config: RateLimitConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Count one request against `key`.
    ///
    /// Only the increment is fatal. A failed expiry write is logged and the
    /// request proceeds; a failed TTL read falls back to the full window.
    pub async fn hit(&self, key: &str) -> Result<Decision, StoreError> {
        let count = self.store.increment(key).await?;

        if count == 1 {
            if let Err(e) = self.store.set_ttl(key, self.config.window).await {
                error!(key = %key, error = %e, "failed to set rate limit window expiry");
            }
        }

        let over_limit = u64::try_from(count).is_ok_and(|c| c > self.config.limit);
        if !over_limit {
            return Ok(Decision::Allowed { count });
        }

        let retry_after = match self.store.get_ttl(key).await {
            Ok(Some(ttl)) if !ttl.is_zero() => ttl,
            Ok(_) => self.config.window,
            Err(e) => {
                warn!(key = %key, error = %e, "failed to read rate limit ttl");
                self.config.window
            }
        };

        Ok(Decision::Rejected { count, retry_after })
    }
}

impl fmt::Debug for FixedWindowLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedWindowLimiter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
