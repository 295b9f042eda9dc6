//! Redis-backed counter store.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tracing::info;

use crate::errors::StoreError;
use crate::ratelimit::store::CounterStore;

/// Namespace for rate limit counters.
pub const KEY_PREFIX: &str = "rate:";

/// Counter store over a shared Redis instance.
///
/// `INCR` gives the atomic increment; expiry uses millisecond commands so
/// sub-second windows behave.
#[derive(Clone)]
pub struct RedisCounterStore {
    manager: ConnectionManager,
}

impl RedisCounterStore {
    /// Connect and verify the server answers `PING` within `timeout`.
    pub async fn connect(redis_url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let client = Client::open(redis_url)
            .map_err(|err| StoreError::Unavailable(format!("Invalid REDIS_URL: {err}")))?;

        let mut manager = tokio::time::timeout(timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| StoreError::Unavailable("timed out connecting to Redis".to_string()))??;

        let mut ping_cmd = redis::cmd("PING");
        let ping = ping_cmd.query_async::<String>(&mut manager);
        let pong = tokio::time::timeout(timeout, ping)
            .await
            .map_err(|_| StoreError::Unavailable("timed out waiting for PING".to_string()))??;

        info!(reply = %pong, "Connected to Redis counter store");

        Ok(Self { manager })
    }

    fn key(key: &str) -> String {
        format!("{KEY_PREFIX}{key}")
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn increment(&self, key: &str) -> Result<i64, StoreError> {
        let mut conn = self.manager.clone();
        let count: i64 = conn.incr(Self::key(key), 1).await?;
        Ok(count)
    }

    async fn set_ttl(&self, key: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self.manager.clone();
        let millis = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX).max(1);
        let _: bool = conn.pexpire(Self::key(key), millis).await?;
        Ok(())
    }

    async fn get_ttl(&self, key: &str) -> Result<Option<Duration>, StoreError> {
        let mut conn = self.manager.clone();
        // -2: no such key, -1: no expiry
        let millis: i64 = conn.pttl(Self::key(key)).await?;
        Ok(u64::try_from(millis).ok().map(Duration::from_millis))
    }
}

impl fmt::Debug for RedisCounterStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCounterStore").finish_non_exhaustive()
    }
}
