//! Counter store abstraction and an in-process implementation.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::errors::StoreError;

/// Shared atomic counters with per-key expiry.
///
/// `increment` must be a single atomic operation: concurrent increments of
/// one key are totally ordered and each caller observes its own
/// post-increment value. An expired key behaves as absent.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Increment the counter at `key`, creating it at 1 if absent, and
    /// return the new value.
    async fn increment(&self, key: &str) -> Result<i64, StoreError>;

    /// Expire `key` after `ttl`. A missing key is left untouched.
    async fn set_ttl(&self, key: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Remaining lifetime of `key`; `None` when the key is absent or has
    /// no expiry.
    async fn get_ttl(&self, key: &str) -> Result<Option<Duration>, StoreError>;
}

#[derive(Debug, Clone, Copy)]
struct Counter {
    value: i64,
    expires_at: Option<Instant>,
}

impl Counter {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// In-process counter store.
///
/// Increments take the shard's entry lock, so concurrent callers within the
/// process are serialized per key the same way Redis `INCR` serializes them.
#[derive(Debug, Default)]
pub struct MemoryCounterStore {
    counters: DashMap<String, Counter>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) counters.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.counters
            .iter()
            .filter(|entry| !entry.value().is_expired(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop expired counters; returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.counters.len();
        self.counters.retain(|_, counter| !counter.is_expired(now));
        before - self.counters.len()
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn increment(&self, key: &str) -> Result<i64, StoreError> {
        let now = Instant::now();
        let mut entry = self.counters.entry(key.to_string()).or_insert(Counter {
            value: 0,
            expires_at: None,
        });
        if entry.is_expired(now) {
            *entry = Counter {
                value: 0,
                expires_at: None,
            };
        }
        entry.value += 1;
        Ok(entry.value)
    }

    async fn set_ttl(&self, key: &str, ttl: Duration) -> Result<(), StoreError> {
        let now = Instant::now();
        if let Some(mut counter) = self.counters.get_mut(key) {
            if !counter.is_expired(now) {
                counter.expires_at = Some(now + ttl);
            }
        }
        Ok(())
    }

    async fn get_ttl(&self, key: &str) -> Result<Option<Duration>, StoreError> {
        let now = Instant::now();
        Ok(self.counters.get(key).and_then(|counter| {
            if counter.is_expired(now) {
                None
            } else {
                counter.expires_at.map(|at| at.saturating_duration_since(now))
            }
        }))
    }
}
