//! Counter and ownership stores with injected faults.

use std::time::Duration;

use async_trait::async_trait;
use photoshare_backend::errors::StoreError;
use photoshare_backend::ownership::OwnershipLookup;
use photoshare_backend::ratelimit::{CounterStore, MemoryCounterStore};
use uuid::Uuid;

/// Counter store whose every operation fails as if Redis went away.
#[derive(Debug, Default)]
pub struct FailingCounterStore;

#[async_trait]
impl CounterStore for FailingCounterStore {
    async fn increment(&self, _key: &str) -> Result<i64, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn set_ttl(&self, _key: &str, _ttl: Duration) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn get_ttl(&self, _key: &str) -> Result<Option<Duration>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
}

/// Counter store that loses every expiry write, leaving counters that
/// never expire.
#[derive(Debug, Default)]
pub struct NoExpiryStore(pub MemoryCounterStore);

#[async_trait]
impl CounterStore for NoExpiryStore {
    async fn increment(&self, key: &str) -> Result<i64, StoreError> {
        self.0.increment(key).await
    }

    async fn set_ttl(&self, _key: &str, _ttl: Duration) -> Result<(), StoreError> {
        Ok(())
    }

    async fn get_ttl(&self, key: &str) -> Result<Option<Duration>, StoreError> {
        self.0.get_ttl(key).await
    }
}

/// Ownership lookup that always fails.
pub struct FailingLookup;

#[async_trait]
impl OwnershipLookup for FailingLookup {
    async fn get_owner(&self, _id: Uuid) -> Result<Option<Uuid>, StoreError> {
        Err(StoreError::Unavailable("resource store offline".into()))
    }
}
