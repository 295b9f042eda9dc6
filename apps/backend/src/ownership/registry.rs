use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::auth::claims::VerifiedIdentity;
use crate::error::AppError;
use crate::errors::StoreError;
use crate::ownership::kind::ResourceKind;

/// Resolves the owner of one kind of resource.
#[async_trait]
pub trait OwnershipLookup: Send + Sync {
    /// Owning identity of `id`, or `None` when no such resource exists.
    async fn get_owner(&self, id: Uuid) -> Result<Option<Uuid>, StoreError>;
}

/// Maps each resource kind to the lookup that resolves its owners.
#[derive(Clone, Default)]
pub struct OwnershipRegistry {
    lookups: HashMap<ResourceKind, Arc<dyn OwnershipLookup>>,
}

impl OwnershipRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, kind: ResourceKind, lookup: Arc<dyn OwnershipLookup>) -> Self {
        self.lookups.insert(kind, lookup);
        self
    }

    pub fn is_registered(&self, kind: ResourceKind) -> bool {
        self.lookups.contains_key(&kind)
    }

    pub async fn get_owner(&self, kind: ResourceKind, id: Uuid) -> Result<Option<Uuid>, AppError> {
        let lookup = self
            .lookups
            .get(&kind)
            .ok_or_else(|| {
                AppError::internal(format!("no ownership lookup registered for {kind}"))
            })?;

        lookup
            .get_owner(id)
            .await
            .map_err(|e| AppError::store(format!("Failed to look up {kind} owner"), e))
    }

    /// Check that `caller` owns the `kind` resource named by `raw_id`.
    ///
    /// Returns the parsed id on success. Performs a single read and never
    /// writes.
    pub async fn authorize(
        &self,
        kind: ResourceKind,
        raw_id: Option<&str>,
        caller: &VerifiedIdentity,
    ) -> Result<Uuid, AppError> {
        let id = raw_id
            .and_then(|raw| Uuid::parse_str(raw).ok())
            .ok_or(AppError::InvalidResourceId)?;

        let owner = self
            .get_owner(kind, id)
            .await?
            .ok_or_else(|| AppError::not_found(kind))?;

        if owner != caller.subject_id {
            debug!(resource = %kind, resource_id = %id, "caller does not own resource");
            return Err(AppError::forbidden(kind));
        }

        Ok(id)
    }
}

impl fmt::Debug for OwnershipRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.lookups.keys().map(ResourceKind::noun).collect();
        kinds.sort_unstable();
        f.debug_struct("OwnershipRegistry")
            .field("kinds", &kinds)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    struct Fixed(Option<Uuid>);

    #[async_trait]
    impl OwnershipLookup for Fixed {
        async fn get_owner(&self, _id: Uuid) -> Result<Option<Uuid>, StoreError> {
            Ok(self.0)
        }
    }

    struct Broken;

    #[async_trait]
    impl OwnershipLookup for Broken {
        async fn get_owner(&self, _id: Uuid) -> Result<Option<Uuid>, StoreError> {
            Err(StoreError::Unavailable("connection reset".into()))
        }
    }

    fn caller(id: Uuid) -> VerifiedIdentity {
        VerifiedIdentity {
            subject_id: id,
            email: "owner@example.com".into(),
            issued_at: 0,
            expires_at: 0,
        }
    }

    #[tokio::test]
    async fn owner_is_authorized() {
        let owner = Uuid::new_v4();
        let resource = Uuid::new_v4();
        let registry =
            OwnershipRegistry::new().register(ResourceKind::Photo, Arc::new(Fixed(Some(owner))));

        let id = registry
            .authorize(ResourceKind::Photo, Some(&resource.to_string()), &caller(owner))
            .await
            .unwrap();
        assert_eq!(id, resource);
    }

    #[tokio::test]
    async fn other_caller_is_forbidden() {
        let registry = OwnershipRegistry::new()
            .register(ResourceKind::Comment, Arc::new(Fixed(Some(Uuid::new_v4()))));

        let err = registry
            .authorize(
                ResourceKind::Comment,
                Some(&Uuid::new_v4().to_string()),
                &caller(Uuid::new_v4()),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Forbidden);
        assert_eq!(err.to_string(), "You are not authorized to modify this comment");
    }

    #[tokio::test]
    async fn unknown_resource_is_not_found() {
        let registry =
            OwnershipRegistry::new().register(ResourceKind::SocialMedia, Arc::new(Fixed(None)));

        let err = registry
            .authorize(
                ResourceKind::SocialMedia,
                Some(&Uuid::new_v4().to_string()),
                &caller(Uuid::new_v4()),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::SocialMediaNotFound);
    }

    #[tokio::test]
    async fn malformed_or_missing_id_is_rejected_before_lookup() {
        let registry = OwnershipRegistry::new().register(ResourceKind::Photo, Arc::new(Broken));
        let who = caller(Uuid::new_v4());

        for raw in [Some("abc"), Some(""), Some("123"), None] {
            let err = registry
                .authorize(ResourceKind::Photo, raw, &who)
                .await
                .unwrap_err();
            assert_eq!(err.code(), ErrorCode::InvalidResourceId, "{raw:?}");
        }
    }

    #[tokio::test]
    async fn lookup_failures_and_missing_registrations_are_internal() {
        let registry = OwnershipRegistry::new().register(ResourceKind::Photo, Arc::new(Broken));
        let who = caller(Uuid::new_v4());
        let id = Uuid::new_v4().to_string();

        let err = registry
            .authorize(ResourceKind::Photo, Some(&id), &who)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::StoreUnavailable);

        let err = registry
            .authorize(ResourceKind::Comment, Some(&id), &who)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Internal);
        assert!(!registry.is_registered(ResourceKind::Comment));
    }
}
