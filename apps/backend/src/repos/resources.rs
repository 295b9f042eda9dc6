//! In-memory store of owned resources.
//!
//! Stands in for the persistent record store: it keeps just enough of each
//! record (kind, owner, parent) for ownership checks and cascading deletes.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::error::AppError;
use crate::errors::StoreError;
use crate::ownership::{OwnershipLookup, OwnershipRegistry, ResourceKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceRecord {
    pub id: Uuid,
    pub kind: ResourceKind,
    pub owner_id: Uuid,
    /// Comments point at their photo; replies at their parent comment.
    pub parent: Option<(ResourceKind, Uuid)>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryResourceStore {
    records: Arc<RwLock<HashMap<Uuid, ResourceRecord>>>,
}

impl MemoryResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a record owned by `owner_id`.
    ///
    /// Comments require an existing photo or comment parent; other kinds
    /// take no parent.
    pub fn create(
        &self,
        kind: ResourceKind,
        owner_id: Uuid,
        parent: Option<(ResourceKind, Uuid)>,
    ) -> Result<ResourceRecord, AppError> {
        let mut records = self.records.write();

        match (kind, parent) {
            (ResourceKind::Comment, Some((parent_kind, parent_id))) => {
                if parent_kind == ResourceKind::SocialMedia {
                    return Err(AppError::bad_request("comments attach to photos or comments"));
                }
                let exists = records
                    .get(&parent_id)
                    .is_some_and(|r| r.kind == parent_kind);
                if !exists {
                    return Err(AppError::not_found(parent_kind));
                }
            }
            (ResourceKind::Comment, None) => {
                return Err(AppError::bad_request("comment requires a photo"));
            }
            (_, Some(_)) => {
                return Err(AppError::bad_request(format!("{kind} does not take a parent")));
            }
            (_, None) => {}
        }

        let record = ResourceRecord {
            id: Uuid::new_v4(),
            kind,
            owner_id,
            parent,
        };
        records.insert(record.id, record);
        Ok(record)
    }

    pub fn get(&self, kind: ResourceKind, id: Uuid) -> Option<ResourceRecord> {
        self.records
            .read()
            .get(&id)
            .filter(|r| r.kind == kind)
            .copied()
    }

    pub fn find_by_owner(&self, kind: ResourceKind, owner_id: Uuid) -> Vec<ResourceRecord> {
        self.records
            .read()
            .values()
            .filter(|r| r.kind == kind && r.owner_id == owner_id)
            .copied()
            .collect()
    }

    /// Delete a record and everything beneath it.
    ///
    /// Returns the number of records removed.
    pub fn delete(&self, kind: ResourceKind, id: Uuid) -> Result<usize, AppError> {
        let mut records = self.records.write();

        if !records.get(&id).is_some_and(|r| r.kind == kind) {
            return Err(AppError::not_found(kind));
        }

        Ok(remove_subtrees(&mut records, vec![id]))
    }

    /// Delete every record owned by `owner_id`, along with everything
    /// beneath those records whoever owns it.
    ///
    /// Returns the number of records removed.
    pub fn delete_owned_by(&self, owner_id: Uuid) -> usize {
        let mut records = self.records.write();

        let owned = records
            .values()
            .filter(|r| r.owner_id == owner_id)
            .map(|r| r.id)
            .collect();
        remove_subtrees(&mut records, owned)
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ownership lookup for one kind over this store.
    pub fn lookup(&self, kind: ResourceKind) -> Arc<dyn OwnershipLookup> {
        Arc::new(KindLookup {
            kind,
            store: self.clone(),
        })
    }

    /// Registry with a lookup for every resource kind.
    pub fn registry(&self) -> OwnershipRegistry {
        ResourceKind::ALL
            .into_iter()
            .fold(OwnershipRegistry::new(), |registry, kind| {
                registry.register(kind, self.lookup(kind))
            })
    }
}

/// Remove `roots` and every record whose parent chain leads to one of them.
fn remove_subtrees(records: &mut HashMap<Uuid, ResourceRecord>, roots: Vec<Uuid>) -> usize {
    let mut pending = roots;
    let mut removed = 0;
    while let Some(next) = pending.pop() {
        if records.remove(&next).is_some() {
            removed += 1;
        }
        pending.extend(
            records
                .values()
                .filter(|r| r.parent.is_some_and(|(_, parent)| parent == next))
                .map(|r| r.id),
        );
    }
    removed
}

struct KindLookup {
    kind: ResourceKind,
    store: MemoryResourceStore,
}

#[async_trait]
impl OwnershipLookup for KindLookup {
    async fn get_owner(&self, id: Uuid) -> Result<Option<Uuid>, StoreError> {
        Ok(self.store.get(self.kind, id).map(|r| r.owner_id))
    }
}
