//! In-memory snapshot store
//!
//! Not durable. Used by tests and the demo binary; a real deployment puts a
//! database-backed [`SnapshotStore`] in front of the engine instead.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use shared::TenantId;

use super::{SnapshotStore, StoreError, StoreResult, TenantSnapshot};

#[derive(Debug, Default)]
pub struct InMemoryStore {
    tenants: RwLock<HashMap<TenantId, TenantSnapshot>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a tenant's snapshot
    pub fn insert_snapshot(&self, snapshot: TenantSnapshot) {
        self.tenants
            .write()
            .insert(snapshot.tenant_id.clone(), snapshot);
    }

    /// Mutate a stored snapshot in place. Returns `false` when the tenant is unknown.
    ///
    /// Callers are responsible for notifying the access service afterwards.
    pub fn update<F>(&self, tenant_id: &str, f: F) -> bool
    where
        F: FnOnce(&mut TenantSnapshot),
    {
        match self.tenants.write().get_mut(tenant_id) {
            Some(snapshot) => {
                f(snapshot);
                true
            }
            None => false,
        }
    }

    pub fn remove(&self, tenant_id: &str) -> Option<TenantSnapshot> {
        self.tenants.write().remove(tenant_id)
    }

    pub fn tenant_ids(&self) -> Vec<TenantId> {
        let mut ids: Vec<_> = self.tenants.read().keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[async_trait]
impl SnapshotStore for InMemoryStore {
    async fn load_snapshot(&self, tenant_id: &str) -> StoreResult<TenantSnapshot> {
        self.tenants
            .read()
            .get(tenant_id)
            .cloned()
            .ok_or_else(|| StoreError::TenantNotFound(tenant_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_and_update() {
        let store = InMemoryStore::new();
        store.insert_snapshot(TenantSnapshot::new("t1"));

        assert!(store.load_snapshot("t1").await.is_ok());
        assert!(matches!(
            store.load_snapshot("t2").await,
            Err(StoreError::TenantNotFound(ref t)) if t == "t2"
        ));

        assert!(store.update("t1", |s| s.user_roles.clear()));
        assert!(!store.update("t2", |_| {}));
        assert_eq!(store.tenant_ids(), vec!["t1".to_string()]);
        assert!(store.remove("t1").is_some());
    }
}
