//! 权限上下文缓存
//!
//! Keyed by (tenant, user, role-set fingerprint). Entries never expire on
//! their own: the write path evicts them through the `notify_*` hooks of
//! [`AccessService`](crate::services::AccessService).
//!
//! ```text
//! tenant_id → user_id → (fingerprint, PermissionContext)
//! ```

use dashmap::DashMap;
use sha2::{Digest, Sha256};
use shared::models::Role;

use crate::auth::PermissionContext;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub tenant_id: String,
    pub user_id: i64,
    pub fingerprint: String,
}

impl CacheKey {
    pub fn new<'a>(
        tenant_id: impl Into<String>,
        user_id: i64,
        roles: impl IntoIterator<Item = &'a Role>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            user_id,
            fingerprint: role_set_fingerprint(roles),
        }
    }
}

/// Hex SHA-256 over the user's roles, independent of input order.
///
/// Covers everything about a role that changes its resolution: id, key,
/// data scope and enabled flag.
pub fn role_set_fingerprint<'a>(roles: impl IntoIterator<Item = &'a Role>) -> String {
    let mut parts: Vec<String> = roles
        .into_iter()
        .map(|r| format!("{}:{}:{}:{}", r.id, r.key, r.data_scope, r.enabled))
        .collect();
    parts.sort();
    parts.dedup();

    let mut hasher = Sha256::new();
    for part in &parts {
        hasher.update(part.as_bytes());
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}

/// Storage for resolved contexts
pub trait PermissionCache: Send + Sync {
    /// Hit only when the stored fingerprint matches `key`
    fn get(&self, key: &CacheKey) -> Option<PermissionContext>;

    fn set(&self, key: CacheKey, ctx: PermissionContext);

    fn invalidate_user(&self, tenant_id: &str, user_id: i64);

    fn invalidate_tenant(&self, tenant_id: &str);

    /// Number of cached contexts across all tenants
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-process cache, strictly partitioned by tenant
#[derive(Debug, Default)]
pub struct MemoryPermissionCache {
    tenants: DashMap<String, DashMap<i64, (String, PermissionContext)>>,
}

impl MemoryPermissionCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PermissionCache for MemoryPermissionCache {
    fn get(&self, key: &CacheKey) -> Option<PermissionContext> {
        let tenant = self.tenants.get(&key.tenant_id)?;
        let entry = tenant.get(&key.user_id)?;
        let (fingerprint, ctx) = entry.value();
        (*fingerprint == key.fingerprint).then(|| ctx.clone())
    }

    fn set(&self, key: CacheKey, ctx: PermissionContext) {
        self.tenants
            .entry(key.tenant_id)
            .or_default()
            .insert(key.user_id, (key.fingerprint, ctx));
    }

    fn invalidate_user(&self, tenant_id: &str, user_id: i64) {
        if let Some(tenant) = self.tenants.get(tenant_id) {
            tenant.remove(&user_id);
        }
    }

    fn invalidate_tenant(&self, tenant_id: &str) {
        if let Some((_, evicted)) = self.tenants.remove(tenant_id) {
            tracing::debug!(tenant_id, evicted = evicted.len(), "Evicted tenant permission cache");
        }
    }

    fn len(&self) -> usize {
        self.tenants.iter().map(|t| t.value().len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(id: i64, key: &str, scope: &str) -> Role {
        Role {
            id,
            tenant_id: "t1".into(),
            key: key.into(),
            name: key.into(),
            data_scope: scope.into(),
            enabled: true,
        }
    }

    #[test]
    fn test_fingerprint_ignores_order() {
        let a = role(1, "a", "1");
        let b = role(2, "b", "4");
        assert_eq!(
            role_set_fingerprint([&a, &b]),
            role_set_fingerprint([&b, &a])
        );
        assert_eq!(role_set_fingerprint([&a]).len(), 64);
    }

    #[test]
    fn test_fingerprint_tracks_role_changes() {
        let a = role(1, "a", "1");
        let mut changed = a.clone();
        changed.data_scope = "5".into();
        assert_ne!(role_set_fingerprint([&a]), role_set_fingerprint([&changed]));

        changed = a.clone();
        changed.enabled = false;
        assert_ne!(role_set_fingerprint([&a]), role_set_fingerprint([&changed]));
    }

    #[test]
    fn test_get_requires_matching_fingerprint() {
        let cache = MemoryPermissionCache::new();
        let a = role(1, "a", "1");
        let b = role(2, "b", "1");
        let key = CacheKey::new("t1", 7, [&a]);
        cache.set(key.clone(), PermissionContext::empty("t1", 7));

        assert!(cache.get(&key).is_some());
        assert!(cache.get(&CacheKey::new("t1", 7, [&a, &b])).is_none());
        assert!(cache.get(&CacheKey::new("t2", 7, [&a])).is_none());
    }

    #[test]
    fn test_invalidation() {
        let cache = MemoryPermissionCache::new();
        let a = role(1, "a", "1");
        for user in [1, 2] {
            cache.set(
                CacheKey::new("t1", user, [&a]),
                PermissionContext::empty("t1", user),
            );
        }
        cache.set(CacheKey::new("t2", 1, [&a]), PermissionContext::empty("t2", 1));
        assert_eq!(cache.len(), 3);

        cache.invalidate_user("t1", 1);
        assert_eq!(cache.len(), 2);
        assert!(cache.get(&CacheKey::new("t1", 1, [&a])).is_none());

        cache.invalidate_tenant("t1");
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&CacheKey::new("t2", 1, [&a])).is_some());
    }
}
