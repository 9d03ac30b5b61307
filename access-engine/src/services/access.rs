//! Access Service
//!
//! Entry point for the API-layer collaborator. Loads one tenant's snapshot
//! per call, resolves on top of it, and keeps the permission cache honest:
//!
//! - `resolve_permissions` reads through the cache
//! - every `notify_*` hook evicts synchronously, before the write returns
//! - no time-based expiry

use std::sync::Arc;

use crate::auth::{PermissionContext, TenantModel};
use crate::cache::{CacheKey, MemoryPermissionCache, PermissionCache};
use crate::cascade::{CascadeDeletionPlanner, DeletionPlan};
use crate::core::{Config, EngineError, EntityKind, Result};
use crate::security_log;
use crate::store::{SnapshotStore, TenantSnapshot};
use crate::tree::TreeLimits;

pub struct AccessService {
    store: Arc<dyn SnapshotStore>,
    cache: Option<Arc<dyn PermissionCache>>,
    limits: TreeLimits,
}

impl std::fmt::Debug for AccessService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessService")
            .field("cache_enabled", &self.cache.is_some())
            .field("limits", &self.limits)
            .finish()
    }
}

impl AccessService {
    /// Create the service; an in-memory cache is attached when
    /// `config.cache_enabled` is set
    pub fn new(store: Arc<dyn SnapshotStore>, config: &Config) -> Self {
        let cache: Option<Arc<dyn PermissionCache>> = if config.cache_enabled {
            Some(Arc::new(MemoryPermissionCache::new()))
        } else {
            None
        };
        Self {
            store,
            cache,
            limits: config.limits(),
        }
    }

    /// Replace the cache (e.g. one shared between services)
    pub fn with_cache(mut self, cache: Arc<dyn PermissionCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn without_cache(mut self) -> Self {
        self.cache = None;
        self
    }

    pub fn cache(&self) -> Option<&Arc<dyn PermissionCache>> {
        self.cache.as_ref()
    }

    // ========== Resolution ==========

    /// Resolve what `user_id` may do inside `tenant_id`
    pub async fn resolve_permissions(
        &self,
        tenant_id: &str,
        user_id: i64,
    ) -> Result<PermissionContext> {
        let snapshot = self.load_snapshot(tenant_id).await?;

        let key = self.cache.as_ref().map(|_| cache_key(&snapshot, user_id));
        if let (Some(cache), Some(key)) = (&self.cache, &key)
            && let Some(ctx) = cache.get(key)
        {
            tracing::debug!(tenant_id, user_id, "Permission cache hit");
            return Ok(ctx);
        }

        let ctx = TenantModel::build(snapshot, self.limits)?.resolve(user_id)?;

        if let (Some(cache), Some(key)) = (&self.cache, key) {
            cache.set(key, ctx.clone());
        }
        tracing::debug!(
            tenant_id,
            user_id,
            codes = ctx.permission_codes.len(),
            is_super_admin = ctx.is_super_admin,
            "Resolved permission context"
        );
        Ok(ctx)
    }

    /// Fail with [`EngineError::PermissionDenied`] unless `ctx` grants `permission`
    pub fn require_permission(&self, ctx: &PermissionContext, permission: &str) -> Result<()> {
        if ctx.has_permission(permission) {
            return Ok(());
        }
        security_log!(
            "WARN",
            "permission_denied",
            tenant_id = %ctx.tenant_id,
            user_id = ctx.user_id,
            required_permission = permission
        );
        Err(EngineError::PermissionDenied(permission.to_string()))
    }

    // ========== Write-path checks ==========

    /// Plan deleting `menu_id` and its subtree.
    ///
    /// Fails with [`EngineError::ReferentialBlock`] while any role still
    /// references an id in the subtree.
    pub async fn plan_menu_deletion(&self, tenant_id: &str, menu_id: i64) -> Result<DeletionPlan> {
        let model = self.load_model(tenant_id).await?;
        let plan = CascadeDeletionPlanner::new(&model).menu_plan(menu_id)?;
        log_plan(tenant_id, &plan);
        plan.ensure_unblocked()
    }

    /// Plan deleting `dept_id` and its subtree.
    ///
    /// Fails with [`EngineError::ReferentialBlock`] while any role or user
    /// still references an id in the subtree.
    pub async fn plan_dept_deletion(&self, tenant_id: &str, dept_id: i64) -> Result<DeletionPlan> {
        let model = self.load_model(tenant_id).await?;
        let plan = CascadeDeletionPlanner::new(&model).dept_plan(dept_id)?;
        log_plan(tenant_id, &plan);
        plan.ensure_unblocked()
    }

    /// Validate moving `menu_id` under `new_parent` before the write
    pub async fn check_menu_parent(
        &self,
        tenant_id: &str,
        menu_id: i64,
        new_parent: Option<i64>,
    ) -> Result<()> {
        let model = self.load_model(tenant_id).await?;
        model.menus().index().validate_reparent(menu_id, new_parent)
    }

    /// Validate moving `dept_id` under `new_parent` before the write
    pub async fn check_dept_parent(
        &self,
        tenant_id: &str,
        dept_id: i64,
        new_parent: Option<i64>,
    ) -> Result<()> {
        let model = self.load_model(tenant_id).await?;
        model.depts().index().validate_reparent(dept_id, new_parent)
    }

    // ========== Cache invalidation hooks ==========

    /// A role row, or its RoleMenu/RoleDept links, changed
    pub fn notify_roles_changed(&self, tenant_id: &str) {
        self.evict_tenant(tenant_id, "roles");
    }

    pub fn notify_menus_changed(&self, tenant_id: &str) {
        self.evict_tenant(tenant_id, "menus");
    }

    pub fn notify_depts_changed(&self, tenant_id: &str) {
        self.evict_tenant(tenant_id, "depts");
    }

    /// A user's UserRole links changed, or the user row itself
    /// (department, enabled flag)
    pub fn notify_user_roles_changed(&self, tenant_id: &str, user_id: i64) {
        if let Some(cache) = &self.cache {
            cache.invalidate_user(tenant_id, user_id);
            tracing::debug!(tenant_id, user_id, "Evicted user permission cache");
        }
    }

    fn evict_tenant(&self, tenant_id: &str, reason: &'static str) {
        if let Some(cache) = &self.cache {
            cache.invalidate_tenant(tenant_id);
            tracing::debug!(tenant_id, reason, "Evicted tenant permission cache");
        }
    }

    // ========== Loading ==========

    async fn load_snapshot(&self, tenant_id: &str) -> Result<TenantSnapshot> {
        let snapshot = self.store.load_snapshot(tenant_id).await?;
        if snapshot.tenant_id != tenant_id {
            return Err(EngineError::TenantMismatch {
                entity: EntityKind::Snapshot,
                id: 0,
                expected: tenant_id.to_string(),
                found: snapshot.tenant_id,
            });
        }
        Ok(snapshot)
    }

    async fn load_model(&self, tenant_id: &str) -> Result<TenantModel> {
        let snapshot = self.load_snapshot(tenant_id).await?;
        TenantModel::build(snapshot, self.limits)
    }
}

/// Fingerprint the roles `user_id` holds in `snapshot`
fn cache_key(snapshot: &TenantSnapshot, user_id: i64) -> CacheKey {
    let role_ids = snapshot.role_ids_for_user(user_id);
    let roles = role_ids.iter().filter_map(|id| snapshot.role(*id));
    CacheKey::new(snapshot.tenant_id.clone(), user_id, roles)
}

fn log_plan(tenant_id: &str, plan: &DeletionPlan) {
    if plan.is_blocked() {
        tracing::info!(
            tenant_id,
            kind = %plan.kind,
            target_id = plan.target_id,
            blocked = plan.blocked_by.len(),
            "Cascade deletion refused"
        );
    }
}
