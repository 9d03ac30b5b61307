//! 权限解析模块
//!
//! 提供用户权限上下文的计算:
//! - [`RoleAggregator`] - 合并用户所有角色的授权
//! - [`PermissionContext`] - 解析结果 (权限码、菜单树、数据权限)
//! - [`TenantModel`] - 单租户快照 + 已构建的菜单树与部门树

pub mod aggregator;
pub mod context;

pub use aggregator::{AggregatedAccess, RoleAggregator, RoleGrant};
pub use context::PermissionContext;

use crate::core::{EngineError, EntityKind, Result};
use crate::dept::DeptHierarchy;
use crate::menu::MenuTree;
use crate::security_log;
use crate::store::TenantSnapshot;
use crate::tree::TreeLimits;

/// One tenant's snapshot with its hierarchies built and validated
#[derive(Debug, Clone)]
pub struct TenantModel {
    snapshot: TenantSnapshot,
    menus: MenuTree,
    depts: DeptHierarchy,
}

impl TenantModel {
    /// Verify tenant ownership of every row, then build both trees.
    ///
    /// Fails on the first malformed row: foreign tenant, cycle, invalid menu.
    pub fn build(snapshot: TenantSnapshot, limits: TreeLimits) -> Result<Self> {
        snapshot.verify_tenant()?;
        let menus = MenuTree::build(snapshot.menus.clone(), limits)?;
        let depts = DeptHierarchy::build(snapshot.depts.clone(), limits)?;
        Ok(Self {
            snapshot,
            menus,
            depts,
        })
    }

    pub fn snapshot(&self) -> &TenantSnapshot {
        &self.snapshot
    }

    pub fn tenant_id(&self) -> &str {
        &self.snapshot.tenant_id
    }

    pub fn menus(&self) -> &MenuTree {
        &self.menus
    }

    pub fn depts(&self) -> &DeptHierarchy {
        &self.depts
    }

    /// Roles held by `user_id`, with their menu and dept links.
    ///
    /// A UserRole pointing at a role missing from the snapshot grants nothing.
    pub fn grants_for(&self, user_id: i64) -> Vec<RoleGrant<'_>> {
        self.snapshot
            .role_ids_for_user(user_id)
            .into_iter()
            .filter_map(|role_id| match self.snapshot.role(role_id) {
                Some(role) => Some(RoleGrant {
                    role,
                    menu_ids: self.snapshot.menu_ids_for_role(role_id),
                    dept_ids: self.snapshot.dept_ids_for_role(role_id),
                }),
                None => {
                    tracing::warn!(user_id, role_id, "User role link points at unknown role");
                    None
                }
            })
            .collect()
    }

    /// Resolve the full permission context of one user
    pub fn resolve(&self, user_id: i64) -> Result<PermissionContext> {
        let tenant_id = self.tenant_id();
        let user = self
            .snapshot
            .user(user_id)
            .ok_or(EngineError::NotFound {
                entity: EntityKind::User,
                id: user_id,
            })?;

        if !user.enabled {
            tracing::debug!(tenant_id, user_id, "User disabled, resolving empty context");
            return Ok(PermissionContext::empty(tenant_id, user_id));
        }

        let grants = self.grants_for(user_id);
        let access = RoleAggregator::new(&self.menus, &self.depts).aggregate(user, &grants)?;
        if access.is_empty() {
            return Ok(PermissionContext::empty(tenant_id, user_id));
        }

        if access.is_super_admin {
            security_log!(
                "INFO",
                "super_admin_resolved",
                tenant_id = tenant_id,
                user_id = user_id,
                username = %user.username
            );
        }

        let menu_tree = self
            .menus
            .prune(&access.permission_codes, access.is_super_admin);

        Ok(PermissionContext {
            tenant_id: tenant_id.to_string(),
            user_id,
            is_super_admin: access.is_super_admin,
            role_keys: access.role_keys,
            permission_codes: access.permission_codes,
            menu_tree,
            data_scope: access.data_scope,
        })
    }
}

/// Build the model for `snapshot` and resolve `user_id` in one go
pub fn resolve_context(
    snapshot: TenantSnapshot,
    user_id: i64,
    limits: TreeLimits,
) -> Result<PermissionContext> {
    TenantModel::build(snapshot, limits)?.resolve(user_id)
}
