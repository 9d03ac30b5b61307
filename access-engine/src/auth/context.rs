//! 权限上下文 (Permission context)
//!
//! The computed, never persisted result of resolving one user: what the user
//! may call, what menus they see, and which rows they may touch.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use shared::{TenantId, code_grants};

use crate::menu::MenuNode;
use crate::scope::DataScopeFilter;

/// Resolved access of one user inside one tenant.
///
/// Ordered sets throughout, so two resolutions over the same snapshot
/// compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionContext {
    pub tenant_id: TenantId,
    pub user_id: i64,
    pub is_super_admin: bool,
    /// Keys of the enabled roles that contributed
    pub role_keys: BTreeSet<String>,
    pub permission_codes: BTreeSet<String>,
    /// Pruned menu tree (full tree for super admin)
    pub menu_tree: Vec<MenuNode>,
    pub data_scope: DataScopeFilter,
}

impl PermissionContext {
    /// The most restrictive context: no codes, no menus, no rows
    pub fn empty(tenant_id: impl Into<TenantId>, user_id: i64) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            user_id,
            is_super_admin: false,
            role_keys: BTreeSet::new(),
            permission_codes: BTreeSet::new(),
            menu_tree: Vec::new(),
            data_scope: DataScopeFilter::empty(),
        }
    }

    /// 检查是否拥有指定权限 (支持 `system:user:*` 前缀通配)
    ///
    /// Only `is_super_admin` grants everything; a `*` or `*:*:*` code on its
    /// own matches nothing but itself.
    pub fn has_permission(&self, permission: &str) -> bool {
        if self.is_super_admin {
            return true;
        }
        self.permission_codes
            .iter()
            .any(|granted| code_grants(granted, permission))
    }

    /// 检查是否拥有任一指定权限
    pub fn has_any_permission(&self, permissions: &[&str]) -> bool {
        permissions.iter().any(|p| self.has_permission(p))
    }

    /// 检查是否拥有所有指定权限
    pub fn has_all_permissions(&self, permissions: &[&str]) -> bool {
        permissions.iter().all(|p| self.has_permission(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(codes: &[&str]) -> PermissionContext {
        let mut ctx = PermissionContext::empty("t1", 1);
        ctx.permission_codes = codes.iter().map(|c| c.to_string()).collect();
        ctx
    }

    #[test]
    fn test_exact_and_wildcard() {
        let c = ctx(&["system:user:list", "monitor:*"]);
        assert!(c.has_permission("system:user:list"));
        assert!(!c.has_permission("system:user:remove"));
        assert!(c.has_permission("monitor:online:list"));
        assert!(!c.has_permission("monitoring:online:list"));
    }

    #[test]
    fn test_any_and_all() {
        let c = ctx(&["system:user:list", "system:role:list"]);
        assert!(c.has_any_permission(&["system:menu:list", "system:role:list"]));
        assert!(!c.has_all_permissions(&["system:menu:list", "system:role:list"]));
        assert!(c.has_all_permissions(&["system:user:list", "system:role:list"]));
    }

    #[test]
    fn test_empty_context_denies_everything() {
        let c = PermissionContext::empty("t1", 1);
        assert!(!c.has_permission("system:user:list"));
        assert!(c.menu_tree.is_empty());
        assert!(c.data_scope.is_empty());
    }

    #[test]
    fn test_wildcard_codes_without_flag_grant_nothing() {
        let c = ctx(&["*"]);
        assert!(!c.has_permission("system:user:remove"));

        let c = ctx(&["*:*:*", "*:*"]);
        assert!(!c.has_permission("system:user:remove"));
        assert!(!c.has_any_permission(&["system:menu:list", "tool:gen:list"]));
    }

    #[test]
    fn test_super_admin_flag_grants() {
        let mut c = PermissionContext::empty("t1", 1);
        c.is_super_admin = true;
        assert!(c.has_permission("anything:at:all"));
    }
}
