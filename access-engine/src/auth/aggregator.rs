//! Role aggregation
//!
//! Merges everything a user's roles grant. Always a union: holding one more
//! role can only add access, never remove it.

use std::collections::BTreeSet;

use shared::WILDCARD_PERMISSION;
use shared::models::{Role, User};

use crate::core::Result;
use crate::dept::DeptHierarchy;
use crate::menu::MenuTree;
use crate::scope::{DataScopeFilter, DataScopeResolver};

/// One role held by the user, with its links
#[derive(Debug, Clone)]
pub struct RoleGrant<'a> {
    pub role: &'a Role,
    /// RoleMenu ids
    pub menu_ids: BTreeSet<i64>,
    /// RoleDept ids (CUSTOM scope only)
    pub dept_ids: BTreeSet<i64>,
}

/// Union of all enabled roles' grants
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregatedAccess {
    pub is_super_admin: bool,
    pub role_keys: BTreeSet<String>,
    pub menu_ids: BTreeSet<i64>,
    pub permission_codes: BTreeSet<String>,
    pub data_scope: DataScopeFilter,
}

impl AggregatedAccess {
    /// No enabled role contributed anything
    pub fn is_empty(&self) -> bool {
        !self.is_super_admin && self.role_keys.is_empty()
    }
}

pub struct RoleAggregator<'a> {
    menus: &'a MenuTree,
    depts: &'a DeptHierarchy,
}

impl<'a> RoleAggregator<'a> {
    pub fn new(menus: &'a MenuTree, depts: &'a DeptHierarchy) -> Self {
        Self { menus, depts }
    }

    /// Aggregate the enabled roles in `grants` for `user`.
    ///
    /// Every enabled role's scope is resolved, super admin included, so a
    /// malformed scope value fails the whole resolution.
    pub fn aggregate(&self, user: &User, grants: &[RoleGrant<'_>]) -> Result<AggregatedAccess> {
        let resolver = DataScopeResolver::new(self.depts);
        let mut access = AggregatedAccess::default();

        for grant in grants {
            if !grant.role.enabled {
                tracing::debug!(role_id = grant.role.id, "Skipping disabled role");
                continue;
            }
            access.role_keys.insert(grant.role.key.clone());
            access.is_super_admin |= grant.role.is_super_admin_key();
            access.menu_ids.extend(grant.menu_ids.iter().copied());

            let scope = resolver.resolve(grant.role, &grant.dept_ids, user.dept_id)?;
            access.data_scope.merge(scope);
        }

        access.permission_codes = self.menus.flatten_permission_codes(&access.menu_ids);
        if access.permission_codes.contains(WILDCARD_PERMISSION) {
            access.is_super_admin = true;
        }

        if access.is_super_admin {
            access.permission_codes.insert(WILDCARD_PERMISSION.to_string());
            access.data_scope = DataScopeFilter::unrestricted(self.depts);
        }

        tracing::debug!(
            user_id = user.id,
            roles = access.role_keys.len(),
            codes = access.permission_codes.len(),
            depts = access.data_scope.visible_dept_ids.len(),
            is_super_admin = access.is_super_admin,
            "Aggregated role grants"
        );
        Ok(access)
    }
}
