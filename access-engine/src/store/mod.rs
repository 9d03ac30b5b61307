//! Snapshot storage
//!
//! The engine never talks to a database. A storage collaborator hands it one
//! tenant's flat rows as a [`TenantSnapshot`]; every computation is a pure
//! function over that snapshot.

pub mod memory;

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::TenantId;
use shared::models::{Department, Menu, Role, RoleDept, RoleMenu, User, UserRole};
use thiserror::Error;

use crate::core::{EngineError, EntityKind, Result};

pub use memory::InMemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Tenant {0} not found")]
    TenantNotFound(TenantId),

    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Source of per-tenant snapshots
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn load_snapshot(&self, tenant_id: &str) -> StoreResult<TenantSnapshot>;
}

/// Immutable flat rows of one tenant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantSnapshot {
    pub tenant_id: TenantId,
    #[serde(default)]
    pub menus: Vec<Menu>,
    #[serde(default)]
    pub depts: Vec<Department>,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub user_roles: Vec<UserRole>,
    #[serde(default)]
    pub role_menus: Vec<RoleMenu>,
    #[serde(default)]
    pub role_depts: Vec<RoleDept>,
}

impl TenantSnapshot {
    pub fn new(tenant_id: impl Into<TenantId>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            ..Self::default()
        }
    }

    /// Every row must carry this snapshot's tenant id
    pub fn verify_tenant(&self) -> Result<()> {
        let check = |entity: EntityKind, id: i64, found: &str| -> Result<()> {
            if found == self.tenant_id {
                Ok(())
            } else {
                Err(EngineError::TenantMismatch {
                    entity,
                    id,
                    expected: self.tenant_id.clone(),
                    found: found.to_string(),
                })
            }
        };
        for m in &self.menus {
            check(EntityKind::Menu, m.id, &m.tenant_id)?;
        }
        for d in &self.depts {
            check(EntityKind::Dept, d.id, &d.tenant_id)?;
        }
        for r in &self.roles {
            check(EntityKind::Role, r.id, &r.tenant_id)?;
        }
        for u in &self.users {
            check(EntityKind::User, u.id, &u.tenant_id)?;
        }
        Ok(())
    }

    pub fn user(&self, user_id: i64) -> Option<&User> {
        self.users.iter().find(|u| u.id == user_id)
    }

    pub fn role(&self, role_id: i64) -> Option<&Role> {
        self.roles.iter().find(|r| r.id == role_id)
    }

    pub fn role_ids_for_user(&self, user_id: i64) -> BTreeSet<i64> {
        self.user_roles
            .iter()
            .filter(|ur| ur.user_id == user_id)
            .map(|ur| ur.role_id)
            .collect()
    }

    pub fn menu_ids_for_role(&self, role_id: i64) -> BTreeSet<i64> {
        self.role_menus
            .iter()
            .filter(|rm| rm.role_id == role_id)
            .map(|rm| rm.menu_id)
            .collect()
    }

    pub fn dept_ids_for_role(&self, role_id: i64) -> BTreeSet<i64> {
        self.role_depts
            .iter()
            .filter(|rd| rd.role_id == role_id)
            .map(|rd| rd.dept_id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64, tenant: &str) -> User {
        User {
            id,
            tenant_id: tenant.into(),
            username: format!("u{id}"),
            dept_id: None,
            enabled: true,
        }
    }

    #[test]
    fn test_verify_tenant() {
        let mut snapshot = TenantSnapshot::new("t1");
        snapshot.users.push(user(1, "t1"));
        assert!(snapshot.verify_tenant().is_ok());

        snapshot.users.push(user(2, "t2"));
        let err = snapshot.verify_tenant().unwrap_err();
        assert!(matches!(
            err,
            EngineError::TenantMismatch {
                entity: EntityKind::User,
                id: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_link_lookups() {
        let mut snapshot = TenantSnapshot::new("t1");
        snapshot.user_roles = vec![
            UserRole { user_id: 1, role_id: 10 },
            UserRole { user_id: 1, role_id: 11 },
            UserRole { user_id: 2, role_id: 10 },
        ];
        snapshot.role_menus = vec![
            RoleMenu { role_id: 10, menu_id: 100 },
            RoleMenu { role_id: 11, menu_id: 101 },
        ];
        assert_eq!(
            snapshot.role_ids_for_user(1).into_iter().collect::<Vec<_>>(),
            vec![10, 11]
        );
        assert_eq!(
            snapshot.menu_ids_for_role(10).into_iter().collect::<Vec<_>>(),
            vec![100]
        );
        assert!(snapshot.dept_ids_for_role(10).is_empty());
    }

    #[test]
    fn test_snapshot_json_defaults() {
        let snapshot: TenantSnapshot = serde_json::from_str(r#"{"tenant_id":"t1"}"#).unwrap();
        assert_eq!(snapshot, TenantSnapshot::new("t1"));
    }
}
