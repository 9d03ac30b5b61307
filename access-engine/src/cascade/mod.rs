//! Cascade deletion planning
//!
//! Deleting a menu or department removes its whole subtree. The plan lists
//! every id that would go and every row still pointing at one of them; a
//! plan with references is refused as a whole.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::auth::TenantModel;
use crate::core::{EngineError, EntityKind, Result};
use crate::tree::TreeKind;

/// A row that still references an id in the deletion set
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockingReference {
    RoleMenu {
        role_id: i64,
        /// `None` when the link outlived its role
        role_key: Option<String>,
        menu_id: i64,
    },
    RoleDept {
        role_id: i64,
        role_key: Option<String>,
        dept_id: i64,
    },
    UserDept {
        user_id: i64,
        username: String,
        dept_id: i64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionPlan {
    pub kind: TreeKind,
    pub target_id: i64,
    /// Target first, then its descendants in pre-order
    pub ids_to_delete: Vec<i64>,
    pub blocked_by: Vec<BlockingReference>,
}

impl DeletionPlan {
    pub fn is_blocked(&self) -> bool {
        !self.blocked_by.is_empty()
    }

    /// Turn a blocked plan into [`EngineError::ReferentialBlock`]
    pub fn ensure_unblocked(self) -> Result<Self> {
        if self.is_blocked() {
            return Err(EngineError::ReferentialBlock {
                kind: self.kind,
                target_id: self.target_id,
                blocked_by: self.blocked_by,
            });
        }
        Ok(self)
    }
}

pub struct CascadeDeletionPlanner<'a> {
    model: &'a TenantModel,
}

impl<'a> CascadeDeletionPlanner<'a> {
    pub fn new(model: &'a TenantModel) -> Self {
        Self { model }
    }

    pub fn menu_plan(&self, menu_id: i64) -> Result<DeletionPlan> {
        let ids = self.model.menus().descendants_of(menu_id);
        if ids.is_empty() {
            return Err(EngineError::NotFound {
                entity: EntityKind::Menu,
                id: menu_id,
            });
        }
        let doomed: BTreeSet<i64> = ids.iter().copied().collect();
        let snapshot = self.model.snapshot();

        let mut blocked_by: Vec<_> = snapshot
            .role_menus
            .iter()
            .filter(|rm| doomed.contains(&rm.menu_id))
            .map(|rm| BlockingReference::RoleMenu {
                role_id: rm.role_id,
                role_key: snapshot.role(rm.role_id).map(|r| r.key.clone()),
                menu_id: rm.menu_id,
            })
            .collect();
        blocked_by.sort();
        blocked_by.dedup();

        Ok(self.finish(TreeKind::Menu, menu_id, ids, blocked_by))
    }

    pub fn dept_plan(&self, dept_id: i64) -> Result<DeletionPlan> {
        let ids = self.model.depts().index().descendants_of(dept_id);
        if ids.is_empty() {
            return Err(EngineError::NotFound {
                entity: EntityKind::Dept,
                id: dept_id,
            });
        }
        let doomed: BTreeSet<i64> = ids.iter().copied().collect();
        let snapshot = self.model.snapshot();

        let roles = snapshot
            .role_depts
            .iter()
            .filter(|rd| doomed.contains(&rd.dept_id))
            .map(|rd| BlockingReference::RoleDept {
                role_id: rd.role_id,
                role_key: snapshot.role(rd.role_id).map(|r| r.key.clone()),
                dept_id: rd.dept_id,
            });
        let users = snapshot
            .users
            .iter()
            .filter_map(|u| u.dept_id.filter(|d| doomed.contains(d)).map(|d| (u, d)))
            .map(|(u, dept_id)| BlockingReference::UserDept {
                user_id: u.id,
                username: u.username.clone(),
                dept_id,
            });
        let mut blocked_by: Vec<_> = roles.chain(users).collect();
        blocked_by.sort();
        blocked_by.dedup();

        Ok(self.finish(TreeKind::Dept, dept_id, ids, blocked_by))
    }

    fn finish(
        &self,
        kind: TreeKind,
        target_id: i64,
        ids_to_delete: Vec<i64>,
        blocked_by: Vec<BlockingReference>,
    ) -> DeletionPlan {
        tracing::debug!(
            tenant_id = self.model.tenant_id(),
            %kind,
            target_id,
            ids = ids_to_delete.len(),
            blocked = blocked_by.len(),
            "Planned cascade deletion"
        );
        DeletionPlan {
            kind,
            target_id,
            ids_to_delete,
            blocked_by,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::TenantSnapshot;
    use crate::tree::TreeLimits;
    use shared::models::{Department, Menu, MenuType, Role, RoleDept, RoleMenu, User};

    fn snapshot() -> TenantSnapshot {
        let mut s = TenantSnapshot::new("t1");
        s.depts = [(1, None), (2, Some(1)), (3, Some(2)), (4, Some(1))]
            .into_iter()
            .map(|(id, parent_id)| Department {
                id,
                tenant_id: "t1".into(),
                parent_id,
                name: format!("dept-{id}"),
                order_num: 0,
                enabled: true,
            })
            .collect();
        s.menus = vec![
            Menu {
                id: 10,
                tenant_id: "t1".into(),
                parent_id: None,
                name: "System".into(),
                path: "/system".into(),
                menu_type: MenuType::Directory,
                permission_code: None,
                order_num: 0,
                visible: true,
                is_frame: false,
                enabled: true,
            },
            Menu {
                id: 11,
                tenant_id: "t1".into(),
                parent_id: Some(10),
                name: "Users".into(),
                path: "user".into(),
                menu_type: MenuType::Page,
                permission_code: Some("system:user:list".into()),
                order_num: 0,
                visible: true,
                is_frame: false,
                enabled: true,
            },
        ];
        s.roles = vec![Role {
            id: 5,
            tenant_id: "t1".into(),
            key: "auditor".into(),
            name: "Auditor".into(),
            data_scope: "2".into(),
            enabled: true,
        }];
        s.users = vec![User {
            id: 9,
            tenant_id: "t1".into(),
            username: "alice".into(),
            dept_id: Some(3),
            enabled: true,
        }];
        s
    }

    fn model(s: TenantSnapshot) -> TenantModel {
        TenantModel::build(s, TreeLimits::default()).unwrap()
    }

    #[test]
    fn test_dept_blocked_by_user_in_descendant() {
        let m = model(snapshot());
        let plan = CascadeDeletionPlanner::new(&m).dept_plan(2).unwrap();
        assert_eq!(plan.ids_to_delete, vec![2, 3]);
        assert_eq!(
            plan.blocked_by,
            vec![BlockingReference::UserDept {
                user_id: 9,
                username: "alice".into(),
                dept_id: 3,
            }]
        );
        let err = plan.ensure_unblocked().unwrap_err();
        assert!(matches!(
            err,
            EngineError::ReferentialBlock { target_id: 2, ref blocked_by, .. } if blocked_by.len() == 1
        ));
    }

    #[test]
    fn test_dept_blocked_by_custom_role_link() {
        let mut s = snapshot();
        s.role_depts.push(RoleDept {
            role_id: 5,
            dept_id: 4,
        });
        s.role_depts.push(RoleDept {
            role_id: 77,
            dept_id: 4,
        });
        let m = model(s);
        let plan = CascadeDeletionPlanner::new(&m).dept_plan(4).unwrap();
        assert_eq!(
            plan.blocked_by,
            vec![
                BlockingReference::RoleDept {
                    role_id: 5,
                    role_key: Some("auditor".into()),
                    dept_id: 4,
                },
                BlockingReference::RoleDept {
                    role_id: 77,
                    role_key: None,
                    dept_id: 4,
                },
            ]
        );
    }

    #[test]
    fn test_unreferenced_subtree_is_clear() {
        let m = model(snapshot());
        let plan = CascadeDeletionPlanner::new(&m).dept_plan(4).unwrap();
        assert!(!plan.is_blocked());
        assert_eq!(plan.ensure_unblocked().unwrap().ids_to_delete, vec![4]);
    }

    #[test]
    fn test_menu_plan() {
        let mut s = snapshot();
        let m = model(s.clone());
        let plan = CascadeDeletionPlanner::new(&m).menu_plan(10).unwrap();
        assert_eq!(plan.ids_to_delete, vec![10, 11]);
        assert!(!plan.is_blocked());

        s.role_menus.push(RoleMenu {
            role_id: 5,
            menu_id: 11,
        });
        let m = model(s);
        let plan = CascadeDeletionPlanner::new(&m).menu_plan(10).unwrap();
        assert!(plan.is_blocked());
        assert_eq!(plan.kind, TreeKind::Menu);
    }

    #[test]
    fn test_unknown_target() {
        let m = model(snapshot());
        let planner = CascadeDeletionPlanner::new(&m);
        assert!(matches!(
            planner.dept_plan(404),
            Err(EngineError::NotFound { entity: EntityKind::Dept, id: 404 })
        ));
        assert!(matches!(
            planner.menu_plan(404),
            Err(EngineError::NotFound { entity: EntityKind::Menu, .. })
        ));
    }

    #[test]
    fn test_blocking_reference_json() {
        let r = BlockingReference::RoleMenu {
            role_id: 1,
            role_key: None,
            menu_id: 2,
        };
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["kind"], "role_menu");
        assert_eq!(v["menu_id"], 2);
    }
}
