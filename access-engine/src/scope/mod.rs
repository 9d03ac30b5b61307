//! 数据权限 (Data scope resolution)
//!
//! Turns one role's declared [`DataScope`] into a concrete set of visible
//! department ids, and answers the row-level "may this user see this record"
//! question for the caller's query layer.
//!
//! | Scope | Visible departments | self_only |
//! |---|---|---|
//! | ALL | every department in the tenant | - |
//! | CUSTOM | exactly the role's RoleDept ids | - |
//! | SELF_DEPT | the user's department | - |
//! | SELF_DEPT_AND_BELOW | the user's department subtree | - |
//! | SELF_ONLY | none | yes |
//! | DEPT_AND_BELOW_OR_SELF | the user's department subtree | yes |

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use shared::models::{DataScope, Role};

use crate::core::{EngineError, Result};
use crate::dept::DeptHierarchy;

/// Resolved row visibility for one user (or one role before merging)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataScopeFilter {
    /// Departments whose rows are visible
    pub visible_dept_ids: BTreeSet<i64>,
    /// Rows owned by the acting user are visible regardless of department
    pub self_only: bool,
    /// Every row in the tenant is visible, including rows without a department
    pub unrestricted: bool,
}

impl DataScopeFilter {
    /// Sees nothing
    pub fn empty() -> Self {
        Self::default()
    }

    /// Sees everything in the given hierarchy
    pub fn unrestricted(hierarchy: &DeptHierarchy) -> Self {
        Self {
            visible_dept_ids: hierarchy.all_ids(),
            self_only: false,
            unrestricted: true,
        }
    }

    /// Union with another filter: the result sees whatever either one sees
    pub fn merge(&mut self, other: DataScopeFilter) {
        self.visible_dept_ids.extend(other.visible_dept_ids);
        self.self_only |= other.self_only;
        self.unrestricted |= other.unrestricted;
    }

    pub fn is_empty(&self) -> bool {
        !self.unrestricted && !self.self_only && self.visible_dept_ids.is_empty()
    }

    pub fn permits_dept(&self, dept_id: i64) -> bool {
        self.unrestricted || self.visible_dept_ids.contains(&dept_id)
    }

    /// Row-level check.
    ///
    /// `row_dept_id` is the department the row belongs to, `row_owner_id` the
    /// user that created it.
    pub fn permits(
        &self,
        row_dept_id: Option<i64>,
        row_owner_id: Option<i64>,
        acting_user_id: i64,
    ) -> bool {
        if self.unrestricted {
            return true;
        }
        if row_dept_id.is_some_and(|d| self.visible_dept_ids.contains(&d)) {
            return true;
        }
        self.self_only && row_owner_id == Some(acting_user_id)
    }
}

/// Resolves data scope policies against one tenant's department tree
pub struct DataScopeResolver<'a> {
    hierarchy: &'a DeptHierarchy,
}

impl<'a> DataScopeResolver<'a> {
    pub fn new(hierarchy: &'a DeptHierarchy) -> Self {
        Self { hierarchy }
    }

    /// Resolve one role for a user.
    ///
    /// `custom_dept_ids` are the role's RoleDept ids, only read for CUSTOM.
    /// Fails closed with [`EngineError::InvalidScopePolicy`] on an unknown
    /// stored value.
    pub fn resolve(
        &self,
        role: &Role,
        custom_dept_ids: &BTreeSet<i64>,
        user_dept_id: Option<i64>,
    ) -> Result<DataScopeFilter> {
        let scope = role
            .parsed_data_scope()
            .map_err(|e| EngineError::InvalidScopePolicy {
                role_id: role.id,
                value: e.0,
            })?;
        let filter = self.resolve_scope(scope, custom_dept_ids, user_dept_id);
        tracing::debug!(
            role_id = role.id,
            scope = %scope,
            visible = filter.visible_dept_ids.len(),
            self_only = filter.self_only,
            "Resolved role data scope"
        );
        Ok(filter)
    }

    /// Resolve an already-parsed scope
    pub fn resolve_scope(
        &self,
        scope: DataScope,
        custom_dept_ids: &BTreeSet<i64>,
        user_dept_id: Option<i64>,
    ) -> DataScopeFilter {
        match scope {
            DataScope::All => DataScopeFilter::unrestricted(self.hierarchy),
            DataScope::Custom => DataScopeFilter {
                visible_dept_ids: self.known_only(custom_dept_ids),
                ..DataScopeFilter::default()
            },
            DataScope::SelfDept => DataScopeFilter {
                visible_dept_ids: user_dept_id
                    .filter(|d| self.hierarchy.contains(*d))
                    .into_iter()
                    .collect(),
                ..DataScopeFilter::default()
            },
            DataScope::SelfDeptAndBelow => DataScopeFilter {
                visible_dept_ids: self.subtree_of(user_dept_id),
                ..DataScopeFilter::default()
            },
            DataScope::SelfOnly => DataScopeFilter {
                self_only: true,
                ..DataScopeFilter::default()
            },
            DataScope::DeptAndBelowOrSelf => DataScopeFilter {
                visible_dept_ids: self.subtree_of(user_dept_id),
                self_only: true,
                unrestricted: false,
            },
        }
    }

    fn subtree_of(&self, dept_id: Option<i64>) -> BTreeSet<i64> {
        dept_id
            .map(|d| self.hierarchy.descendants_of(d))
            .unwrap_or_default()
    }

    fn known_only(&self, ids: &BTreeSet<i64>) -> BTreeSet<i64> {
        ids.iter()
            .copied()
            .filter(|id| {
                let known = self.hierarchy.contains(*id);
                if !known {
                    tracing::warn!(dept_id = id, "Dropping custom dept id outside tenant hierarchy");
                }
                known
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TreeLimits;
    use shared::models::Department;

    fn dept(id: i64, parent: Option<i64>) -> Department {
        Department {
            id,
            tenant_id: "t1".into(),
            parent_id: parent,
            name: format!("dept-{id}"),
            order_num: 0,
            enabled: true,
        }
    }

    /// A(1) → B(2) → C(3), plus X(10) and Y(11) under A
    fn hierarchy() -> DeptHierarchy {
        DeptHierarchy::build(
            vec![
                dept(1, None),
                dept(2, Some(1)),
                dept(3, Some(2)),
                dept(10, Some(1)),
                dept(11, Some(1)),
            ],
            TreeLimits::default(),
        )
        .unwrap()
    }

    fn role(scope: &str) -> Role {
        Role {
            id: 7,
            tenant_id: "t1".into(),
            key: "r".into(),
            name: "role".into(),
            data_scope: scope.into(),
            enabled: true,
        }
    }

    fn set(ids: &[i64]) -> BTreeSet<i64> {
        ids.iter().copied().collect()
    }

    #[test]
    fn test_self_dept_and_below() {
        let h = hierarchy();
        let resolver = DataScopeResolver::new(&h);
        let filter = resolver
            .resolve(&role("SELF_DEPT_AND_BELOW"), &set(&[]), Some(2))
            .unwrap();
        assert_eq!(filter.visible_dept_ids, set(&[2, 3]));
        assert!(!filter.self_only);
    }

    #[test]
    fn test_custom_is_exact() {
        let h = hierarchy();
        let resolver = DataScopeResolver::new(&h);
        // X has no children here, and 1 is deliberately not expanded
        let filter = resolver
            .resolve(&role("2"), &set(&[1, 10, 11]), Some(3))
            .unwrap();
        assert_eq!(filter.visible_dept_ids, set(&[1, 10, 11]));
    }

    #[test]
    fn test_custom_drops_foreign_ids() {
        let h = hierarchy();
        let resolver = DataScopeResolver::new(&h);
        let filter = resolver
            .resolve(&role("CUSTOM"), &set(&[10, 999]), None)
            .unwrap();
        assert_eq!(filter.visible_dept_ids, set(&[10]));
    }

    #[test]
    fn test_all_and_self_scopes() {
        let h = hierarchy();
        let resolver = DataScopeResolver::new(&h);

        let all = resolver.resolve(&role("1"), &set(&[]), None).unwrap();
        assert_eq!(all.visible_dept_ids, set(&[1, 2, 3, 10, 11]));
        assert!(all.permits(None, None, 5));

        let own = resolver.resolve(&role("3"), &set(&[]), Some(2)).unwrap();
        assert_eq!(own.visible_dept_ids, set(&[2]));

        let me = resolver.resolve(&role("5"), &set(&[]), Some(2)).unwrap();
        assert!(me.visible_dept_ids.is_empty());
        assert!(me.self_only);
        assert!(me.permits(Some(3), Some(5), 5));
        assert!(!me.permits(Some(3), Some(6), 5));

        let mixed = resolver.resolve(&role("6"), &set(&[]), Some(2)).unwrap();
        assert_eq!(mixed.visible_dept_ids, set(&[2, 3]));
        assert!(mixed.self_only);
        assert!(mixed.permits(Some(10), Some(5), 5));
        assert!(mixed.permits(Some(3), Some(6), 5));
        assert!(!mixed.permits(Some(10), Some(6), 5));
    }

    #[test]
    fn test_user_without_dept_sees_nothing_relative() {
        let h = hierarchy();
        let resolver = DataScopeResolver::new(&h);
        for scope in ["3", "4"] {
            let filter = resolver.resolve(&role(scope), &set(&[]), None).unwrap();
            assert!(filter.is_empty());
        }
        let filter = resolver.resolve(&role("3"), &set(&[]), Some(404)).unwrap();
        assert!(filter.is_empty());
    }

    #[test]
    fn test_unknown_scope_fails_closed() {
        let h = hierarchy();
        let resolver = DataScopeResolver::new(&h);
        let err = resolver
            .resolve(&role("EVERYTHING"), &set(&[]), Some(1))
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidScopePolicy { role_id: 7, ref value } if value == "EVERYTHING"
        ));
    }

    #[test]
    fn test_merge_is_union() {
        let mut a = DataScopeFilter {
            visible_dept_ids: set(&[1, 2]),
            ..DataScopeFilter::default()
        };
        a.merge(DataScopeFilter {
            visible_dept_ids: set(&[2, 3]),
            self_only: true,
            unrestricted: false,
        });
        assert_eq!(a.visible_dept_ids, set(&[1, 2, 3]));
        assert!(a.self_only);
        assert!(a.permits_dept(3));
        assert!(!a.permits_dept(4));
    }
}
