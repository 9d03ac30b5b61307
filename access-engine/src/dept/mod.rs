//! 部门层级 (Department hierarchy)
//!
//! Ancestor / descendant queries over one tenant's department tree.
//! Both directions are inclusive of the starting department.

use std::collections::BTreeSet;

use shared::models::Department;

use crate::core::Result;
use crate::tree::{TreeIndex, TreeKind, TreeLimits};

#[derive(Debug, Clone)]
pub struct DeptHierarchy {
    index: TreeIndex<Department>,
}

impl DeptHierarchy {
    pub fn build(depts: Vec<Department>, limits: TreeLimits) -> Result<Self> {
        let index = TreeIndex::build(TreeKind::Dept, depts, limits)?;
        Ok(Self { index })
    }

    pub fn index(&self) -> &TreeIndex<Department> {
        &self.index
    }

    pub fn get(&self, id: i64) -> Option<&Department> {
        self.index.get(id)
    }

    pub fn contains(&self, id: i64) -> bool {
        self.index.contains(id)
    }

    /// `id` and every department below it; empty when `id` is unknown
    pub fn descendants_of(&self, id: i64) -> BTreeSet<i64> {
        self.index.descendants_of(id).into_iter().collect()
    }

    /// `id` and every department above it, up to the root
    pub fn ancestors_of(&self, id: i64) -> BTreeSet<i64> {
        self.index.ancestors_of(id).into_iter().collect()
    }

    pub fn all_ids(&self) -> BTreeSet<i64> {
        self.index.records().iter().map(|d| d.id).collect()
    }

    /// Comma-separated ancestor chain from the root down to (excluding) `id`,
    /// prefixed with `0`, as stored in the `ancestors` column.
    ///
    /// Returns `None` for an unknown department.
    pub fn ancestry_path(&self, id: i64) -> Option<String> {
        self.index.position(id)?;
        let chain = self.index.ancestors_of(id);
        let path = std::iter::once("0".to_string())
            .chain(chain.iter().skip(1).rev().map(|a| a.to_string()))
            .collect::<Vec<_>>()
            .join(",");
        Some(path)
    }
}
