//! Menu Tree
//!
//! Builds the full menu hierarchy and prunes it to what a permission-code
//! set can reach.
//!
//! # Pruning rules
//!
//! - super admin: the full tree, untouched
//! - a disabled node is dropped together with its subtree
//! - a node stays if its own code is granted
//! - a directory or page also stays if at least one descendant stays
//! - a button without a granted code is always dropped
//!
//! Sibling order always comes from the source tree.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use shared::models::{Menu, MenuType};

use crate::core::{EngineError, Result};
use crate::tree::{TreeIndex, TreeKind, TreeLimits};

/// One node of a rendered (full or pruned) menu tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuNode {
    #[serde(flatten)]
    pub menu: Menu,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuNode>,
}

impl MenuNode {
    /// Number of nodes in this subtree
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(MenuNode::size).sum::<usize>()
    }

    /// Pre-order ids of this subtree
    pub fn ids(&self) -> Vec<i64> {
        let mut out = Vec::new();
        collect_ids(self, &mut out);
        out
    }
}

fn collect_ids(node: &MenuNode, out: &mut Vec<i64>) {
    out.push(node.menu.id);
    for child in &node.children {
        collect_ids(child, out);
    }
}

#[derive(Debug, Clone)]
pub struct MenuTree {
    index: TreeIndex<Menu>,
}

impl MenuTree {
    /// Validate every row and index the hierarchy
    pub fn build(menus: Vec<Menu>, limits: TreeLimits) -> Result<Self> {
        for menu in &menus {
            if let Some(reason) = menu.validation_error() {
                return Err(EngineError::InvalidMenu {
                    id: menu.id,
                    reason,
                });
            }
        }
        let index = TreeIndex::build(TreeKind::Menu, menus, limits)?;
        Ok(Self { index })
    }

    pub fn index(&self) -> &TreeIndex<Menu> {
        &self.index
    }

    pub fn contains(&self, id: i64) -> bool {
        self.index.contains(id)
    }

    pub fn descendants_of(&self, id: i64) -> Vec<i64> {
        self.index.descendants_of(id)
    }

    /// The whole hierarchy, nothing removed
    pub fn full_tree(&self) -> Vec<MenuNode> {
        self.render(&|_, _| true)
    }

    /// Prune to the enabled nodes reachable by `codes`
    pub fn prune(&self, codes: &BTreeSet<String>, is_super_admin: bool) -> Vec<MenuNode> {
        if is_super_admin {
            return self.full_tree();
        }
        self.render(&|menu: &Menu, children: &[MenuNode]| {
            let granted = menu.code().is_some_and(|code| codes.contains(code));
            menu.enabled && (granted || (menu.menu_type.is_container() && !children.is_empty()))
        })
    }

    /// Sidebar input: the pruned tree without buttons, hidden or disabled
    /// nodes, and without directories left empty by that filtering
    pub fn navigation_tree(&self, codes: &BTreeSet<String>, is_super_admin: bool) -> Vec<MenuNode> {
        filter_navigation(self.prune(codes, is_super_admin))
    }

    /// Codes carried by the given menu ids.
    ///
    /// Hidden menus still contribute (visibility is a rendering concern);
    /// disabled menus and unknown ids contribute nothing.
    pub fn flatten_permission_codes<'a>(
        &self,
        menu_ids: impl IntoIterator<Item = &'a i64>,
    ) -> BTreeSet<String> {
        menu_ids
            .into_iter()
            .filter_map(|id| self.index.get(*id))
            .filter(|menu| menu.enabled)
            .filter_map(|menu| menu.code())
            .map(str::to_string)
            .collect()
    }

    fn render(&self, keep: &dyn Fn(&Menu, &[MenuNode]) -> bool) -> Vec<MenuNode> {
        self.index
            .root_positions()
            .iter()
            .filter_map(|&pos| self.render_at(pos, keep))
            .collect()
    }

    // Recursion depth is bounded by the index's validated max depth
    fn render_at(
        &self,
        pos: usize,
        keep: &dyn Fn(&Menu, &[MenuNode]) -> bool,
    ) -> Option<MenuNode> {
        let children: Vec<MenuNode> = self
            .index
            .child_positions(pos)
            .iter()
            .filter_map(|&child| self.render_at(child, keep))
            .collect();
        let menu = self.index.record_at(pos);
        keep(menu, &children).then(|| MenuNode {
            menu: menu.clone(),
            children,
        })
    }
}

fn filter_navigation(nodes: Vec<MenuNode>) -> Vec<MenuNode> {
    nodes
        .into_iter()
        .filter(|node| {
            node.menu.menu_type != MenuType::Button && node.menu.visible && node.menu.enabled
        })
        .filter_map(|mut node| {
            node.children = filter_navigation(std::mem::take(&mut node.children));
            if node.menu.menu_type == MenuType::Directory && node.children.is_empty() {
                None
            } else {
                Some(node)
            }
        })
        .collect()
}
