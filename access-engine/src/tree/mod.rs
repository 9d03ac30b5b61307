//! Tree Index
//!
//! Parent/child index over any flat record set sharing an id/parent-id shape.
//!
//! Records live in an arena (`Vec<T>`) and are addressed by position; the
//! index keeps `parent` and `children` as arena positions, never as live
//! references between nodes. Every parent walk is bounded by
//! [`TreeLimits::max_depth`], and a cycle in the source rows is a hard
//! [`EngineError::CycleDetected`], not something to skip.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use shared::models::{Department, Menu};

use crate::core::{EngineError, EntityKind, Result};

pub const DEFAULT_MAX_DEPTH: usize = 100;
pub const DEFAULT_MAX_NODES: usize = 100_000;

/// Which hierarchy an index (or an error) refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeKind {
    Menu,
    Dept,
}

impl fmt::Display for TreeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TreeKind::Menu => "menu",
            TreeKind::Dept => "dept",
        })
    }
}

/// Size and depth guards applied while building an index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeLimits {
    pub max_depth: usize,
    pub max_nodes: usize,
}

impl Default for TreeLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_nodes: DEFAULT_MAX_NODES,
        }
    }
}

/// A row that can be placed in a [`TreeIndex`]
pub trait TreeRecord {
    fn id(&self) -> i64;
    /// Raw parent id; `None` and `Some(0)` both mean "root"
    fn parent_id(&self) -> Option<i64>;
    fn order_num(&self) -> i32;
}

impl TreeRecord for Menu {
    fn id(&self) -> i64 {
        self.id
    }
    fn parent_id(&self) -> Option<i64> {
        self.parent_id
    }
    fn order_num(&self) -> i32 {
        self.order_num
    }
}

impl TreeRecord for Department {
    fn id(&self) -> i64 {
        self.id
    }
    fn parent_id(&self) -> Option<i64> {
        self.parent_id
    }
    fn order_num(&self) -> i32 {
        self.order_num
    }
}

/// Normalized parent id: `0` is the root sentinel
fn parent_key(raw: Option<i64>) -> Option<i64> {
    raw.filter(|p| *p != 0)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    New,
    InProgress,
    Done,
}

#[derive(Debug, Clone)]
pub struct TreeIndex<T> {
    kind: TreeKind,
    limits: TreeLimits,
    records: Vec<T>,
    positions: HashMap<i64, usize>,
    parent: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
    roots: Vec<usize>,
    /// 1 for roots
    depth: Vec<usize>,
}

impl<T: TreeRecord> TreeIndex<T> {
    /// Build the index, rejecting duplicates, cycles and oversized input
    pub fn build(kind: TreeKind, records: Vec<T>, limits: TreeLimits) -> Result<Self> {
        if records.len() > limits.max_nodes {
            return Err(EngineError::LimitExceeded {
                kind,
                limit: "node count",
                actual: records.len(),
                max: limits.max_nodes,
            });
        }

        let mut positions = HashMap::with_capacity(records.len());
        for (pos, record) in records.iter().enumerate() {
            if positions.insert(record.id(), pos).is_some() {
                return Err(EngineError::DuplicateId {
                    kind,
                    id: record.id(),
                });
            }
        }

        let mut parent = Vec::with_capacity(records.len());
        for record in &records {
            let resolved = match parent_key(record.parent_id()) {
                None => None,
                Some(pid) if pid == record.id() => {
                    return Err(EngineError::CycleDetected {
                        kind,
                        id: record.id(),
                    });
                }
                Some(pid) => match positions.get(&pid) {
                    Some(&p) => Some(p),
                    None => {
                        tracing::warn!(
                            %kind,
                            id = record.id(),
                            parent_id = pid,
                            "Parent not present in snapshot, indexing as root"
                        );
                        None
                    }
                },
            };
            parent.push(resolved);
        }

        let depth = compute_depths(kind, &records, &parent, limits.max_depth)?;

        let mut children = vec![Vec::new(); records.len()];
        let mut roots = Vec::new();
        for (pos, p) in parent.iter().enumerate() {
            match p {
                Some(p) => children[*p].push(pos),
                None => roots.push(pos),
            }
        }
        let sort_key = |pos: &usize| (records[*pos].order_num(), records[*pos].id());
        roots.sort_by_key(sort_key);
        for list in &mut children {
            list.sort_by_key(sort_key);
        }

        Ok(Self {
            kind,
            limits,
            records,
            positions,
            parent,
            children,
            roots,
            depth,
        })
    }

    pub fn kind(&self) -> TreeKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: i64) -> bool {
        self.positions.contains_key(&id)
    }

    pub fn get(&self, id: i64) -> Option<&T> {
        self.positions.get(&id).map(|&pos| &self.records[pos])
    }

    /// Records in source order
    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn roots(&self) -> impl Iterator<Item = &T> + '_ {
        self.roots.iter().map(|&pos| &self.records[pos])
    }

    pub fn children_of(&self, id: i64) -> impl Iterator<Item = &T> + '_ {
        self.positions
            .get(&id)
            .into_iter()
            .flat_map(|&pos| self.children[pos].iter())
            .map(|&pos| &self.records[pos])
    }

    /// Depth of a node (roots are 1)
    pub fn depth_of(&self, id: i64) -> Option<usize> {
        self.positions.get(&id).map(|&pos| self.depth[pos])
    }

    /// Pre-order ids of `id` and everything below it; empty when `id` is unknown
    pub fn descendants_of(&self, id: i64) -> Vec<i64> {
        let Some(&start) = self.positions.get(&id) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let mut stack = vec![start];
        while let Some(pos) = stack.pop() {
            out.push(self.records[pos].id());
            stack.extend(self.children[pos].iter().rev());
        }
        out
    }

    /// `id` followed by its parent, grandparent, ... up to the root
    pub fn ancestors_of(&self, id: i64) -> Vec<i64> {
        let mut out = Vec::new();
        let mut cur = self.positions.get(&id).copied();
        while let Some(pos) = cur {
            out.push(self.records[pos].id());
            cur = self.parent[pos];
        }
        out
    }

    /// Check that moving `id` under `new_parent` keeps the hierarchy a tree
    /// within the depth limit. `None` (or `Some(0)`) moves it to the root.
    pub fn validate_reparent(&self, id: i64, new_parent: Option<i64>) -> Result<()> {
        let Some(&pos) = self.positions.get(&id) else {
            return Err(EngineError::NotFound {
                entity: self.kind.into(),
                id,
            });
        };

        let parent_depth = match parent_key(new_parent) {
            None => 0,
            Some(pid) => {
                let Some(&ppos) = self.positions.get(&pid) else {
                    return Err(EngineError::NotFound {
                        entity: self.kind.into(),
                        id: pid,
                    });
                };
                if pid == id || self.ancestors_of(pid).contains(&id) {
                    return Err(EngineError::CycleDetected {
                        kind: self.kind,
                        id,
                    });
                }
                self.depth[ppos]
            }
        };

        let subtree_height = self
            .descendants_of(id)
            .iter()
            .filter_map(|d| self.depth_of(*d))
            .max()
            .map_or(1, |deepest| deepest - self.depth[pos] + 1);
        let new_depth = parent_depth + subtree_height;
        if new_depth > self.limits.max_depth {
            return Err(EngineError::LimitExceeded {
                kind: self.kind,
                limit: "depth",
                actual: new_depth,
                max: self.limits.max_depth,
            });
        }
        Ok(())
    }

    pub(crate) fn position(&self, id: i64) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    pub(crate) fn root_positions(&self) -> &[usize] {
        &self.roots
    }

    pub(crate) fn child_positions(&self, pos: usize) -> &[usize] {
        &self.children[pos]
    }

    pub(crate) fn record_at(&self, pos: usize) -> &T {
        &self.records[pos]
    }
}

/// Walk every parent chain once, memoizing depths.
///
/// A chain that comes back to a node still on the current path is a cycle.
/// A chain longer than `max_depth` is reported the same way: past the bound a
/// long cycle and a runaway chain are indistinguishable.
fn compute_depths<T: TreeRecord>(
    kind: TreeKind,
    records: &[T],
    parent: &[Option<usize>],
    max_depth: usize,
) -> Result<Vec<usize>> {
    let mut state = vec![Visit::New; records.len()];
    let mut depth = vec![0usize; records.len()];
    let mut path = Vec::new();

    for start in 0..records.len() {
        if state[start] == Visit::Done {
            continue;
        }

        path.clear();
        let mut cur = Some(start);
        let mut base = 0;
        while let Some(pos) = cur {
            match state[pos] {
                Visit::Done => {
                    base = depth[pos];
                    break;
                }
                Visit::InProgress => {
                    return Err(EngineError::CycleDetected {
                        kind,
                        id: records[pos].id(),
                    });
                }
                Visit::New => {
                    if path.len() >= max_depth {
                        return Err(EngineError::CycleDetected {
                            kind,
                            id: records[pos].id(),
                        });
                    }
                    state[pos] = Visit::InProgress;
                    path.push(pos);
                    cur = parent[pos];
                }
            }
        }

        for (offset, &pos) in path.iter().rev().enumerate() {
            let d = base + offset + 1;
            if d > max_depth {
                return Err(EngineError::CycleDetected {
                    kind,
                    id: records[pos].id(),
                });
            }
            depth[pos] = d;
            state[pos] = Visit::Done;
        }
    }

    Ok(depth)
}
