//! Read-only hierarchy of every node the view can ever show.
//!
//! Seeded once from the authored [`Hierarchy`] and never mutated. All
//! queries are infallible: unknown ids simply produce empty results.

use indexmap::IndexMap;
use shared::{Hierarchy, TreeNode};
use std::collections::{HashMap, HashSet, VecDeque};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HierarchyError {
    #[error("node id '{0}' appears more than once")]
    DuplicateId(String),
    #[error("node '{id}' references unknown parent '{parent_id}'")]
    UnknownParent { id: String, parent_id: String },
    #[error("node '{0}' has level 0 but also a parent")]
    LevelZeroWithParent(String),
    #[error("node '{0}' is part of a parent cycle")]
    Cycle(String),
}

#[derive(Debug, Clone, Default)]
pub struct TreeStore {
    nodes: IndexMap<String, TreeNode>,
    // parent id -> indices into `nodes`, in source order
    children: HashMap<String, Vec<usize>>,
    roots: Vec<usize>,
}

impl TreeStore {
    pub fn new(nodes: Vec<TreeNode>) -> Result<Self, HierarchyError> {
        let mut indexed: IndexMap<String, TreeNode> = IndexMap::with_capacity(nodes.len());
        for node in nodes {
            if indexed.contains_key(&node.id) {
                return Err(HierarchyError::DuplicateId(node.id));
            }
            indexed.insert(node.id.clone(), node);
        }

        let mut children: HashMap<String, Vec<usize>> = HashMap::new();
        let mut roots = Vec::new();
        for (index, node) in indexed.values().enumerate() {
            match &node.parent_id {
                None => roots.push(index),
                Some(_) if node.level == 0 => {
                    return Err(HierarchyError::LevelZeroWithParent(node.id.clone()));
                }
                Some(parent_id) if !indexed.contains_key(parent_id) => {
                    return Err(HierarchyError::UnknownParent {
                        id: node.id.clone(),
                        parent_id: parent_id.clone(),
                    });
                }
                Some(parent_id) => children.entry(parent_id.clone()).or_default().push(index),
            }
        }

        let store = Self {
            nodes: indexed,
            children,
            roots,
        };
        store.ensure_forest()?;
        Ok(store)
    }

    pub fn from_hierarchy(hierarchy: Hierarchy) -> Result<Self, HierarchyError> {
        Self::new(hierarchy.nodes)
    }

    // Every parent resolves, so a node is on a cycle iff no root reaches it.
    fn ensure_forest(&self) -> Result<(), HierarchyError> {
        let mut reached: HashSet<usize> = HashSet::with_capacity(self.nodes.len());
        let mut queue: VecDeque<usize> = self.roots.iter().copied().collect();
        while let Some(index) = queue.pop_front() {
            if !reached.insert(index) {
                continue;
            }
            let id = self.nodes.get_index(index).map(|(id, _)| id.as_str()).unwrap_or("");
            if let Some(kids) = self.children.get(id) {
                queue.extend(kids.iter().copied());
            }
        }

        match self
            .nodes
            .values()
            .enumerate()
            .find(|(index, _)| !reached.contains(index))
        {
            Some((_, node)) => Err(HierarchyError::Cycle(node.id.clone())),
            None => Ok(()),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&TreeNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn is_root(&self, id: &str) -> bool {
        self.nodes.get(id).is_some_and(TreeNode::is_root)
    }

    /// Direct children of `parent_id` in source order.
    pub fn children(&self, parent_id: &str) -> Vec<&TreeNode> {
        self.children
            .get(parent_id)
            .map(|indices| indices.iter().filter_map(|&i| self.node_at(i)).collect())
            .unwrap_or_default()
    }

    pub fn has_children(&self, id: &str) -> bool {
        self.children.get(id).is_some_and(|kids| !kids.is_empty())
    }

    pub fn roots(&self) -> Vec<&TreeNode> {
        self.roots.iter().filter_map(|&i| self.node_at(i)).collect()
    }

    /// Every descendant of `id` (excluding `id`), pre-order.
    ///
    /// Uses an explicit stack so deep hierarchies cannot exhaust the call stack.
    pub fn descendants(&self, id: &str) -> Vec<&TreeNode> {
        let mut collected = Vec::new();
        let mut stack: Vec<&TreeNode> = self.children(id).into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            collected.push(node);
            stack.extend(self.children(&node.id).into_iter().rev());
        }
        collected
    }

    /// Depth derived from the parent chain; roots are 0.
    pub fn depth(&self, id: &str) -> Option<usize> {
        let mut current = self.nodes.get(id)?;
        let mut depth = 0;
        while let Some(parent_id) = &current.parent_id {
            current = self.nodes.get(parent_id)?;
            depth += 1;
        }
        Some(depth)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.values()
    }

    fn node_at(&self, index: usize) -> Option<&TreeNode> {
        self.nodes.get_index(index).map(|(_, node)| node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TreeStore {
        TreeStore::new(vec![
            TreeNode::root("root", "Root"),
            TreeNode::child("a", "A", "root", 1),
            TreeNode::child("b", "B", "root", 1),
            TreeNode::child("c", "C", "a", 2),
            TreeNode::child("d", "D", "c", 3),
        ])
        .unwrap()
    }

    #[test]
    fn children_follow_source_order() {
        let store = sample();
        let ids: Vec<&str> = store.children("root").iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn unknown_ids_yield_empty_results() {
        let store = sample();
        assert!(store.children("missing").is_empty());
        assert!(!store.has_children("missing"));
        assert!(store.descendants("missing").is_empty());
        assert_eq!(store.depth("missing"), None);
    }

    #[test]
    fn descendants_are_pre_order_and_exclude_self() {
        let store = sample();
        let ids: Vec<&str> = store.descendants("root").iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c", "d", "b"]);
        assert!(store.descendants("b").is_empty());
    }

    #[test]
    fn depth_walks_parents() {
        let store = sample();
        assert_eq!(store.depth("root"), Some(0));
        assert_eq!(store.depth("d"), Some(3));
    }

    #[test]
    fn roots_are_nodes_without_parent() {
        let store = TreeStore::new(vec![
            TreeNode::root("x", "X"),
            TreeNode::child("x1", "X1", "x", 1),
            TreeNode::root("y", "Y"),
        ])
        .unwrap();
        let ids: Vec<&str> = store.roots().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["x", "y"]);
        assert!(store.is_root("y"));
        assert!(!store.is_root("x1"));
    }

    #[test]
    fn deep_chain_does_not_recurse() {
        let mut nodes = vec![TreeNode::root("n0", "n0")];
        for i in 1..50_000u32 {
            nodes.push(TreeNode::child(format!("n{i}"), "n", format!("n{}", i - 1), i));
        }
        let store = TreeStore::new(nodes).unwrap();
        assert_eq!(store.descendants("n0").len(), 49_999);
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = TreeStore::new(vec![TreeNode::root("a", "A"), TreeNode::root("a", "A2")]);
        assert_eq!(err.unwrap_err(), HierarchyError::DuplicateId("a".into()));
    }

    #[test]
    fn rejects_unknown_parent() {
        let err = TreeStore::new(vec![TreeNode::child("a", "A", "ghost", 1)]);
        assert!(matches!(err, Err(HierarchyError::UnknownParent { .. })));
    }

    #[test]
    fn rejects_level_zero_with_parent() {
        let err = TreeStore::new(vec![TreeNode::root("r", "R"), TreeNode::child("a", "A", "r", 0)]);
        assert_eq!(err.unwrap_err(), HierarchyError::LevelZeroWithParent("a".into()));
    }

    #[test]
    fn rejects_cycles() {
        let err = TreeStore::new(vec![
            TreeNode::root("r", "R"),
            TreeNode::child("a", "A", "b", 1),
            TreeNode::child("b", "B", "a", 1),
        ]);
        assert!(matches!(err, Err(HierarchyError::Cycle(_))));
    }
}
