//! Mirror of the nodes and edges currently present in the renderer.

use crate::renderer::{EdgeElement, NodeElement};
use indexmap::{IndexMap, IndexSet};
use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct MaterializedView {
    nodes: IndexMap<String, NodeElement>,
    edges: IndexSet<EdgeElement>,
}

impl MaterializedView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn contains_edge(&self, source: &str, target: &str) -> bool {
        self.edges.iter().any(|e| e.source == source && e.target == target)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeElement> {
        self.nodes.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &EdgeElement> {
        self.edges.iter()
    }

    /// Records added elements. Nodes go in before edges so an edge never
    /// refers to a missing endpoint.
    pub fn apply_add(&mut self, nodes: &[NodeElement], edges: &[EdgeElement]) {
        for node in nodes {
            self.nodes.insert(node.id.clone(), node.clone());
        }
        for edge in edges {
            if self.contains(&edge.source) && self.contains(&edge.target) {
                self.edges.insert(edge.clone());
            }
        }
    }

    /// Drops nodes and every edge touching them.
    pub fn apply_remove(&mut self, ids: &[String]) {
        let doomed: HashSet<&str> = ids.iter().map(String::as_str).collect();
        self.nodes.retain(|id, _| !doomed.contains(id.as_str()));
        self.edges
            .retain(|e| !doomed.contains(e.source.as_str()) && !doomed.contains(e.target.as_str()));
    }

    /// Materialized nodes that no materialized edge points at.
    pub fn visible_roots(&self) -> Vec<String> {
        let targets: HashSet<&str> = self.edges.iter().map(|e| e.target.as_str()).collect();
        self.nodes
            .keys()
            .filter(|id| !targets.contains(id.as_str()))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str) -> NodeElement {
        NodeElement {
            id: id.into(),
            label: id.to_uppercase(),
            parent_id: None,
            level: 0,
            has_children: false,
        }
    }

    #[test]
    fn removal_takes_touching_edges_along() {
        let mut view = MaterializedView::new();
        view.apply_add(
            &[node("r"), node("a"), node("b")],
            &[EdgeElement::new("r", "a"), EdgeElement::new("a", "b")],
        );

        view.apply_remove(&["a".to_string()]);

        assert!(!view.contains("a"));
        assert_eq!(view.edge_count(), 0);
        assert_eq!(view.node_count(), 2);
    }

    #[test]
    fn dangling_edges_are_never_recorded() {
        let mut view = MaterializedView::new();
        view.apply_add(&[node("r")], &[EdgeElement::new("r", "ghost")]);
        assert_eq!(view.edge_count(), 0);
    }

    #[test]
    fn visible_roots_ignore_global_parents() {
        let mut view = MaterializedView::new();
        view.apply_add(&[node("r"), node("a"), node("orphan")], &[EdgeElement::new("r", "a")]);
        assert_eq!(view.visible_roots(), vec!["r", "orphan"]);
    }
}
