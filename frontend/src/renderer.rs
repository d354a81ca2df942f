//! Rendering collaborator seam and the element types handed across it.

use futures::channel::oneshot;
use serde::Serialize;
use shared::TreeNode;
use std::time::Duration;

pub const TITLE_CLASS: &str = "node-title";
pub const HAS_CHILDREN_CLASS: &str = "has-children";
pub const ACCESS_BUTTON_CLASS: &str = "access-btn";

/// A node as materialized in the view, carrying the full hierarchy record.
///
/// Serializes to the `data` object a graph library expects.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NodeElement {
    pub id: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub level: u32,
    pub has_children: bool,
}

impl NodeElement {
    pub fn from_tree_node(node: &TreeNode, has_children: bool) -> Self {
        Self {
            id: node.id.clone(),
            label: node.label.clone(),
            parent_id: node.parent_id.clone(),
            level: node.level,
            has_children,
        }
    }

    /// CSS class of the node title; only titles with children toggle.
    pub fn title_class(&self) -> String {
        if self.has_children {
            format!("{TITLE_CLASS} {HAS_CHILDREN_CLASS}")
        } else {
            TITLE_CLASS.to_string()
        }
    }
}

/// Directed parent -> child connection.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct EdgeElement {
    pub source: String,
    pub target: String,
}

impl EdgeElement {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Opaque handle a renderer returns for an added element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutKind {
    BreadthFirst,
}

impl LayoutKind {
    pub fn name(&self) -> &'static str {
        match self {
            LayoutKind::BreadthFirst => "breadthfirst",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutOptions {
    pub kind: LayoutKind,
    pub directed: bool,
    pub spacing_factor: f64,
    pub roots: Vec<String>,
    pub animate: bool,
    pub animation_duration: Duration,
    pub fit: bool,
    pub padding: u32,
}

/// Resolves when the renderer has finished a layout pass.
pub type LayoutDone = oneshot::Receiver<()>;

/// The external drawing surface.
///
/// Implementations are expected to be cheap to call; anything slow should be
/// reported through the [`LayoutDone`] signal rather than by blocking.
pub trait Renderer {
    fn add(&mut self, nodes: &[NodeElement], edges: &[EdgeElement]) -> Vec<ElementHandle>;

    /// Removes nodes by id together with every edge touching them.
    fn remove(&mut self, ids: &[String]);

    fn zoom(&self) -> f64;

    fn set_zoom(&mut self, zoom: f64);

    fn center(&mut self);

    /// Starts a layout pass. Returns `None` when the renderer cannot signal
    /// completion; the caller then waits a fixed delay instead.
    fn run_layout(&mut self, options: &LayoutOptions) -> Option<LayoutDone>;

    fn set_opacity(&mut self, ids: &[String], opacity: f64);

    /// Animates nodes to full opacity. Fire and forget.
    fn fade_in(&mut self, ids: &[String], duration: Duration);

    fn set_hover(&mut self, _id: &str, _hovering: bool) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_class_marks_toggleable_nodes() {
        let node = TreeNode::root("prefeitura", "Prefeitura");
        assert_eq!(
            NodeElement::from_tree_node(&node, true).title_class(),
            "node-title has-children"
        );
        assert_eq!(NodeElement::from_tree_node(&node, false).title_class(), "node-title");
    }

    #[test]
    fn elements_serialize_as_graph_data() {
        let node = TreeNode::child("museus", "Museus", "cultura", 2);
        let json = serde_json::to_value(NodeElement::from_tree_node(&node, false)).unwrap();
        assert_eq!(json["parentId"], "cultura");
        assert_eq!(json["hasChildren"], false);

        let root = TreeNode::root("p", "P");
        let root = serde_json::to_value(NodeElement::from_tree_node(&root, true)).unwrap();
        assert!(root.get("parentId").is_none());

        let edge = serde_json::to_value(EdgeElement::new("cultura", "museus")).unwrap();
        assert_eq!(edge, serde_json::json!({"source": "cultura", "target": "museus"}));
    }

    #[test]
    fn layout_kind_uses_renderer_name() {
        assert_eq!(LayoutKind::BreadthFirst.name(), "breadthfirst");
    }
}
