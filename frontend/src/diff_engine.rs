//! Pure add/remove computation for a single expand or collapse request.
//!
//! Nothing here mutates state; callers apply the returned [`ViewDiff`] to the
//! renderer and the [`MaterializedView`] themselves.

use crate::materialized_view::MaterializedView;
use crate::renderer::{EdgeElement, NodeElement};
use crate::tree_store::TreeStore;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewDiff {
    /// New nodes; always applied before `add_edges`.
    pub add_nodes: Vec<NodeElement>,
    pub add_edges: Vec<EdgeElement>,
    /// Removed node ids; their edges go with them.
    pub remove: Vec<String>,
}

impl ViewDiff {
    pub fn is_empty(&self) -> bool {
        self.add_nodes.is_empty() && self.add_edges.is_empty() && self.remove.is_empty()
    }

    pub fn added_ids(&self) -> Vec<String> {
        self.add_nodes.iter().map(|n| n.id.clone()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoOpReason {
    /// The target is not in the view, so there is nothing to attach to.
    TargetNotMaterialized,
    /// Every child is already present, or there are none.
    NothingToAdd,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExpandOutcome {
    Apply(ViewDiff),
    NoOp(NoOpReason),
}

impl ExpandOutcome {
    pub fn is_noop(&self) -> bool {
        matches!(self, ExpandOutcome::NoOp(_))
    }
}

/// Children of `id` that still need to be materialized, each with its
/// connecting edge.
pub fn expand(store: &TreeStore, view: &MaterializedView, id: &str) -> ExpandOutcome {
    if !view.contains(id) {
        return ExpandOutcome::NoOp(NoOpReason::TargetNotMaterialized);
    }

    let mut diff = ViewDiff::default();
    for child in store.children(id) {
        if view.contains(&child.id) {
            continue;
        }
        diff.add_nodes
            .push(NodeElement::from_tree_node(child, store.has_children(&child.id)));
        diff.add_edges.push(EdgeElement::new(id, child.id.clone()));
    }

    if diff.add_nodes.is_empty() {
        ExpandOutcome::NoOp(NoOpReason::NothingToAdd)
    } else {
        ExpandOutcome::Apply(diff)
    }
}

/// Every materialized descendant of `id`, at any depth. `id` itself stays.
///
/// The walk covers the whole subtree in the hierarchy so nested expansions
/// below `id` are folded in as well.
pub fn collapse(store: &TreeStore, view: &MaterializedView, id: &str) -> ViewDiff {
    let remove = store
        .descendants(id)
        .into_iter()
        .filter(|node| view.contains(&node.id))
        .map(|node| node.id.clone())
        .collect();

    ViewDiff {
        remove,
        ..ViewDiff::default()
    }
}
