//! Lazy hierarchical expansion engine for the org chart view.
//!
//! The hierarchy lives in a read-only [`TreeStore`]. The user starts with the
//! top of the tree and opens subtrees on demand; which nodes are open is kept
//! in a persisted [`ExpansionState`]. The [`ViewCoordinator`] turns each
//! request into a diff, hands it to the [`Renderer`] and settles the viewport
//! once layout is done.

pub mod coordinator;
pub mod dataflow;
pub mod diff_engine;
pub mod events;
pub mod expansion_state;
pub mod materialized_view;
pub mod navigation;
pub mod persistence;
pub mod renderer;
pub mod timer;
pub mod tree_store;

pub use coordinator::{OperationPhase, ViewCoordinator};
pub use diff_engine::{ExpandOutcome, NoOpReason, ViewDiff};
pub use events::{ViewEvent, classify_click, classify_hover};
pub use expansion_state::ExpansionState;
pub use materialized_view::MaterializedView;
pub use navigation::{Navigator, NullNavigator};
pub use persistence::{MemoryStorage, Persistence, StorageError};
pub use renderer::{
    EdgeElement, ElementHandle, LayoutDone, LayoutKind, LayoutOptions, NodeElement, Renderer,
};
pub use timer::{ImmediateTimer, Timer};
pub use tree_store::{HierarchyError, TreeStore};
