//! Routing seam used when a node's "access" control is activated.

pub trait Navigator {
    fn navigate(&mut self, path_segment: &str, node_id: &str);
}

/// Used by hosts that have no detail pages to route to.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullNavigator;

impl Navigator for NullNavigator {
    fn navigate(&mut self, path_segment: &str, node_id: &str) {
        log::debug!("Ignoring navigation to /{}/{}", path_segment, node_id);
    }
}
