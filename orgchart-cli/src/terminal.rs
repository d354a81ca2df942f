//! Renderer, navigator and timer for a plain terminal.
//!
//! The terminal has no canvas: elements are tracked by id and the tree is
//! printed from the coordinator's view after every change.

use frontend::{
    EdgeElement, ElementHandle, LayoutDone, LayoutOptions, Navigator, NodeElement, Renderer, Timer,
};
use futures::channel::oneshot;
use futures::future::LocalBoxFuture;
use std::time::Duration;

pub struct TerminalRenderer {
    zoom: f64,
    shown: Vec<String>,
    next_handle: u64,
}

impl TerminalRenderer {
    pub fn new(zoom: f64) -> Self {
        Self {
            zoom,
            shown: Vec::new(),
            next_handle: 0,
        }
    }

    pub fn shown(&self) -> &[String] {
        &self.shown
    }
}

impl Renderer for TerminalRenderer {
    fn add(&mut self, nodes: &[NodeElement], edges: &[EdgeElement]) -> Vec<ElementHandle> {
        log::debug!("+{} nodes, +{} edges", nodes.len(), edges.len());
        self.shown.extend(nodes.iter().map(|n| n.id.clone()));
        nodes
            .iter()
            .map(|_| {
                self.next_handle += 1;
                ElementHandle(self.next_handle)
            })
            .collect()
    }

    fn remove(&mut self, ids: &[String]) {
        log::debug!("-{} nodes", ids.len());
        self.shown.retain(|id| !ids.contains(id));
    }

    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn set_zoom(&mut self, zoom: f64) {
        log::info!("Zoom {:.0}%", zoom * 100.0);
        self.zoom = zoom;
    }

    fn center(&mut self) {}

    fn run_layout(&mut self, options: &LayoutOptions) -> Option<LayoutDone> {
        log::debug!(
            "{} layout from {:?} (animate: {})",
            options.kind.name(),
            options.roots,
            options.animate
        );
        // Printing is synchronous, the layout is done as soon as it starts
        let (done, finished) = oneshot::channel();
        let _ = done.send(());
        Some(finished)
    }

    fn set_opacity(&mut self, _ids: &[String], _opacity: f64) {}

    fn fade_in(&mut self, ids: &[String], _duration: Duration) {
        log::debug!("New: {}", ids.join(", "));
    }
}

/// Prints the route a detail page would open at.
#[derive(Debug, Default)]
pub struct PrintNavigator {
    visited: Vec<String>,
}

impl PrintNavigator {
    pub fn visited(&self) -> &[String] {
        &self.visited
    }
}

impl Navigator for PrintNavigator {
    fn navigate(&mut self, path_segment: &str, node_id: &str) {
        let route = format!("/{}/{}", path_segment, node_id);
        println!("→ {}", route);
        self.visited.push(route);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

impl Timer for TokioTimer {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(duration))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigator_builds_detail_routes() {
        let mut navigator = PrintNavigator::default();
        navigator.navigate("detalhes", "cultura");
        assert_eq!(navigator.visited(), ["/detalhes/cultura"]);
    }

    #[tokio::test]
    async fn layout_completes_immediately() {
        let mut renderer = TerminalRenderer::new(1.0);
        let options = LayoutOptions {
            kind: frontend::LayoutKind::BreadthFirst,
            directed: true,
            spacing_factor: 1.5,
            roots: vec!["prefeitura".into()],
            animate: true,
            animation_duration: Duration::from_millis(500),
            fit: false,
            padding: 30,
        };
        let done = renderer.run_layout(&options).unwrap();
        assert!(done.await.is_ok());
    }

    #[tokio::test]
    async fn timer_waits() {
        let start = std::time::Instant::now();
        TokioTimer.sleep(Duration::from_millis(20)).await;
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
