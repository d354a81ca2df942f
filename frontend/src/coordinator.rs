//! Sequences expand/collapse operations against the asynchronous renderer.
//!
//! One operation runs at a time: `Idle -> Diffing -> Applying ->
//! LayoutPending -> Settling -> Idle`. Events arriving meanwhile wait in the
//! relay queue and observe the view only after the previous operation has
//! been fully applied.

use crate::dataflow::{Relay, relay};
use crate::diff_engine::{self, ExpandOutcome, NoOpReason, ViewDiff};
use crate::events::ViewEvent;
use crate::expansion_state::ExpansionState;
use crate::materialized_view::MaterializedView;
use crate::navigation::Navigator;
use crate::persistence::Persistence;
use crate::renderer::{LayoutDone, LayoutKind, LayoutOptions, NodeElement, Renderer};
use crate::timer::Timer;
use crate::tree_store::TreeStore;
use futures::channel::mpsc::UnboundedReceiver;
use futures::future::{self, FutureExt};
use futures::StreamExt;
use shared::{AppConfig, RootPolicy, ViewSection};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationPhase {
    Idle,
    Diffing,
    Applying,
    LayoutPending,
    Settling,
}

pub struct ViewCoordinator<R, P, N, T>
where
    R: Renderer,
    P: Persistence,
    N: Navigator,
    T: Timer,
{
    store: TreeStore,
    expansion: ExpansionState<P>,
    view: MaterializedView,
    // None means there is no rendering surface and every operation is inert
    renderer: Option<R>,
    navigator: N,
    timer: T,
    settings: ViewSection,
    detail_segment: String,
    clear_on_teardown: bool,
    base_zoom: f64,
    phase: OperationPhase,
    events: UnboundedReceiver<ViewEvent>,
}

impl<R, P, N, T> ViewCoordinator<R, P, N, T>
where
    R: Renderer,
    P: Persistence,
    N: Navigator,
    T: Timer,
{
    /// Creates the coordinator and the relay its renderer should send
    /// [`ViewEvent`]s through. The event loop ends once every clone of the
    /// relay is dropped.
    pub fn new(
        store: TreeStore,
        storage: P,
        renderer: Option<R>,
        navigator: N,
        timer: T,
        config: &AppConfig,
    ) -> (Self, Relay<ViewEvent>) {
        let (events_relay, events) = relay::<ViewEvent>();
        let coordinator = Self {
            store,
            expansion: ExpansionState::new(storage, config.storage.key.clone()),
            view: MaterializedView::new(),
            renderer,
            navigator,
            timer,
            settings: config.view.clone(),
            detail_segment: config.navigation.detail_segment.clone(),
            clear_on_teardown: config.storage.clear_on_teardown,
            base_zoom: config.view.base_zoom,
            phase: OperationPhase::Idle,
            events,
        };
        (coordinator, events_relay)
    }

    pub fn store(&self) -> &TreeStore {
        &self.store
    }

    pub fn materialized(&self) -> &MaterializedView {
        &self.view
    }

    pub fn expansion(&self) -> &ExpansionState<P> {
        &self.expansion
    }

    pub fn renderer(&self) -> Option<&R> {
        self.renderer.as_ref()
    }

    pub fn phase(&self) -> OperationPhase {
        self.phase
    }

    pub fn base_zoom(&self) -> f64 {
        self.base_zoom
    }

    pub fn is_inert(&self) -> bool {
        self.renderer.is_none()
    }

    /// Materializes the roots and replays persisted expansions in stored
    /// order, without animation and without writing the expansion record.
    pub fn initialize(&mut self) {
        let Some(renderer) = self.renderer.as_mut() else {
            log::debug!("No rendering surface, view stays inert");
            return;
        };

        let roots: Vec<NodeElement> = self
            .store
            .roots()
            .into_iter()
            .map(|node| NodeElement::from_tree_node(node, self.store.has_children(&node.id)))
            .collect();
        renderer.add(&roots, &[]);
        self.view.apply_add(&roots, &[]);

        if self.settings.root_policy == RootPolicy::AlwaysExpanded {
            let root_ids: Vec<String> = roots.iter().map(|n| n.id.clone()).collect();
            for id in &root_ids {
                self.replay_expand(id);
            }
        }

        let mut pending = self.expansion.all();
        let mut replayed = 0;
        // A child stored ahead of its parent is retried once the parent shows up
        loop {
            let mut deferred = Vec::new();
            let mut progressed = false;
            for id in pending {
                if self.is_implicitly_expanded(&id) {
                    continue;
                }
                if !self.view.contains(&id) {
                    deferred.push(id);
                    continue;
                }
                if self.replay_expand(&id) {
                    progressed = true;
                    replayed += 1;
                }
            }
            if deferred.is_empty() || !progressed {
                if !deferred.is_empty() {
                    // Memory only, replay never writes the record
                    log::debug!("Dropping unreachable expansions: {:?}", deferred);
                    self.expansion.forget(deferred.iter().map(String::as_str));
                }
                break;
            }
            pending = deferred;
        }

        log::info!(
            "View initialized: {} nodes materialized, {} expansions replayed",
            self.view.node_count(),
            replayed
        );

        let options = self.layout_options(false, true);
        if let Some(renderer) = self.renderer.as_mut() {
            // Bulk restore is not animated, nothing to wait for
            let _ = renderer.run_layout(&options);
        }
    }

    fn replay_expand(&mut self, id: &str) -> bool {
        let ExpandOutcome::Apply(diff) = diff_engine::expand(&self.store, &self.view, id) else {
            return false;
        };
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.add(&diff.add_nodes, &diff.add_edges);
        }
        self.view.apply_add(&diff.add_nodes, &diff.add_edges);
        true
    }

    fn is_implicitly_expanded(&self, id: &str) -> bool {
        self.settings.root_policy == RootPolicy::AlwaysExpanded && self.store.is_root(id)
    }

    /// Live, user-triggered expansion: animated and persisted.
    pub async fn expand(&mut self, id: &str) {
        if self.is_inert() {
            return;
        }
        if self.is_implicitly_expanded(id) {
            log::debug!("Root '{}' is always expanded", id);
            return;
        }

        self.set_phase(OperationPhase::Diffing);
        let diff = match diff_engine::expand(&self.store, &self.view, id) {
            ExpandOutcome::Apply(diff) => diff,
            ExpandOutcome::NoOp(NoOpReason::TargetNotMaterialized) => {
                log::debug!("Cannot expand '{}': not in view", id);
                self.set_phase(OperationPhase::Idle);
                return;
            }
            ExpandOutcome::NoOp(NoOpReason::NothingToAdd) => {
                // Still recorded so the node reads as expanded
                self.expansion.add(id);
                self.set_phase(OperationPhase::Idle);
                return;
            }
        };

        self.set_phase(OperationPhase::Applying);
        let added = diff.added_ids();
        self.apply(&diff);
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.set_opacity(&added, 0.0);
        }
        self.expansion.add(id);
        log::debug!("Expanded '{}': +{} nodes", id, added.len());

        self.settle_after_layout(&added).await;
    }

    /// Removes every descendant of `id` and forgets nested expansions below it.
    pub async fn collapse(&mut self, id: &str) {
        if self.is_inert() {
            return;
        }
        if self.is_implicitly_expanded(id) {
            log::debug!("Root '{}' cannot be collapsed", id);
            return;
        }

        self.set_phase(OperationPhase::Diffing);
        let diff = diff_engine::collapse(&self.store, &self.view, id);

        let mut forgotten: Vec<String> = self
            .store
            .descendants(id)
            .into_iter()
            .map(|node| node.id.clone())
            .collect();
        forgotten.push(id.to_string());
        self.expansion.remove_all(forgotten.iter().map(String::as_str));

        if diff.is_empty() {
            self.set_phase(OperationPhase::Idle);
            return;
        }

        self.set_phase(OperationPhase::Applying);
        self.apply(&diff);
        log::debug!("Collapsed '{}': -{} nodes", id, diff.remove.len());

        self.settle_after_layout(&[]).await;
    }

    /// Collapses an expanded node, expands anything else.
    pub async fn toggle(&mut self, id: &str) {
        if self.expansion.is_expanded(id) {
            self.collapse(id).await;
        } else {
            self.expand(id).await;
        }
    }

    pub fn activate(&mut self, id: &str) {
        if self.is_inert() || !self.store.contains(id) {
            return;
        }
        self.navigator.navigate(&self.detail_segment, id);
    }

    pub fn hover(&mut self, id: &str, hovering: bool) {
        if !self.store.has_children(id) {
            return;
        }
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.set_hover(id, hovering);
        }
    }

    pub fn zoom_in(&mut self) {
        self.step_zoom(self.settings.zoom_step);
    }

    pub fn zoom_out(&mut self) {
        self.step_zoom(-self.settings.zoom_step);
    }

    fn step_zoom(&mut self, delta: f64) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        self.base_zoom = (self.base_zoom + delta).max(self.settings.zoom_step);
        renderer.set_zoom(self.base_zoom);
        renderer.center();
    }

    /// Ends the session: the persisted expansion record is dropped.
    pub fn teardown(&mut self) {
        if self.is_inert() || !self.clear_on_teardown {
            return;
        }
        self.expansion.clear();
        log::info!("Session ended, expansion state cleared");
    }

    pub async fn handle(&mut self, event: ViewEvent) {
        match event {
            ViewEvent::ToggleRequested(id) => self.toggle(&id).await,
            ViewEvent::ActivateRequested(id) => self.activate(&id),
            ViewEvent::HoverChanged { id, hovering } => self.hover(&id, hovering),
            ViewEvent::ZoomInRequested => self.zoom_in(),
            ViewEvent::ZoomOutRequested => self.zoom_out(),
        }
    }

    /// Processes queued events until every relay is dropped.
    pub async fn run(&mut self) {
        while let Some(event) = self.events.next().await {
            self.handle(event).await;
        }
    }

    /// Processes whatever is queued right now, in order. Returns the count.
    pub async fn process_pending(&mut self) -> usize {
        let mut processed = 0;
        while let Some(Some(event)) = self.events.next().now_or_never() {
            self.handle(event).await;
            processed += 1;
        }
        processed
    }

    // Added elements go in before removed ones leave
    fn apply(&mut self, diff: &ViewDiff) {
        if let Some(renderer) = self.renderer.as_mut() {
            if !diff.add_nodes.is_empty() {
                renderer.add(&diff.add_nodes, &diff.add_edges);
            }
            if !diff.remove.is_empty() {
                renderer.remove(&diff.remove);
            }
        }
        self.view.apply_add(&diff.add_nodes, &diff.add_edges);
        self.view.apply_remove(&diff.remove);
    }

    async fn settle_after_layout(&mut self, added: &[String]) {
        self.set_phase(OperationPhase::LayoutPending);
        let options = self.layout_options(true, false);
        let done = self.renderer.as_mut().and_then(|r| r.run_layout(&options));
        self.wait_for_layout(done).await;

        self.set_phase(OperationPhase::Settling);
        let ceiling = self.settings.zoom_ceiling;
        let fade = Duration::from_millis(self.settings.fade_duration_ms);
        if let Some(renderer) = self.renderer.as_mut() {
            if renderer.zoom() > ceiling {
                renderer.set_zoom(ceiling);
                renderer.center();
            }
            if !added.is_empty() {
                renderer.fade_in(added, fade);
            }
        }
        self.set_phase(OperationPhase::Idle);
    }

    // Bounded: never waits longer than the settle delay
    async fn wait_for_layout(&self, done: Option<LayoutDone>) {
        let bound = self.timer.sleep(Duration::from_millis(self.settings.settle_delay_ms));
        match done {
            Some(done) => {
                let _ = future::select(done, bound).await;
            }
            None => bound.await,
        }
    }

    fn layout_options(&self, animate: bool, fit: bool) -> LayoutOptions {
        LayoutOptions {
            kind: LayoutKind::BreadthFirst,
            directed: true,
            spacing_factor: self.settings.spacing_factor,
            roots: self.view.visible_roots(),
            animate,
            animation_duration: Duration::from_millis(self.settings.layout_duration_ms),
            fit,
            padding: self.settings.padding,
        }
    }

    fn set_phase(&mut self, phase: OperationPhase) {
        if self.phase != phase {
            log::debug!("{:?} -> {:?}", self.phase, phase);
            self.phase = phase;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::NullNavigator;
    use crate::persistence::MemoryStorage;
    use crate::renderer::{EdgeElement, ElementHandle};
    use crate::timer::ImmediateTimer;
    use shared::TreeNode;

    #[derive(Default)]
    struct CountingRenderer {
        adds: usize,
        removes: usize,
        layouts: usize,
    }

    impl Renderer for CountingRenderer {
        fn add(&mut self, nodes: &[NodeElement], _edges: &[EdgeElement]) -> Vec<ElementHandle> {
            self.adds += 1;
            (0..nodes.len() as u64).map(ElementHandle).collect()
        }
        fn remove(&mut self, _ids: &[String]) {
            self.removes += 1;
        }
        fn zoom(&self) -> f64 {
            1.0
        }
        fn set_zoom(&mut self, _zoom: f64) {}
        fn center(&mut self) {}
        fn run_layout(&mut self, _options: &LayoutOptions) -> Option<LayoutDone> {
            self.layouts += 1;
            None
        }
        fn set_opacity(&mut self, _ids: &[String], _opacity: f64) {}
        fn fade_in(&mut self, _ids: &[String], _duration: Duration) {}
    }

    type TestCoordinator =
        ViewCoordinator<CountingRenderer, MemoryStorage, NullNavigator, ImmediateTimer>;

    fn coordinator(renderer: Option<CountingRenderer>) -> TestCoordinator {
        let store = TreeStore::new(vec![
            TreeNode::root("root", "Root"),
            TreeNode::child("a", "A", "root", 1),
            TreeNode::child("c", "C", "a", 2),
        ])
        .unwrap();
        let (coordinator, _relay) = ViewCoordinator::new(
            store,
            MemoryStorage::new(),
            renderer,
            NullNavigator,
            ImmediateTimer,
            &AppConfig::default(),
        );
        coordinator
    }

    #[tokio::test]
    async fn phases_return_to_idle() {
        let mut coordinator = coordinator(Some(CountingRenderer::default()));
        coordinator.initialize();
        assert_eq!(coordinator.phase(), OperationPhase::Idle);

        coordinator.expand("a").await;
        assert_eq!(coordinator.phase(), OperationPhase::Idle);
        assert!(coordinator.materialized().contains("c"));

        coordinator.collapse("a").await;
        assert_eq!(coordinator.phase(), OperationPhase::Idle);
        assert!(!coordinator.materialized().contains("c"));
    }

    #[tokio::test]
    async fn noop_expand_skips_layout() {
        let mut coordinator = coordinator(Some(CountingRenderer::default()));
        coordinator.initialize();
        coordinator.expand("a").await;
        let layouts = coordinator.renderer().unwrap().layouts;

        coordinator.expand("c").await;

        assert_eq!(coordinator.renderer().unwrap().layouts, layouts);
        assert!(coordinator.expansion().is_expanded("c"));
    }

    #[tokio::test]
    async fn without_surface_everything_is_inert() {
        let mut coordinator = coordinator(None);
        coordinator.initialize();
        coordinator.expand("a").await;
        coordinator.zoom_in();
        coordinator.teardown();

        assert!(coordinator.is_inert());
        assert!(coordinator.materialized().is_empty());
        assert!(coordinator.expansion().is_empty());
        assert_eq!(coordinator.base_zoom(), 1.0);
    }

    #[tokio::test]
    async fn zoom_never_reaches_zero() {
        let mut coordinator = coordinator(Some(CountingRenderer::default()));
        for _ in 0..30 {
            coordinator.zoom_out();
        }
        assert!((coordinator.base_zoom() - 0.1).abs() < 1e-9);
        coordinator.zoom_in();
        assert!((coordinator.base_zoom() - 0.2).abs() < 1e-9);
    }
}
