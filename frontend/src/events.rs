//! Typed interaction events emitted by a renderer.

use crate::renderer::{ACCESS_BUTTON_CLASS, HAS_CHILDREN_CLASS, TITLE_CLASS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    /// Expand when collapsed, collapse when expanded.
    ToggleRequested(String),
    /// Open the node's detail page.
    ActivateRequested(String),
    HoverChanged { id: String, hovering: bool },
    ZoomInRequested,
    ZoomOutRequested,
}

/// Maps a click on a rendered node template to an event.
///
/// `data_id` is the `data-id` of the closest node box, `classes` the classes
/// of the clicked element. Returns `None` when there is nothing to do.
pub fn classify_click<'a>(
    data_id: Option<&str>,
    classes: impl IntoIterator<Item = &'a str>,
) -> Option<ViewEvent> {
    let id = data_id.filter(|id| !id.is_empty())?;
    let classes: Vec<&str> = classes.into_iter().collect();

    if classes.contains(&ACCESS_BUTTON_CLASS) {
        return Some(ViewEvent::ActivateRequested(id.to_string()));
    }
    if classes.contains(&TITLE_CLASS) && classes.contains(&HAS_CHILDREN_CLASS) {
        return Some(ViewEvent::ToggleRequested(id.to_string()));
    }
    None
}

/// Hover only matters on titles that toggle.
pub fn classify_hover<'a>(
    data_id: Option<&str>,
    classes: impl IntoIterator<Item = &'a str>,
    hovering: bool,
) -> Option<ViewEvent> {
    let id = data_id.filter(|id| !id.is_empty())?;
    let classes: Vec<&str> = classes.into_iter().collect();
    (classes.contains(&TITLE_CLASS) && classes.contains(&HAS_CHILDREN_CLASS)).then(|| {
        ViewEvent::HoverChanged {
            id: id.to_string(),
            hovering,
        }
    })
}
