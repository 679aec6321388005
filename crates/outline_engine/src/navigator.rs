//! Precision-mode presenter: a persistent vertical scrollbar whose handle
//! position maps to the active message index and whose tick marks sit at
//! message boundaries.
//!
//! The handle maps over `count - 1` gaps while ticks divide the track into
//! `count` slots; the differing denominators are part of the design (see
//! `outline_core::geometry`). Three gestures share one effect — resolve an
//! index, scroll to it, highlight it: dragging the handle scrubs live,
//! clicking the track or a tick jumps, and each wheel event steps exactly
//! one message regardless of its delta.

use ego_tree::NodeId;
use outline_core::{
    contains_code_marker, drag_handle_top, handle_fraction, handle_top, index_for_progress,
    progress_for_handle_top, step_index, tick_fraction,
};
use outline_logging::outline_debug;

use crate::page::{ElementData, Page};
use crate::types::MessageRecord;

/// Page-level class that suppresses the host's native scroll indicator
/// while this mode is active.
pub const PAGE_CLASS: &str = "precision-navigation-active";

/// Mutable scrollbar bookkeeping. `handle_position` and `active_index`
/// stay mutually consistent except transiently during a drag, when the
/// handle leads and the index follows each recomputation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollbarState {
    /// Fraction of the usable track span, in `[0, 1]`.
    pub handle_position: f64,
    /// Index of the nearest message.
    pub active_index: usize,
    pub is_dragging: bool,
}

pub struct PrecisionNavigator {
    page: Page,
    root: Option<NodeId>,
    handle: Option<NodeId>,
    dots_container: Option<NodeId>,
    dots: Vec<NodeId>,
    tooltip: Option<NodeId>,
    state: ScrollbarState,
    track_height: f64,
    handle_height: f64,
    count: usize,
}

impl PrecisionNavigator {
    /// Builds the scrollbar overlay and suppresses the native indicator.
    /// The track spans the page viewport.
    pub fn build(page: &Page, handle_height: f64) -> Self {
        let track_height = page.viewport().height;
        let root_id = page.root_id();
        let root = page.append_overlay(
            root_id,
            ElementData::new("div").with_class("precision-scrollbar"),
        );
        let track = root.and_then(|root| {
            page.append_overlay(root, ElementData::new("div").with_class("scrollbar-track"))
        });
        let handle = track.and_then(|track| {
            page.append_overlay(
                track,
                ElementData::new("div")
                    .with_class("scrollbar-handle")
                    .with_attr("data-top", "0"),
            )
        });
        let dots_container = track.and_then(|track| {
            page.append_overlay(
                track,
                ElementData::new("div").with_class("scrollbar-dots-container"),
            )
        });
        page.add_page_class(PAGE_CLASS);

        Self {
            page: page.clone(),
            root,
            handle,
            dots_container,
            dots: Vec::new(),
            tooltip: None,
            state: ScrollbarState {
                handle_position: 0.0,
                active_index: 0,
                is_dragging: false,
            },
            track_height,
            handle_height,
            count: 0,
        }
    }

    pub fn state(&self) -> ScrollbarState {
        self.state
    }

    /// Rebuilds every tick for a new record list and recomputes the handle
    /// against the new count, clamping a stale active index.
    pub fn render(&mut self, records: &[MessageRecord]) {
        self.count = records.len();
        if self.count == 0 {
            self.state.active_index = 0;
        } else if self.state.active_index >= self.count {
            self.state.active_index = self.count - 1;
        }

        if let Some(container) = self.dots_container {
            self.page.clear_children(container);
            self.dots.clear();
            for (index, record) in records.iter().enumerate() {
                let percent = tick_fraction(index, self.count) * 100.0;
                let mut dot = ElementData::new("div")
                    .with_class("nav-dot")
                    .with_attr("data-index", &index.to_string())
                    .with_attr("data-message-id", &record.id)
                    .with_attr("data-top-percent", &format!("{percent:.1}"));
                if contains_code_marker(&record.raw_text) {
                    dot = dot.with_attr("data-kind", "code");
                }
                if let Some(id) = self.page.append_overlay(container, dot) {
                    self.dots.push(id);
                }
            }
        }

        self.snap_handle_to_index();
        outline_debug!(
            "navigator rebuilt {} ticks, active index {}",
            self.dots.len(),
            self.state.active_index
        );
    }

    /// Press on the handle: the drag leads until release.
    pub fn begin_drag(&mut self) {
        self.state.is_dragging = true;
        if let Some(handle) = self.handle {
            self.page.add_class(handle, "dragging");
        }
    }

    /// Pointer movement during a drag, `pointer_y` relative to the track
    /// top. Returns the new index whenever it changes, so the caller can
    /// scroll on every recomputation — live scrubbing, not
    /// scroll-on-release.
    pub fn drag_move(&mut self, pointer_y: f64) -> Option<usize> {
        if !self.state.is_dragging || self.count == 0 {
            return None;
        }
        let top = drag_handle_top(pointer_y, self.track_height, self.handle_height);
        self.set_handle_top(top);
        self.state.handle_position =
            progress_for_handle_top(top, self.track_height, self.handle_height);
        let index = index_for_progress(self.state.handle_position, self.count);
        if index != self.state.active_index {
            self.state.active_index = index;
            return Some(index);
        }
        None
    }

    /// Release: the handle snaps to the active index's mapped position so
    /// position and index agree again.
    pub fn end_drag(&mut self) {
        if !self.state.is_dragging {
            return;
        }
        self.state.is_dragging = false;
        if let Some(handle) = self.handle {
            self.page.remove_class(handle, "dragging");
        }
        self.snap_handle_to_index();
    }

    /// Click on the track (not the handle): jump to the index under the
    /// click and snap the handle there.
    pub fn track_click(&mut self, fraction: f64) -> Option<usize> {
        if self.count == 0 {
            return None;
        }
        let index = index_for_progress(fraction, self.count);
        self.state.active_index = index;
        self.snap_handle_to_index();
        Some(index)
    }

    /// One wheel event moves exactly one message in the tick's direction,
    /// clamped at both ends.
    pub fn wheel(&mut self, delta: i32) -> Option<usize> {
        if self.count == 0 {
            return None;
        }
        let index = step_index(self.state.active_index, delta, self.count);
        if index == self.state.active_index {
            return None;
        }
        self.state.active_index = index;
        self.snap_handle_to_index();
        Some(index)
    }

    /// Click on a tick: jump to exactly that message.
    pub fn tick_click(&mut self, index: usize) -> Option<usize> {
        if index >= self.count {
            return None;
        }
        self.state.active_index = index;
        self.snap_handle_to_index();
        Some(index)
    }

    /// Hovering a tick shows that message's title. A tooltip already on
    /// screen is replaced, never stacked.
    pub fn tick_hover(&mut self, title: &str) {
        self.tick_leave();
        self.tooltip = self.page.append_overlay(
            self.page.root_id(),
            ElementData::new("div")
                .with_class("precision-tooltip")
                .with_text(title),
        );
    }

    pub fn tick_leave(&mut self) {
        if let Some(tooltip) = self.tooltip.take() {
            self.page.remove_node(tooltip);
        }
    }

    pub fn tooltip_text(&self) -> Option<String> {
        self.tooltip.and_then(|id| self.page.text(id))
    }

    /// Removes the control and restores the native scroll indicator.
    pub fn destroy(mut self) {
        self.tick_leave();
        if let Some(root) = self.root {
            self.page.remove_node(root);
        }
        self.page.remove_page_class(PAGE_CLASS);
    }

    fn snap_handle_to_index(&mut self) {
        self.state.handle_position = handle_fraction(self.state.active_index, self.count);
        let top = handle_top(
            self.state.handle_position,
            self.track_height,
            self.handle_height,
        );
        self.set_handle_top(top);
    }

    fn set_handle_top(&self, top: f64) {
        if let Some(handle) = self.handle {
            self.page.set_attr(handle, "data-top", &format!("{top:.1}"));
        }
    }
}
