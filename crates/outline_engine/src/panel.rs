//! List-mode presenter: a floating toggle button plus a clickable panel
//! of numbered message titles. Every render replaces the panel content
//! wholesale; there is no diffing and entry handles are rebound per pass.

use ego_tree::NodeId;
use outline_core::PanelPosition;
use outline_logging::outline_debug;

use crate::page::{ElementData, Page};
use crate::types::MessageRecord;

/// Class applied to a message node while its click highlight is live.
pub const HIGHLIGHT_CLASS: &str = "outline-highlight";

pub struct ListPanel {
    page: Page,
    button: Option<NodeId>,
    panel: Option<NodeId>,
    content: Option<NodeId>,
    entries: Vec<NodeId>,
    visible: bool,
}

impl ListPanel {
    /// Appends the button and (hidden) panel as overlay siblings of the
    /// conversation.
    pub fn build(page: &Page, position: PanelPosition) -> Self {
        let root = page.root_id();
        let button = page.append_overlay(
            root,
            ElementData::new("div").with_class("outline-button"),
        );
        let panel = page.append_overlay(
            root,
            ElementData::new("div")
                .with_class("outline-panel")
                .with_class("hidden")
                .with_attr("data-position", position.token()),
        );
        let content = panel.and_then(|panel| {
            page.append_overlay(panel, ElementData::new("div").with_class("outline-content"))
        });
        Self {
            page: page.clone(),
            button,
            panel,
            content,
            entries: Vec::new(),
            visible: false,
        }
    }

    /// Replaces the rendered list with `records`. An empty pass renders
    /// the "no messages" element rather than an error.
    pub fn render(&mut self, records: &[MessageRecord]) {
        let Some(content) = self.content else { return };
        self.page.clear_children(content);
        self.entries.clear();

        if records.is_empty() {
            self.page.append_overlay(
                content,
                ElementData::new("p")
                    .with_class("outline-empty")
                    .with_text("No messages found"),
            );
            return;
        }

        for (index, record) in records.iter().enumerate() {
            let entry = self.page.append_overlay(
                content,
                ElementData::new("div")
                    .with_class("outline-item")
                    .with_attr("data-index", &index.to_string())
                    .with_attr("data-message-id", &record.id)
                    .with_text(&format!("{}. {}", index + 1, record.title)),
            );
            if let Some(entry) = entry {
                self.entries.push(entry);
            }
        }
        outline_debug!("panel rendered {} entries", self.entries.len());
    }

    /// Scrolls the clicked entry's message into view and applies the
    /// transient highlight. Returns the highlighted anchor so the caller
    /// can schedule its clearing; a stale anchor is skipped silently.
    pub fn activate(&self, records: &[MessageRecord], index: usize) -> Option<NodeId> {
        let record = records.get(index)?;
        if !self.page.scroll_into_view(record.anchor) {
            outline_debug!("stale anchor for {}, skipping scroll", record.id);
            return None;
        }
        self.page.add_class(record.anchor, HIGHLIGHT_CLASS);
        Some(record.anchor)
    }

    pub fn toggle_visibility(&mut self) {
        let Some(panel) = self.panel else { return };
        self.visible = !self.visible;
        if self.visible {
            self.page.remove_class(panel, "hidden");
        } else {
            self.page.add_class(panel, "hidden");
        }
    }

    pub fn set_position(&self, position: PanelPosition) {
        if let Some(panel) = self.panel {
            self.page.set_attr(panel, "data-position", position.token());
        }
    }

    /// Removes every widget this mode owns.
    pub fn destroy(self) {
        if let Some(panel) = self.panel {
            self.page.remove_node(panel);
        }
        if let Some(button) = self.button {
            self.page.remove_node(button);
        }
    }
}
