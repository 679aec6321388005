//! Outline engine: content-tree model, extraction, change watching and the
//! dual-mode navigation session.
mod extract;
mod ingest;
mod navigator;
mod page;
mod panel;
mod selector;
mod session;
mod settings;
mod types;
mod watcher;

pub use extract::{
    extractor_for, ChatGptExtractor, DoubaoExtractor, GeminiExtractor, MessageExtractor, TextRule,
};
pub use ingest::page_from_html;
pub use navigator::{PrecisionNavigator, ScrollbarState, PAGE_CLASS};
pub use page::{ElementData, Page, PageEvent, Rect, Viewport};
pub use panel::{ListPanel, HIGHLIGHT_CLASS};
pub use selector::{Selector, SelectorError};
pub use session::{Gesture, InitError, OutlineSession, SessionCommand, SessionSnapshot};
pub use settings::{
    load_navigation_mode, load_panel_position, save_navigation_mode, save_panel_position,
    MemorySettingsStore, SettingsError, SettingsStore, NAVIGATION_MODE_KEY, PANEL_POSITION_KEY,
};
pub use types::{ChangeCause, MessageRecord, OverlaySettings, WatchTiming};
pub use watcher::ChangeWatcher;
