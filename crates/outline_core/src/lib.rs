//! Outline core: pure platform, title and navigation-geometry logic.
mod geometry;
mod mode;
mod platform;
mod title;

pub use geometry::{
    drag_handle_top, handle_fraction, handle_top, index_for_progress, progress_for_handle_top,
    step_index, tick_fraction,
};
pub use mode::{NavigationMode, PanelPosition};
pub use platform::{identify, PlatformId};
pub use title::{
    contains_code_marker, reduce, CODE_PLACEHOLDER, DEFAULT_MAX_TITLE_LEN, EMPTY_MESSAGE_TITLE,
    UNTITLED_TITLE,
};
