use std::time::Duration;

use chrono::{DateTime, Utc};
use ego_tree::NodeId;

/// One user turn, produced by an extraction pass.
///
/// Records are value-like: every pass replaces the whole list and no record
/// survives into the next one. The `anchor` is a non-owning handle into the
/// live [`Page`](crate::Page) tree and goes stale when the host removes the
/// node; page operations against a stale anchor are no-ops.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageRecord {
    /// Platform-namespaced id, e.g. `chatgpt-msg-3`. Stable only within the
    /// pass that minted it.
    pub id: String,
    /// Normalized plain text of the turn.
    pub raw_text: String,
    /// Short display label derived from `raw_text`.
    pub title: String,
    /// Handle to the matched node in the page tree.
    pub anchor: NodeId,
    /// When the extraction pass that produced this record ran.
    pub extracted_at: DateTime<Utc>,
}

/// What tripped a debounced refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeCause {
    /// Structural mutation inside the watched container.
    Mutation,
    /// The page address moved to a different conversation.
    AddressChanged,
}

/// Timer knobs for the change watcher.
#[derive(Debug, Clone)]
pub struct WatchTiming {
    /// Trailing-edge quiet period after a mutation burst.
    pub debounce: Duration,
    /// How often the page address is polled.
    pub address_poll: Duration,
    /// Extra settle delay after an address change, so the new conversation's
    /// tree can populate before extraction runs.
    pub address_settle: Duration,
}

impl Default for WatchTiming {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(500),
            address_poll: Duration::from_millis(500),
            address_settle: Duration::from_millis(800),
        }
    }
}

/// Host-facing configuration for an outline session.
#[derive(Debug, Clone)]
pub struct OverlaySettings {
    /// Character cap for derived titles.
    pub title_max_len: usize,
    /// Change-watcher timings.
    pub watch: WatchTiming,
    /// Delay before the first extraction, so the host page finishes its own
    /// initial render.
    pub startup_settle: Duration,
    /// How long a clicked message keeps its highlight class.
    pub highlight: Duration,
    /// Window within which two mode-key presses count as a double tap.
    /// Independent of the mutation debounce.
    pub double_tap_window: Duration,
    /// Height of the precision scrollbar handle, in track pixels.
    pub handle_height: f64,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            title_max_len: outline_core::DEFAULT_MAX_TITLE_LEN,
            watch: WatchTiming::default(),
            startup_settle: Duration::from_millis(1000),
            highlight: Duration::from_millis(2000),
            double_tap_window: Duration::from_millis(1000),
            handle_height: 80.0,
        }
    }
}
