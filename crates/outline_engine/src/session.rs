//! The outline controller.
//!
//! One session owns everything mutable — the record list, the active
//! presenter, the watcher and the pending highlight deadlines — and runs
//! it all on a single task. Commands, debounced refreshes and highlight
//! expiries serialize through one `select!` loop, so no state needs a
//! lock; the record list and widgets are replaced wholesale, never patched
//! concurrently.

use std::sync::Arc;

use ego_tree::NodeId;
use outline_core::{identify, NavigationMode, PanelPosition, PlatformId};
use outline_logging::{outline_debug, outline_info, outline_trace, outline_warn};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::extract::{extractor_for, MessageExtractor};
use crate::navigator::{PrecisionNavigator, ScrollbarState};
use crate::page::Page;
use crate::panel::{ListPanel, HIGHLIGHT_CLASS};
use crate::settings::{
    load_navigation_mode, load_panel_position, save_navigation_mode, save_panel_position,
    SettingsStore,
};
use crate::types::{MessageRecord, OverlaySettings};
use crate::watcher::ChangeWatcher;

/// Why a session refused to start. Unsupported pages are terminal: there
/// is nothing to retry against, so nothing gets built.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("unsupported platform for address {0}")]
    UnsupportedPlatform(String),
}

/// User interactions with the overlay, delivered by the embedding host.
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    /// Click on a list-panel entry.
    PanelEntry { index: usize },
    /// Click on the floating button that shows/hides the panel.
    PanelToggle,
    /// Press on the precision handle.
    BeginDrag,
    /// Pointer movement during a drag, relative to the track top.
    DragMove { pointer_y: f64 },
    /// Pointer release ending a drag.
    EndDrag,
    /// Click on the track at a fractional position, off the handle.
    TrackClick { fraction: f64 },
    /// One wheel event; only the sign matters.
    Wheel { delta: i32 },
    /// Click on a tick mark.
    TickClick { index: usize },
    /// Pointer entered a tick mark.
    TickHover { index: usize },
    /// Pointer left the tick marks.
    TickLeave,
    /// One press of the mode shortcut; two within the double-tap window
    /// toggle the navigation mode.
    ModeKey,
}

/// Messages into the session task.
pub enum SessionCommand {
    Gesture(Gesture),
    /// Out-of-band settings notification (the host's popup form).
    SettingsChanged {
        mode: Option<NavigationMode>,
        panel_position: Option<PanelPosition>,
    },
    /// Point-in-time view of session state, for hosts and tests.
    Snapshot(oneshot::Sender<SessionSnapshot>),
    Shutdown,
}

/// What a [`SessionCommand::Snapshot`] reports.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub platform: PlatformId,
    pub mode: NavigationMode,
    pub titles: Vec<String>,
    pub scrollbar: Option<ScrollbarState>,
    /// Number of extraction passes run so far.
    pub pass: u64,
}

enum Presenter {
    List(ListPanel),
    Precision(PrecisionNavigator),
}

/// Handle to a running outline session.
pub struct OutlineSession {
    commands: mpsc::UnboundedSender<SessionCommand>,
    task: JoinHandle<()>,
}

impl OutlineSession {
    /// Identifies the platform behind `page` and spawns the session task.
    /// Fails fast on an unknown host; no widgets are built in that case.
    pub fn start(
        page: Page,
        store: Arc<dyn SettingsStore>,
        settings: OverlaySettings,
    ) -> Result<Self, InitError> {
        let address = page.address();
        let platform =
            identify(&address).ok_or_else(|| InitError::UnsupportedPlatform(address.clone()))?;
        outline_info!("starting outline session for {platform} at {address}");

        let mode = load_navigation_mode(store.as_ref());
        let panel_position = load_panel_position(store.as_ref());
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();

        let task = SessionTask {
            page,
            store,
            settings,
            platform,
            extractor: extractor_for(platform),
            mode,
            panel_position,
            records: Vec::new(),
            presenter: None,
            commands: commands_rx,
            highlights: Vec::new(),
            last_mode_key: None,
            pass: 0,
        };
        let task = tokio::spawn(task.run());

        Ok(Self {
            commands: commands_tx,
            task,
        })
    }

    pub fn command(&self, command: SessionCommand) {
        let _ = self.commands.send(command);
    }

    pub fn gesture(&self, gesture: Gesture) {
        self.command(SessionCommand::Gesture(gesture));
    }

    /// Requests a snapshot; `None` when the session is already gone.
    pub async fn snapshot(&self) -> Option<SessionSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.command(SessionCommand::Snapshot(tx));
        rx.await.ok()
    }

    /// Tears the session down and waits for the task to finish.
    pub async fn shutdown(self) {
        let _ = self.commands.send(SessionCommand::Shutdown);
        let _ = self.task.await;
    }
}

struct SessionTask {
    page: Page,
    store: Arc<dyn SettingsStore>,
    settings: OverlaySettings,
    platform: PlatformId,
    extractor: Box<dyn MessageExtractor>,
    mode: NavigationMode,
    panel_position: PanelPosition,
    records: Vec<MessageRecord>,
    presenter: Option<Presenter>,
    commands: mpsc::UnboundedReceiver<SessionCommand>,
    highlights: Vec<(Instant, NodeId)>,
    last_mode_key: Option<Instant>,
    pass: u64,
}

impl SessionTask {
    async fn run(mut self) {
        // Let the host page finish its own initial render before the
        // first extraction runs against it.
        tokio::time::sleep(self.settings.startup_settle).await;

        let container = self.container_node();
        let mut watcher = ChangeWatcher::new(
            &self.page,
            container,
            self.extractor.mutation_signature().cloned(),
            self.settings.watch.clone(),
        );

        self.build_presenter();
        self.refresh();

        loop {
            let next_highlight = self.highlights.iter().map(|(at, _)| *at).min();
            tokio::select! {
                command = self.commands.recv() => {
                    match command {
                        None | Some(SessionCommand::Shutdown) => break,
                        Some(command) => self.handle_command(command),
                    }
                }
                cause = watcher.changed() => {
                    outline_debug!("refresh triggered by {cause:?}");
                    self.refresh();
                }
                _ = tokio::time::sleep_until(next_highlight.unwrap_or_else(Instant::now)),
                    if next_highlight.is_some() =>
                {
                    self.expire_highlights();
                }
            }
        }

        // Watcher timers die with the watcher; widgets and transient
        // classes are cleaned up explicitly.
        self.clear_highlights();
        self.teardown_presenter();
        outline_info!("outline session for {} shut down", self.platform);
    }

    fn handle_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Gesture(gesture) => self.handle_gesture(gesture),
            SessionCommand::SettingsChanged {
                mode,
                panel_position,
            } => {
                if let Some(position) = panel_position {
                    self.panel_position = position;
                    save_panel_position(self.store.as_ref(), position);
                    if let Some(Presenter::List(panel)) = &self.presenter {
                        panel.set_position(position);
                    }
                }
                if let Some(mode) = mode {
                    if mode != self.mode {
                        self.set_mode(mode);
                    }
                }
            }
            SessionCommand::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
            }
            SessionCommand::Shutdown => {}
        }
    }

    fn handle_gesture(&mut self, gesture: Gesture) {
        match gesture {
            Gesture::ModeKey => self.handle_mode_key(),
            Gesture::PanelEntry { index } => {
                let anchor = match &self.presenter {
                    Some(Presenter::List(panel)) => panel.activate(&self.records, index),
                    _ => None,
                };
                if let Some(anchor) = anchor {
                    self.schedule_highlight(anchor);
                }
            }
            Gesture::PanelToggle => {
                if let Some(Presenter::List(panel)) = &mut self.presenter {
                    panel.toggle_visibility();
                }
            }
            Gesture::BeginDrag => {
                if let Some(Presenter::Precision(nav)) = &mut self.presenter {
                    nav.begin_drag();
                }
            }
            Gesture::DragMove { pointer_y } => {
                let index = match &mut self.presenter {
                    Some(Presenter::Precision(nav)) => nav.drag_move(pointer_y),
                    _ => None,
                };
                if let Some(index) = index {
                    self.scroll_and_highlight(index);
                }
            }
            Gesture::EndDrag => {
                if let Some(Presenter::Precision(nav)) = &mut self.presenter {
                    nav.end_drag();
                }
            }
            Gesture::TrackClick { fraction } => {
                let index = match &mut self.presenter {
                    Some(Presenter::Precision(nav)) => nav.track_click(fraction),
                    _ => None,
                };
                if let Some(index) = index {
                    self.scroll_and_highlight(index);
                }
            }
            Gesture::Wheel { delta } => {
                let index = match &mut self.presenter {
                    Some(Presenter::Precision(nav)) => nav.wheel(delta),
                    _ => None,
                };
                if let Some(index) = index {
                    self.scroll_and_highlight(index);
                }
            }
            Gesture::TickClick { index } => {
                let index = match &mut self.presenter {
                    Some(Presenter::Precision(nav)) => nav.tick_click(index),
                    _ => None,
                };
                if let Some(index) = index {
                    self.scroll_and_highlight(index);
                }
            }
            Gesture::TickHover { index } => {
                let title = self.records.get(index).map(|r| r.title.clone());
                if let (Some(Presenter::Precision(nav)), Some(title)) =
                    (&mut self.presenter, title)
                {
                    nav.tick_hover(&title);
                }
            }
            Gesture::TickLeave => {
                if let Some(Presenter::Precision(nav)) = &mut self.presenter {
                    nav.tick_leave();
                }
            }
        }
    }

    /// Two presses within the double-tap window toggle the mode. The
    /// window is independent of the mutation debounce.
    fn handle_mode_key(&mut self) {
        let now = Instant::now();
        match self.last_mode_key.take() {
            Some(previous) if now - previous <= self.settings.double_tap_window => {
                self.set_mode(self.mode.toggled());
            }
            _ => self.last_mode_key = Some(now),
        }
    }

    /// The mode transition: teardown, persist, rebuild, re-extract. Same-
    /// mode requests are short-circuited by the callers, so arriving here
    /// always means a real switch.
    fn set_mode(&mut self, mode: NavigationMode) {
        outline_info!("switching navigation mode {} -> {}", self.mode, mode);
        self.teardown_presenter();
        self.mode = mode;
        save_navigation_mode(self.store.as_ref(), mode);
        self.build_presenter();
        self.refresh();
    }

    fn build_presenter(&mut self) {
        self.presenter = Some(match self.mode {
            NavigationMode::List => {
                Presenter::List(ListPanel::build(&self.page, self.panel_position))
            }
            NavigationMode::Precision => Presenter::Precision(PrecisionNavigator::build(
                &self.page,
                self.settings.handle_height,
            )),
        });
    }

    fn teardown_presenter(&mut self) {
        match self.presenter.take() {
            Some(Presenter::List(panel)) => panel.destroy(),
            Some(Presenter::Precision(nav)) => nav.destroy(),
            None => {}
        }
    }

    /// One extraction pass: replace the record list wholesale and push it
    /// into whichever presenter is active.
    fn refresh(&mut self) {
        self.pass += 1;
        outline_logging::set_extraction_pass(self.pass);
        self.records = self
            .extractor
            .extract(&self.page, self.settings.title_max_len);
        match &mut self.presenter {
            Some(Presenter::List(panel)) => panel.render(&self.records),
            Some(Presenter::Precision(nav)) => nav.render(&self.records),
            None => {}
        }
    }

    fn scroll_and_highlight(&mut self, index: usize) {
        let Some(record) = self.records.get(index) else {
            return;
        };
        let anchor = record.anchor;
        if !self.page.scroll_into_view(anchor) {
            outline_trace!("stale anchor for index {index}, skipping scroll");
            return;
        }
        self.page.add_class(anchor, HIGHLIGHT_CLASS);
        self.schedule_highlight(anchor);
    }

    fn schedule_highlight(&mut self, anchor: NodeId) {
        self.highlights
            .push((Instant::now() + self.settings.highlight, anchor));
    }

    fn expire_highlights(&mut self) {
        let now = Instant::now();
        let (expired, pending): (Vec<_>, Vec<_>) =
            self.highlights.drain(..).partition(|(at, _)| *at <= now);
        self.highlights = pending;
        for (_, anchor) in expired {
            // The node may be long gone; remove_class is a guarded no-op.
            self.page.remove_class(anchor, HIGHLIGHT_CLASS);
        }
    }

    fn clear_highlights(&mut self) {
        for (_, anchor) in self.highlights.drain(..) {
            self.page.remove_class(anchor, HIGHLIGHT_CLASS);
        }
    }

    fn container_node(&self) -> NodeId {
        for selector in self.extractor.container_chain() {
            if let Some(&node) = self.page.query(selector).first() {
                outline_debug!("watch container resolved via `{selector}`");
                return node;
            }
        }
        outline_warn!("no watch container matched, observing the whole page");
        self.page.root_id()
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            platform: self.platform,
            mode: self.mode,
            titles: self.records.iter().map(|r| r.title.clone()).collect(),
            scrollbar: match &self.presenter {
                Some(Presenter::Precision(nav)) => Some(nav.state()),
                _ => None,
            },
            pass: self.pass,
        }
    }
}
