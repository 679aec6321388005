//! Debounced change detection.
//!
//! Two independent triggers feed one refresh: structural mutations inside
//! the watched container, and a polled page address that moves when a
//! single-page host swaps conversations without a reload. Both collapse
//! into a single trailing-edge deadline; whichever trigger fires while a
//! deadline is pending replaces it. Dropping the watcher cancels the
//! interval and the pending deadline with it — no timer outlives the
//! subscription.

use ego_tree::NodeId;
use outline_logging::{outline_debug, outline_trace};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{Instant, Interval, MissedTickBehavior};

use crate::page::{Page, PageEvent};
use crate::selector::Selector;
use crate::types::{ChangeCause, WatchTiming};

pub struct ChangeWatcher {
    page: Page,
    container: NodeId,
    signature: Option<Selector>,
    timing: WatchTiming,
    events: UnboundedReceiver<PageEvent>,
    events_closed: bool,
    poll: Interval,
    last_address: String,
    pending: Option<(Instant, ChangeCause)>,
}

impl ChangeWatcher {
    /// Subscribes to `page` mutations rooted at `container`. With a
    /// `signature` selector, only mutations whose added subtrees look like
    /// a new message schedule a refresh; without one every container
    /// mutation does, and the debounce absorbs the burst.
    pub fn new(
        page: &Page,
        container: NodeId,
        signature: Option<Selector>,
        timing: WatchTiming,
    ) -> Self {
        let events = page.subscribe();
        let mut poll = tokio::time::interval(timing.address_poll);
        poll.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self {
            last_address: page.address(),
            page: page.clone(),
            container,
            signature,
            timing,
            events,
            events_closed: false,
            poll,
            pending: None,
        }
    }

    /// Resolves once per debounced refresh. Cancel-safe: all bookkeeping
    /// lives in the struct, so the session can race this in a `select!`.
    pub async fn changed(&mut self) -> ChangeCause {
        loop {
            let deadline = self.pending.map(|(at, _)| at);
            tokio::select! {
                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)),
                    if deadline.is_some() =>
                {
                    if let Some((_, cause)) = self.pending.take() {
                        outline_debug!("refresh fires after quiet period ({cause:?})");
                        return cause;
                    }
                }
                _ = self.poll.tick() => {
                    let address = self.page.address();
                    if address != self.last_address {
                        outline_debug!("address changed to {address}");
                        self.last_address = address;
                        self.schedule(ChangeCause::AddressChanged);
                    }
                }
                event = self.events.recv(), if !self.events_closed => {
                    match event {
                        Some(PageEvent::SubtreeChanged { added, .. }) => {
                            if self.is_relevant(&added) {
                                self.schedule(ChangeCause::Mutation);
                            } else {
                                outline_trace!("mutation ignored by signature pre-filter");
                            }
                        }
                        None => self.events_closed = true,
                    }
                }
            }
        }
    }

    /// Trailing-edge debounce: a new trigger replaces any pending deadline.
    fn schedule(&mut self, cause: ChangeCause) {
        let delay = match cause {
            ChangeCause::Mutation => self.timing.debounce,
            ChangeCause::AddressChanged => self.timing.address_settle,
        };
        self.pending = Some((Instant::now() + delay, cause));
    }

    fn is_relevant(&self, added: &[NodeId]) -> bool {
        added.iter().any(|&id| {
            if !self.page.is_within(id, self.container) {
                return false;
            }
            match &self.signature {
                None => true,
                Some(sig) => {
                    self.page.matches(id, sig) || !self.page.query_within(id, sig).is_empty()
                }
            }
        })
    }
}
