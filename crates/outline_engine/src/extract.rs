//! Per-platform message extraction.
//!
//! Every platform supplies a selector chain (ordered fallback strategies,
//! first one that matches wins), a text resolution rule and optional
//! quirks; the walk over matched nodes is shared. Chains return nodes in
//! document order and that order is authoritative — no resorting.

use std::collections::HashSet;

use chrono::Utc;
use outline_core::PlatformId;
use outline_logging::{outline_debug, outline_info, outline_trace};

use crate::page::Page;
use crate::selector::Selector;
use crate::types::MessageRecord;

/// How to pull plain text out of a matched node.
#[derive(Debug, Clone)]
pub enum TextRule {
    /// Concatenated text of the matched node's whole subtree.
    OwnSubtree,
    /// Text of the first match beneath the node, separating a bubble's
    /// content from its metadata; falls back to the node's own subtree
    /// text when the nested lookup misses.
    Nested(Selector),
}

/// One platform's extraction strategy. `extract` never fails: an exhausted
/// selector chain yields an empty list, which is the documented degraded
/// state rather than an error.
pub trait MessageExtractor: Send + Sync {
    fn platform(&self) -> PlatformId;

    /// Fallback lookup strategies, newest markup first.
    fn selector_chain(&self) -> &[Selector];

    fn text_rule(&self) -> &TextRule;

    /// Where the change watcher roots its mutation subscription; tried in
    /// order, whole page as the fallback.
    fn container_chain(&self) -> &[Selector];

    /// When set, mutation events only schedule a refresh if an added
    /// subtree plausibly holds a new message. Platforms without one fire
    /// unconditionally and lean on the debounce instead.
    fn mutation_signature(&self) -> Option<&Selector> {
        None
    }

    /// Whether duplicate nodes (same text, same on-screen position) are
    /// suppressed within a pass. An observed re-render quirk of one
    /// platform, deliberately not generalized.
    fn dedup_by_position(&self) -> bool {
        false
    }

    fn extract(&self, page: &Page, title_max_len: usize) -> Vec<MessageRecord> {
        let Some((selector, hits)) = self.selector_chain().iter().find_map(|sel| {
            let hits = page.query(sel);
            if hits.is_empty() {
                None
            } else {
                Some((sel, hits))
            }
        }) else {
            outline_debug!(
                "[{}] selector chain exhausted, no user messages",
                self.platform()
            );
            return Vec::new();
        };
        outline_debug!(
            "[{}] selector `{}` matched {} nodes",
            self.platform(),
            selector,
            hits.len()
        );

        let slug = self.platform().slug();
        let mut seen: HashSet<(String, i64, i64)> = HashSet::new();
        let mut records = Vec::new();
        for node in hits {
            let raw_text = resolve_text(page, node, self.text_rule());
            if raw_text.is_empty() {
                continue;
            }
            if self.dedup_by_position() {
                let rect = page.rect(node).unwrap_or_default();
                let key = (raw_text.clone(), rect.x.round() as i64, rect.y.round() as i64);
                if !seen.insert(key) {
                    outline_trace!("[{}] suppressed duplicate node", self.platform());
                    continue;
                }
            }
            records.push(MessageRecord {
                id: format!("{}-msg-{}", slug, records.len()),
                title: outline_core::reduce(&raw_text, title_max_len),
                raw_text,
                anchor: node,
                extracted_at: Utc::now(),
            });
        }

        outline_info!(
            "[{}] pass {}: extracted {} user messages",
            self.platform(),
            outline_logging::extraction_pass(),
            records.len()
        );
        records
    }
}

fn resolve_text(page: &Page, node: ego_tree::NodeId, rule: &TextRule) -> String {
    let resolved = match rule {
        TextRule::OwnSubtree => page.subtree_text(node),
        TextRule::Nested(sel) => page
            .query_within(node, sel)
            .first()
            .and_then(|inner| page.subtree_text(*inner))
            .filter(|text| !text.trim().is_empty())
            .or_else(|| page.subtree_text(node)),
    };
    resolved.unwrap_or_default().trim().to_owned()
}

fn chain(specs: &[&str]) -> Vec<Selector> {
    specs
        .iter()
        .filter_map(|spec| Selector::parse(spec).ok())
        .collect()
}

/// ChatGPT marks user turns with a stable data attribute, so a single
/// strategy suffices and the same selector doubles as the mutation
/// signature.
pub struct ChatGptExtractor {
    selectors: Vec<Selector>,
    containers: Vec<Selector>,
    signature: Option<Selector>,
    rule: TextRule,
}

impl ChatGptExtractor {
    pub fn new() -> Self {
        Self {
            selectors: chain(&[r#"[data-message-author-role="user"]"#]),
            containers: chain(&["main"]),
            signature: Selector::parse(r#"[data-message-author-role="user"]"#).ok(),
            rule: TextRule::OwnSubtree,
        }
    }
}

impl Default for ChatGptExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageExtractor for ChatGptExtractor {
    fn platform(&self) -> PlatformId {
        PlatformId::ChatGpt
    }

    fn selector_chain(&self) -> &[Selector] {
        &self.selectors
    }

    fn text_rule(&self) -> &TextRule {
        &self.rule
    }

    fn container_chain(&self) -> &[Selector] {
        &self.containers
    }

    fn mutation_signature(&self) -> Option<&Selector> {
        self.signature.as_ref()
    }
}

/// Gemini's markup has varied over time; later chain entries are older
/// strategies kept as fallbacks. Its tree occasionally holds transient
/// duplicate nodes during re-render, hence the position dedup.
pub struct GeminiExtractor {
    selectors: Vec<Selector>,
    containers: Vec<Selector>,
    rule: TextRule,
}

impl GeminiExtractor {
    pub fn new() -> Self {
        Self {
            selectors: chain(&[
                ".user-message",
                r#"[data-test-id*="user"]"#,
                r#".message-content[data-author="user"]"#,
                "message-set.user-message",
            ]),
            containers: chain(&["main"]),
            rule: TextRule::OwnSubtree,
        }
    }
}

impl Default for GeminiExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageExtractor for GeminiExtractor {
    fn platform(&self) -> PlatformId {
        PlatformId::Gemini
    }

    fn selector_chain(&self) -> &[Selector] {
        &self.selectors
    }

    fn text_rule(&self) -> &TextRule {
        &self.rule
    }

    fn container_chain(&self) -> &[Selector] {
        &self.containers
    }

    fn dedup_by_position(&self) -> bool {
        true
    }
}

/// Doubao nests a bubble's content under `.message-text`, with sender
/// metadata as sibling text, so resolution looks beneath the match.
pub struct DoubaoExtractor {
    selectors: Vec<Selector>,
    containers: Vec<Selector>,
    rule: TextRule,
}

impl DoubaoExtractor {
    pub fn new() -> Self {
        Self {
            selectors: chain(&[
                ".message-item.user",
                r#"[data-role="user"]"#,
                ".chat-message-user",
                ".message-box.user",
            ]),
            containers: chain(&["main", ".chat-container"]),
            rule: Selector::parse(".message-text")
                .map(TextRule::Nested)
                .unwrap_or(TextRule::OwnSubtree),
        }
    }
}

impl Default for DoubaoExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageExtractor for DoubaoExtractor {
    fn platform(&self) -> PlatformId {
        PlatformId::Doubao
    }

    fn selector_chain(&self) -> &[Selector] {
        &self.selectors
    }

    fn text_rule(&self) -> &TextRule {
        &self.rule
    }

    fn container_chain(&self) -> &[Selector] {
        &self.containers
    }
}

/// The closed platform-to-extractor registry. New platforms add a variant
/// and an entry here; shared logic stays untouched.
pub fn extractor_for(platform: PlatformId) -> Box<dyn MessageExtractor> {
    match platform {
        PlatformId::ChatGpt => Box::new(ChatGptExtractor::new()),
        PlatformId::Gemini => Box::new(GeminiExtractor::new()),
        PlatformId::Doubao => Box::new(DoubaoExtractor::new()),
    }
}
