//! The content-tree collaborator.
//!
//! A [`Page`] stands in for the host application's rendered document: an
//! element tree with layout rectangles, a scrollable viewport, a current
//! address and structural-mutation notifications. The host side mutates
//! conversation content through [`Page::insert_element`]; the outline side
//! only reads conversation nodes and appends its own overlay widgets, which
//! are invisible to mutation subscribers just as nodes outside the observed
//! container are invisible to a real mutation observer.

use std::sync::Arc;

use ego_tree::{NodeId, Tree};
use parking_lot::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::selector::Selector;

/// Axis-aligned layout rectangle, in page pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// One element in the page tree. Text is stored directly on the element
/// that carries it; subtree text is assembled on demand.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ElementData {
    pub tag: String,
    pub classes: Vec<String>,
    pub attrs: Vec<(String, String)>,
    pub text: String,
    pub rect: Rect,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_owned(),
            ..Self::default()
        }
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.push(class.to_owned());
        self
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.push((name.to_owned(), value.to_owned()));
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_owned();
        self
    }

    pub fn with_rect(mut self, rect: Rect) -> Self {
        self.rect = rect;
        self
    }

    /// Value of the named attribute, if present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// The visible window onto the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub height: f64,
    pub scroll_top: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            height: 800.0,
            scroll_top: 0.0,
        }
    }
}

/// Structural-mutation notification delivered to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    /// Nodes were added beneath `parent`.
    SubtreeChanged {
        parent: NodeId,
        added: Vec<NodeId>,
    },
}

struct PageInner {
    tree: Tree<ElementData>,
    address: String,
    viewport: Viewport,
    page_classes: Vec<String>,
    subscribers: Vec<UnboundedSender<PageEvent>>,
}

/// Shared handle to one page. Cloning is cheap; all clones observe the same
/// tree.
#[derive(Clone)]
pub struct Page {
    inner: Arc<Mutex<PageInner>>,
}

impl Page {
    /// An empty page with a bare `body` root.
    pub fn new(address: &str) -> Self {
        Self::from_tree(Tree::new(ElementData::new("body")), address)
    }

    /// Wraps an already-built element tree.
    pub fn from_tree(tree: Tree<ElementData>, address: &str) -> Self {
        Self {
            inner: Arc::new(Mutex::new(PageInner {
                tree,
                address: address.to_owned(),
                viewport: Viewport::default(),
                page_classes: Vec::new(),
                subscribers: Vec::new(),
            })),
        }
    }

    pub fn root_id(&self) -> NodeId {
        self.inner.lock().tree.root().id()
    }

    pub fn address(&self) -> String {
        self.inner.lock().address.clone()
    }

    /// Host-side navigation. Address changes are detected by polling, so
    /// this does not notify subscribers.
    pub fn set_address(&self, address: &str) {
        self.inner.lock().address = address.to_owned();
    }

    pub fn viewport(&self) -> Viewport {
        self.inner.lock().viewport
    }

    pub fn set_viewport_height(&self, height: f64) {
        self.inner.lock().viewport.height = height;
    }

    /// Subscribes to structural mutations. Closed receivers are pruned on
    /// the next emit.
    pub fn subscribe(&self) -> UnboundedReceiver<PageEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.lock().subscribers.push(tx);
        rx
    }

    /// Appends host content beneath `parent` and notifies subscribers.
    /// Returns `None` when `parent` is gone.
    pub fn insert_element(&self, parent: NodeId, data: ElementData) -> Option<NodeId> {
        let mut inner = self.inner.lock();
        if !inner.is_attached(parent) {
            return None;
        }
        let id = inner.tree.get_mut(parent)?.append(data).id();
        inner.emit(PageEvent::SubtreeChanged {
            parent,
            added: vec![id],
        });
        Some(id)
    }

    /// Appends an overlay widget beneath `parent` without notifying
    /// mutation subscribers; overlay nodes sit outside the observed
    /// conversation container.
    pub fn append_overlay(&self, parent: NodeId, data: ElementData) -> Option<NodeId> {
        let mut inner = self.inner.lock();
        if !inner.is_attached(parent) {
            return None;
        }
        Some(inner.tree.get_mut(parent)?.append(data).id())
    }

    /// Detaches a node (host removal or overlay teardown). Detached nodes
    /// make every later operation against their id a no-op.
    pub fn remove_node(&self, id: NodeId) -> bool {
        let mut inner = self.inner.lock();
        if id == inner.tree.root().id() || !inner.is_attached(id) {
            return false;
        }
        if let Some(mut node) = inner.tree.get_mut(id) {
            node.detach();
            return true;
        }
        false
    }

    /// Detaches every child of `id`.
    pub fn clear_children(&self, id: NodeId) -> bool {
        let mut inner = self.inner.lock();
        if !inner.is_attached(id) {
            return false;
        }
        let children: Vec<NodeId> = match inner.tree.get(id) {
            Some(node) => node.children().map(|c| c.id()).collect(),
            None => return false,
        };
        for child in children {
            if let Some(mut node) = inner.tree.get_mut(child) {
                node.detach();
            }
        }
        true
    }

    /// Whether `id` is still attached to the document.
    pub fn contains(&self, id: NodeId) -> bool {
        self.inner.lock().is_attached(id)
    }

    /// Whether `id` is `ancestor` or sits beneath it.
    pub fn is_within(&self, id: NodeId, ancestor: NodeId) -> bool {
        let inner = self.inner.lock();
        if id == ancestor {
            return inner.is_attached(id);
        }
        inner
            .tree
            .get(id)
            .map(|node| node.ancestors().any(|a| a.id() == ancestor))
            .unwrap_or(false)
    }

    /// All attached elements matching `selector`, in document order.
    pub fn query(&self, selector: &Selector) -> Vec<NodeId> {
        let inner = self.inner.lock();
        inner
            .tree
            .root()
            .descendants()
            .filter(|node| selector.matches(node.value()))
            .map(|node| node.id())
            .collect()
    }

    /// Elements beneath `root` (excluding `root` itself) matching
    /// `selector`, in document order.
    pub fn query_within(&self, root: NodeId, selector: &Selector) -> Vec<NodeId> {
        let inner = self.inner.lock();
        match inner.tree.get(root) {
            Some(node) => node
                .descendants()
                .skip(1)
                .filter(|n| selector.matches(n.value()))
                .map(|n| n.id())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Whether the node itself matches `selector`.
    pub fn matches(&self, id: NodeId, selector: &Selector) -> bool {
        let inner = self.inner.lock();
        inner
            .tree
            .get(id)
            .map(|node| selector.matches(node.value()))
            .unwrap_or(false)
    }

    /// Whitespace-normalized text of the node and its whole subtree.
    pub fn subtree_text(&self, id: NodeId) -> Option<String> {
        let inner = self.inner.lock();
        let node = inner.tree.get(id)?;
        let mut pieces = Vec::new();
        for n in node.descendants() {
            let text = n.value().text.trim();
            if !text.is_empty() {
                pieces.push(text.to_owned());
            }
        }
        Some(
            pieces
                .join(" ")
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" "),
        )
    }

    /// The node's own direct text.
    pub fn text(&self, id: NodeId) -> Option<String> {
        self.inner.lock().tree.get(id).map(|n| n.value().text.clone())
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<String> {
        let inner = self.inner.lock();
        inner
            .tree
            .get(id)
            .and_then(|n| n.value().attr(name).map(str::to_owned))
    }

    pub fn set_attr(&self, id: NodeId, name: &str, value: &str) -> bool {
        let mut inner = self.inner.lock();
        match inner.tree.get_mut(id) {
            Some(mut node) => {
                let attrs = &mut node.value().attrs;
                match attrs.iter_mut().find(|(n, _)| n == name) {
                    Some((_, v)) => *v = value.to_owned(),
                    None => attrs.push((name.to_owned(), value.to_owned())),
                }
                true
            }
            None => false,
        }
    }

    pub fn classes(&self, id: NodeId) -> Vec<String> {
        self.inner
            .lock()
            .tree
            .get(id)
            .map(|n| n.value().classes.clone())
            .unwrap_or_default()
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.classes(id).iter().any(|c| c == class)
    }

    /// Adds a class to a node; a no-op (returning `false`) when the node is
    /// gone, so stale-anchor highlights cannot fault.
    pub fn add_class(&self, id: NodeId, class: &str) -> bool {
        let mut inner = self.inner.lock();
        if !inner.is_attached(id) {
            return false;
        }
        match inner.tree.get_mut(id) {
            Some(mut node) => {
                let classes = &mut node.value().classes;
                if !classes.iter().any(|c| c == class) {
                    classes.push(class.to_owned());
                }
                true
            }
            None => false,
        }
    }

    pub fn remove_class(&self, id: NodeId, class: &str) -> bool {
        let mut inner = self.inner.lock();
        match inner.tree.get_mut(id) {
            Some(mut node) => {
                node.value().classes.retain(|c| c != class);
                true
            }
            None => false,
        }
    }

    pub fn rect(&self, id: NodeId) -> Option<Rect> {
        self.inner.lock().tree.get(id).map(|n| n.value().rect)
    }

    /// Scrolls the viewport so the node sits centered. Returns `false` for
    /// detached nodes (the stale-anchor case), which callers skip silently.
    pub fn scroll_into_view(&self, id: NodeId) -> bool {
        let mut inner = self.inner.lock();
        if !inner.is_attached(id) {
            return false;
        }
        let rect = match inner.tree.get(id) {
            Some(node) => node.value().rect,
            None => return false,
        };
        let height = inner.viewport.height;
        inner.viewport.scroll_top = (rect.y + rect.height / 2.0 - height / 2.0).max(0.0);
        true
    }

    /// Page-level class, e.g. the one that suppresses the host's native
    /// scroll indicator while precision mode is active.
    pub fn add_page_class(&self, class: &str) {
        let mut inner = self.inner.lock();
        if !inner.page_classes.iter().any(|c| c == class) {
            inner.page_classes.push(class.to_owned());
        }
    }

    pub fn remove_page_class(&self, class: &str) {
        self.inner.lock().page_classes.retain(|c| c != class);
    }

    pub fn has_page_class(&self, class: &str) -> bool {
        self.inner.lock().page_classes.iter().any(|c| c == class)
    }
}

impl PageInner {
    /// Detached nodes stay in the arena, so attachment means reaching the
    /// root by walking ancestors.
    fn is_attached(&self, id: NodeId) -> bool {
        let root = self.tree.root().id();
        if id == root {
            return true;
        }
        self.tree
            .get(id)
            .map(|node| node.ancestors().any(|a| a.id() == root))
            .unwrap_or(false)
    }

    fn emit(&mut self, event: PageEvent) {
        self.subscribers
            .retain(|tx| tx.send(event.clone()).is_ok());
    }
}
