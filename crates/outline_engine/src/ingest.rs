//! Builds a [`Page`] from a captured HTML snapshot.
//!
//! Snapshots carry no layout, so elements get a synthetic vertical layout:
//! each element is stacked one line below the previous one in document
//! order. That is enough for centered scrolling and for position-keyed
//! deduplication to tell distinct nodes apart.

use ego_tree::{NodeId, NodeRef, Tree};
use scraper::node::Node;
use scraper::Html;

use crate::page::{ElementData, Page, Rect};

const SYNTHETIC_LINE_HEIGHT: f64 = 24.0;
const SYNTHETIC_WIDTH: f64 = 800.0;

/// Parses `html` into a page rooted at its `<html>` element.
pub fn page_from_html(html: &str, address: &str) -> Page {
    let document = Html::parse_document(html);
    let mut tree = Tree::new(ElementData::new("body"));
    let root_id = tree.root().id();
    let mut cursor = LayoutCursor::default();

    for child in document.tree.root().children() {
        visit_node(child, &mut tree, root_id, &mut cursor);
    }
    Page::from_tree(tree, address)
}

#[derive(Default)]
struct LayoutCursor {
    next_row: usize,
}

impl LayoutCursor {
    fn next_rect(&mut self) -> Rect {
        let y = self.next_row as f64 * SYNTHETIC_LINE_HEIGHT;
        self.next_row += 1;
        Rect::new(0.0, y, SYNTHETIC_WIDTH, SYNTHETIC_LINE_HEIGHT)
    }
}

fn visit_node(
    node: NodeRef<'_, Node>,
    tree: &mut Tree<ElementData>,
    parent: NodeId,
    cursor: &mut LayoutCursor,
) {
    match node.value() {
        Node::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return;
            }
            // Bare text gets its own carrier so sibling order survives.
            let rect = cursor.next_rect();
            if let Some(mut parent_node) = tree.get_mut(parent) {
                parent_node.append(
                    ElementData::new("span")
                        .with_text(trimmed)
                        .with_rect(rect),
                );
            }
        }
        Node::Element(element) => {
            let tag = element.name().to_ascii_lowercase();
            if matches!(tag.as_str(), "script" | "style" | "noscript" | "template") {
                return;
            }

            let mut data = ElementData::new(&tag).with_rect(cursor.next_rect());
            for (name, value) in element.attrs() {
                if name == "class" {
                    data.classes = value.split_whitespace().map(str::to_owned).collect();
                } else {
                    data.attrs.push((name.to_owned(), value.to_owned()));
                }
            }

            let id = match tree.get_mut(parent) {
                Some(mut parent_node) => parent_node.append(data).id(),
                None => return,
            };
            for child in node.children() {
                visit_node(child, tree, id, cursor);
            }
        }
        _ => {
            for child in node.children() {
                visit_node(child, tree, parent, cursor);
            }
        }
    }
}
