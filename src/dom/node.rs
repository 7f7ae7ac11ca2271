use std::sync::atomic::{AtomicUsize, Ordering};

use crate::dom::events::{DomEvent, Listener};

// ============================================================================
// Node identity and storage
// ============================================================================

/// Index into `Document::nodes`.
pub type NodeId = usize;

/// A single HTML attribute. Names are stored lower-cased by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    pub name: String,
    pub value: String,
}

/// Which option of a `<select>` is currently selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    /// Not touched by script: selectedness comes from `selected` attributes.
    #[default]
    Default,
    Option(NodeId),
    /// A value was assigned that matched no option.
    Nothing,
}

/// Script-visible state of a form control that can diverge from its markup.
///
/// `None` means "never assigned", in which case the reading falls back to
/// the element's attributes (or text, for `<textarea>`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlState {
    pub value: Option<String>,
    pub checked: Option<bool>,
    pub selection: Selection,
}

#[derive(Debug, Clone)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<Attr>,
    pub state: ControlState,
}

impl Element {
    pub fn new(name: &str, attrs: Vec<Attr>) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            attrs,
            state: ControlState::default(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Document,
    Doctype(String),
    Element(Element),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

// ============================================================================
// Document
// ============================================================================

/// Arena-backed, mutable HTML document.
///
/// Nodes live in a flat `Vec` and refer to each other by `NodeId`. Detached
/// nodes keep their slot; they are simply unreachable from the root.
pub struct Document {
    nodes: Vec<Node>,
    pub(crate) listeners: Vec<Listener>,
    pub(crate) dispatched: Vec<DomEvent>,
    queries: AtomicUsize,
}

impl Document {
    /// Create a document containing only the root node.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
            listeners: Vec::new(),
            dispatched: Vec::new(),
            queries: AtomicUsize::new(0),
        }
    }

    /// Parse an HTML string into a document.
    pub fn parse(html: &str) -> Self {
        crate::dom::parser::parse_html(html)
    }

    pub fn root(&self) -> NodeId {
        0
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.nodes.get(id).map(|n| &n.kind) {
            Some(NodeKind::Element(el)) => Some(el),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match self.nodes.get_mut(id).map(|n| &mut n.kind) {
            Some(NodeKind::Element(el)) => Some(el),
            _ => None,
        }
    }

    /// Lower-cased tag name of an element node.
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.name.as_str())
    }

    pub fn is_element(&self, id: NodeId, name: &str) -> bool {
        self.tag_name(id) == Some(name)
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|el| el.attr(name))
    }

    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.attr(id, name).is_some()
    }

    /// Attribute value, treating an empty string as absent.
    pub fn non_empty_attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attr(id, name).filter(|v| !v.is_empty())
    }

    /// Set or add an attribute on an element node.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(el) = self.element_mut(id) {
            match el.attrs.iter_mut().find(|a| a.name.eq_ignore_ascii_case(name)) {
                Some(attr) => attr.value = value.to_string(),
                None => el.attrs.push(Attr {
                    name: name.to_ascii_lowercase(),
                    value: value.to_string(),
                }),
            }
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let Some(el) = self.element_mut(id) {
            el.attrs.retain(|a| !a.name.eq_ignore_ascii_case(name));
        }
    }

    /// Append a new node under `parent` and return its id.
    pub fn append(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(id);
        }
        id
    }

    pub fn append_element(&mut self, parent: NodeId, name: &str, attrs: Vec<Attr>) -> NodeId {
        self.append(parent, NodeKind::Element(Element::new(name, attrs)))
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        // Merge into a trailing text sibling, like the HTML tree builder does.
        if let Some(&last) = self.children(parent).last() {
            if let Some(Node {
                kind: NodeKind::Text(existing),
                ..
            }) = self.nodes.get_mut(last)
            {
                existing.push_str(text);
                return last;
            }
        }
        self.append(parent, NodeKind::Text(text.to_string()))
    }

    /// Detach a node (and its subtree) from its parent.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.parent(id) {
            if let Some(p) = self.nodes.get_mut(parent) {
                p.children.retain(|&c| c != id);
            }
            if let Some(n) = self.nodes.get_mut(id) {
                n.parent = None;
            }
        }
    }

    // -- traversal ----------------------------------------------------------

    /// Ancestors of `id`, nearest first, excluding `id` itself.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: self.parent(id),
        }
    }

    /// Descendants of `id` in document (pre-)order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        Descendants { doc: self, stack }
    }

    /// Descendant elements of `id` with the given tag name, in document order.
    pub fn descendant_elements<'a>(
        &'a self,
        id: NodeId,
        name: &'a str,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.descendants(id).filter(move |&n| self.is_element(n, name))
    }

    /// Nearest ancestor element with the given tag name.
    pub fn closest_ancestor(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.ancestors(id).find(|&a| self.is_element(a, name))
    }

    /// `<html>` element, if present.
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(self.root())
            .iter()
            .copied()
            .find(|&c| self.is_element(c, "html"))
    }

    /// First `<body>` element in document order.
    pub fn body(&self) -> Option<NodeId> {
        self.descendants(self.root()).find(|&n| self.is_element(n, "body"))
    }

    // -- text -----------------------------------------------------------------

    /// Concatenated text of all descendant text nodes (DOM `textContent`).
    pub fn text_content(&self, id: NodeId) -> String {
        self.text_content_excluding(id, |_, _| false)
    }

    /// `textContent` with whole subtrees skipped when `skip` returns true for
    /// their root element.
    pub fn text_content_excluding<F>(&self, id: NodeId, skip: F) -> String
    where
        F: Fn(&Document, NodeId) -> bool,
    {
        let mut out = String::new();
        if let Some(NodeKind::Text(t)) = self.nodes.get(id).map(|n| &n.kind) {
            out.push_str(t);
            return out;
        }
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(n) = stack.pop() {
            match self.nodes.get(n).map(|node| &node.kind) {
                Some(NodeKind::Text(t)) => out.push_str(t),
                Some(NodeKind::Element(_)) if !skip(self, n) => {
                    stack.extend(self.children(n).iter().rev().copied());
                }
                _ => {}
            }
        }
        out
    }

    // -- instrumentation ------------------------------------------------------

    /// Number of element queries served since the document was created.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::Relaxed)
    }

    pub(crate) fn record_query(&self) {
        self.queries.fetch_add(1, Ordering::Relaxed);
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.nodes.len())
            .field("listeners", &self.listeners.len())
            .field("dispatched", &self.dispatched.len())
            .finish()
    }
}

pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.doc.parent(current);
        Some(current)
    }
}

pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(current).iter().rev().copied());
        Some(current)
    }
}

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
