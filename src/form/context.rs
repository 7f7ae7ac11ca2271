use crate::dom::node::{Document, NodeId, normalize_whitespace};
use crate::dom::query::first_descendant_of;

const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

pub const CONTEXT_SEPARATOR: &str = " > ";

/// Heading-like text around a control, outermost first.
///
/// Walks from the control's parent up to (not including) `<body>`. At every
/// ancestor it looks for the first descendant `h1`-`h6`, the ancestor itself
/// when it has `role="heading"`, and the first descendant `<legend>`. Found
/// texts are pushed to the front, so the outermost context ends up first.
///
/// Headings in sibling subtrees under a shared ancestor are picked up too.
pub fn nearby_headings(doc: &Document, control: NodeId) -> Vec<String> {
    let mut headings: Vec<String> = Vec::new();
    let body = doc.body();

    for ancestor in doc.ancestors(control) {
        if Some(ancestor) == body || doc.element(ancestor).is_none() {
            break;
        }

        if let Some(heading) = first_descendant_of(doc, ancestor, HEADING_TAGS) {
            push_front_text(doc, heading, &mut headings);
        }

        if doc.attr(ancestor, "role") == Some("heading") {
            push_front_text(doc, ancestor, &mut headings);
        }

        if let Some(legend) = first_descendant_of(doc, ancestor, &["legend"]) {
            push_front_text(doc, legend, &mut headings);
        }
    }

    headings
}

/// Breadcrumb string for a control, `None` when no heading was found.
pub fn context_breadcrumb(doc: &Document, control: NodeId) -> Option<String> {
    let headings = nearby_headings(doc, control);
    if headings.is_empty() {
        None
    } else {
        Some(headings.join(CONTEXT_SEPARATOR))
    }
}

fn push_front_text(doc: &Document, node: NodeId, headings: &mut Vec<String>) {
    let text = normalize_whitespace(&doc.text_content(node));
    if !text.is_empty() {
        headings.insert(0, text);
    }
}
