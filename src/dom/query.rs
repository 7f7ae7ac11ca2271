use crate::dom::node::{Document, NodeId};

/// `<input>` types excluded from the fillable-control selection.
const NON_FILLABLE_INPUT_TYPES: &[&str] = &["hidden", "submit", "button", "reset"];

/// Input types a browser recognizes; anything else reads back as "text".
const KNOWN_INPUT_TYPES: &[&str] = &[
    "button",
    "checkbox",
    "color",
    "date",
    "datetime-local",
    "email",
    "file",
    "hidden",
    "image",
    "month",
    "number",
    "password",
    "radio",
    "range",
    "reset",
    "search",
    "submit",
    "tel",
    "text",
    "time",
    "url",
    "week",
];

// ============================================================================
// Element predicates
// ============================================================================

/// True for `<input>` (except hidden/submit/button/reset), `<select>` and
/// `<textarea>`.
///
/// Extraction and write-back must both go through this predicate, otherwise
/// positional `field-<n>` ids point at different elements.
pub fn is_fillable_control(doc: &Document, id: NodeId) -> bool {
    match doc.tag_name(id) {
        Some("input") => match doc.attr(id, "type") {
            Some(t) => !NON_FILLABLE_INPUT_TYPES
                .iter()
                .any(|excluded| t.eq_ignore_ascii_case(excluded)),
            None => true,
        },
        Some("select") | Some("textarea") => true,
        _ => false,
    }
}

/// Browser-normalized `type` of an `<input>`: lower-cased, defaulting to
/// "text" when missing or unknown.
pub fn input_type(doc: &Document, id: NodeId) -> String {
    doc.attr(id, "type")
        .map(|t| t.trim().to_ascii_lowercase())
        .filter(|t| KNOWN_INPUT_TYPES.contains(&t.as_str()))
        .unwrap_or_else(|| "text".to_string())
}

pub fn is_checkable_input(doc: &Document, id: NodeId) -> bool {
    doc.is_element(id, "input") && matches!(input_type(doc, id).as_str(), "checkbox" | "radio")
}

// ============================================================================
// Queries
// ============================================================================

/// All fillable controls in document order.
pub fn fillable_controls(doc: &Document) -> Vec<NodeId> {
    doc.record_query();
    doc.descendants(doc.root())
        .filter(|&n| is_fillable_control(doc, n))
        .collect()
}

/// `document.getElementById`.
pub fn element_by_id(doc: &Document, id: &str) -> Option<NodeId> {
    doc.record_query();
    if id.is_empty() {
        return None;
    }
    doc.descendants(doc.root())
        .find(|&n| doc.attr(n, "id") == Some(id))
}

/// First element carrying `name="<name>"`, in document order.
pub fn first_element_by_name(doc: &Document, name: &str) -> Option<NodeId> {
    doc.record_query();
    doc.descendants(doc.root())
        .find(|&n| doc.attr(n, "name") == Some(name))
}

/// First `<label for="<id>">` in the document.
pub fn label_for(doc: &Document, id: &str) -> Option<NodeId> {
    doc.record_query();
    doc.descendant_elements(doc.root(), "label")
        .find(|&n| doc.attr(n, "for") == Some(id))
}

/// First descendant of `scope` that is one of `names`, in document order.
pub fn first_descendant_of(doc: &Document, scope: NodeId, names: &[&str]) -> Option<NodeId> {
    doc.record_query();
    doc.descendants(scope)
        .find(|&n| doc.tag_name(n).is_some_and(|t| names.contains(&t)))
}

/// The `<form>` an element belongs to: the nearest ancestor form.
pub fn form_owner(doc: &Document, id: NodeId) -> Option<NodeId> {
    doc.closest_ancestor(id, "form")
}
