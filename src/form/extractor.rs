use tracing::debug;

use crate::dom::node::{Document, NodeId, normalize_whitespace};
use crate::dom::query::{fillable_controls, input_type, label_for};
use crate::form::context::context_breadcrumb;
use crate::form::field_model::FieldDescriptor;

/// Controls whose own text must not leak into an enclosing label.
const NESTED_CONTROL_TAGS: &[&str] = &["input", "select", "textarea"];

/// Describe every fillable control of the document, in document order.
///
/// Read-only. Position `i` of the result corresponds to `field-<i>` in the
/// write-back's positional fallback.
pub fn extract_fields(doc: &Document) -> Vec<FieldDescriptor> {
    let fields: Vec<FieldDescriptor> = fillable_controls(doc)
        .into_iter()
        .enumerate()
        .map(|(position, control)| describe_control(doc, control, position))
        .collect();

    debug!(count = fields.len(), "extracted form fields");
    fields
}

/// Build the descriptor for one control at `position` in the selection.
pub fn describe_control(doc: &Document, control: NodeId, position: usize) -> FieldDescriptor {
    let dom_id = doc.non_empty_attr(control, "id");
    let name_attr = doc.non_empty_attr(control, "name");
    let tag = doc.tag_name(control).unwrap_or_default();
    let is_input = tag == "input";

    let id = dom_id
        .or(name_attr)
        .map(str::to_string)
        .unwrap_or_else(|| synthetic_id(position));
    let name = name_attr.or(dom_id).unwrap_or_default().to_string();
    let field_type = if is_input {
        input_type(doc, control)
    } else {
        tag.to_ascii_lowercase()
    };

    let mut field = FieldDescriptor::new(id, name, field_type);
    field.label = resolve_label(doc, control);

    if matches!(tag, "input" | "textarea") {
        field.placeholder = doc.non_empty_attr(control, "placeholder").map(str::to_string);
    }

    field.tooltip = resolve_tooltip(doc, control);
    field.required = Some(doc.has_attr(control, "required"));

    if is_input {
        field.pattern = doc.non_empty_attr(control, "pattern").map(str::to_string);
    }

    if tag == "select" {
        let options = doc.select_options(control);
        field.options = Some(options.iter().map(|&opt| doc.option_text(opt)).collect());
        field.option_values = Some(options.iter().map(|&opt| doc.option_value(opt)).collect());
    }

    field.context = context_breadcrumb(doc, control);
    field
}

/// `field-<position>`, the id given to controls with neither id nor name.
pub fn synthetic_id(position: usize) -> String {
    format!("field-{}", position)
}

/// A control with an id is labelled only by `<label for=id>`. Controls
/// without an id take the nearest enclosing `<label>`, with nested controls'
/// text left out.
pub fn resolve_label(doc: &Document, control: NodeId) -> Option<String> {
    if let Some(id) = doc.non_empty_attr(control, "id") {
        return label_for(doc, id).map(|label| normalize_whitespace(&doc.text_content(label)));
    }

    let label = doc.closest_ancestor(control, "label")?;
    let text = doc.text_content_excluding(label, |d, n| {
        d.tag_name(n)
            .is_some_and(|t| NESTED_CONTROL_TAGS.contains(&t))
    });
    Some(normalize_whitespace(&text))
}

/// `title` when non-empty, otherwise `aria-description` when present (even
/// if empty).
pub fn resolve_tooltip(doc: &Document, control: NodeId) -> Option<String> {
    doc.non_empty_attr(control, "title")
        .or_else(|| doc.attr(control, "aria-description"))
        .map(str::to_string)
}
