use tracing::{debug, trace};

use crate::dom::events::EventKind;
use crate::dom::node::{Document, NodeId};
use crate::dom::query::{element_by_id, fillable_controls, first_element_by_name, input_type};
use crate::form::field_model::{FieldValue, GeneratedValues};

/// How a resolved element takes a value. Decided once per element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    TextInput,
    /// checkbox or radio
    CheckInput,
    Select,
    TextArea,
}

impl ControlKind {
    /// `None` for elements that are not form controls.
    pub fn of(doc: &Document, id: NodeId) -> Option<Self> {
        match doc.tag_name(id)? {
            "input" => match input_type(doc, id).as_str() {
                "checkbox" | "radio" => Some(ControlKind::CheckInput),
                _ => Some(ControlKind::TextInput),
            },
            "select" => Some(ControlKind::Select),
            "textarea" => Some(ControlKind::TextArea),
            _ => None,
        }
    }
}

/// Outcome of a write-back pass. Informational only: the pass never fails.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
    /// Ids that resolved to an element.
    pub applied: Vec<String>,
    /// Ids that matched nothing and were left alone.
    pub skipped: Vec<String>,
}

/// Write generated values into the document.
///
/// Each id resolves by DOM id, then by `name`, then (for `field-<n>`) by
/// position among the fillable controls. Every resolved element receives a
/// bubbling `input` event followed by a bubbling `change` event.
pub fn apply_values(doc: &mut Document, values: &GeneratedValues) -> WriteReport {
    let mut report = WriteReport::default();

    for (field_id, value) in values.iter() {
        let Some(target) = resolve_target(doc, field_id) else {
            debug!(field_id, "no element for generated value, skipping");
            report.skipped.push(field_id.to_string());
            continue;
        };

        match ControlKind::of(doc, target) {
            Some(kind) => assign(doc, target, kind, value),
            None => trace!(field_id, "resolved element is not a form control"),
        }

        doc.dispatch_event(target, EventKind::Input, true);
        doc.dispatch_event(target, EventKind::Change, true);
        report.applied.push(field_id.to_string());
    }

    debug!(
        applied = report.applied.len(),
        skipped = report.skipped.len(),
        "applied generated values"
    );
    report
}

/// Find the live element a generated id refers to.
pub fn resolve_target(doc: &Document, field_id: &str) -> Option<NodeId> {
    if let Some(node) = element_by_id(doc, field_id) {
        return Some(node);
    }
    if let Some(node) = first_element_by_name(doc, field_id) {
        return Some(node);
    }
    let position = positional_index(field_id)?;
    fillable_controls(doc).get(position).copied()
}

/// `n` for ids of the exact form `field-<n>`.
pub fn positional_index(field_id: &str) -> Option<usize> {
    let digits = field_id.strip_prefix("field-")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn assign(doc: &mut Document, target: NodeId, kind: ControlKind, value: &FieldValue) {
    match kind {
        ControlKind::CheckInput => {
            let checked = match value.as_checked() {
                Some(state) => state,
                None => doc.value(target) == value.as_text(),
            };
            doc.set_checked(target, checked);
        }
        ControlKind::TextInput | ControlKind::Select | ControlKind::TextArea => {
            doc.set_value(target, &value.as_text());
        }
    }
}
