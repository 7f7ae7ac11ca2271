use crate::dom::node::Document;
use crate::dom::query::{fillable_controls, input_type};

/// SHA-1 over the shape of the fillable-control selection.
///
/// Two documents with the same fingerprint resolve every `field-<n>` id to
/// the same kind of element. Values and checked state are not part of it.
pub fn selection_fingerprint(doc: &Document) -> String {
    use sha1::{Digest, Sha1};

    let mut hasher = Sha1::new();
    for control in fillable_controls(doc) {
        let tag = doc.tag_name(control).unwrap_or_default();
        let kind = if tag == "input" {
            input_type(doc, control)
        } else {
            String::new()
        };
        let line = format!(
            "{}|{}|{}|{}\n",
            tag,
            kind,
            doc.attr(control, "id").unwrap_or_default(),
            doc.attr(control, "name").unwrap_or_default()
        );
        hasher.update(line.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}
