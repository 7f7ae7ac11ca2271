use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use mock_pilot::dom::{Document, EventKind, NodeId};
use mock_pilot::dom::query::element_by_id;

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn load_fixture(name: &str) -> Document {
    let html = std::fs::read_to_string(fixture_path(name)).expect("fixture should exist");
    Document::parse(&html)
}

pub fn by_id(doc: &Document, id: &str) -> NodeId {
    element_by_id(doc, id).unwrap_or_else(|| panic!("no element with id '{}'", id))
}

/// Record `input`/`change` events seen by a listener on `node` as
/// `"<kind>@<target>"` strings.
pub fn listen(doc: &mut Document, node: NodeId) -> Arc<Mutex<Vec<String>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    for kind in [EventKind::Input, EventKind::Change] {
        let sink = Arc::clone(&seen);
        doc.add_event_listener(node, kind, move |event| {
            sink.lock()
                .unwrap()
                .push(format!("{}@{}", event.kind, event.target));
        });
    }
    seen
}
