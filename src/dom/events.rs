use std::fmt;

use crate::dom::node::{Document, NodeId};

/// Event types the fill engine dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Input,
    Change,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Input => "input",
            EventKind::Change => "change",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dispatched event as seen by one listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomEvent {
    pub kind: EventKind,
    pub target: NodeId,
    /// Node whose listener is being invoked; equals `target` in the log.
    pub current_target: NodeId,
    pub bubbles: bool,
}

pub type ListenerFn = Box<dyn FnMut(&DomEvent) + Send>;

pub(crate) struct Listener {
    node: NodeId,
    kind: EventKind,
    callback: ListenerFn,
}

impl Document {
    /// Register a listener on `node` for events of `kind`. Bubbling events
    /// dispatched on descendants reach it too.
    pub fn add_event_listener<F>(&mut self, node: NodeId, kind: EventKind, callback: F)
    where
        F: FnMut(&DomEvent) + Send + 'static,
    {
        self.listeners.push(Listener {
            node,
            kind,
            callback: Box::new(callback),
        });
    }

    /// Dispatch a synthetic event: target phase first, then every ancestor up
    /// to the document root when `bubbles` is set.
    pub fn dispatch_event(&mut self, target: NodeId, kind: EventKind, bubbles: bool) {
        let mut path = vec![target];
        if bubbles {
            path.extend(self.ancestors(target));
        }

        for current in path {
            let event = DomEvent {
                kind,
                target,
                current_target: current,
                bubbles,
            };
            for listener in self
                .listeners
                .iter_mut()
                .filter(|l| l.node == current && l.kind == kind)
            {
                (listener.callback)(&event);
            }
        }

        self.dispatched.push(DomEvent {
            kind,
            target,
            current_target: target,
            bubbles,
        });
    }

    /// Every event dispatched so far, in dispatch order.
    pub fn dispatched_events(&self) -> &[DomEvent] {
        &self.dispatched
    }

    pub fn take_dispatched_events(&mut self) -> Vec<DomEvent> {
        std::mem::take(&mut self.dispatched)
    }
}
