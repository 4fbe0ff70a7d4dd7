//! DOM Events
//!
//! Per-node listener registry and a dispatcher that walks the target's
//! ancestor chain for bubbling events.

use std::collections::HashMap;
use std::rc::Rc;

use crate::{NodeId, SharedDocument};

/// DOM event types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Click,
    Focus,
    Blur,
}

impl EventType {
    /// Check if this event type bubbles
    pub fn bubbles(&self) -> bool {
        matches!(self, EventType::Click)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Click => "click",
            EventType::Focus => "focus",
            EventType::Blur => "blur",
        }
    }
}

/// DOM event
#[derive(Debug, Clone)]
pub struct DomEvent {
    pub event_type: EventType,
    pub target: NodeId,
    pub current_target: Option<NodeId>,
    pub bubbles: bool,
    pub cancelable: bool,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl DomEvent {
    /// Create an event of the given type aimed at `target`
    pub fn new(event_type: EventType, target: NodeId) -> Self {
        Self {
            event_type,
            target,
            current_target: None,
            bubbles: event_type.bubbles(),
            cancelable: event_type == EventType::Click,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    /// Create a click event
    pub fn click(target: NodeId) -> Self {
        Self::new(EventType::Click, target)
    }

    /// Create a blur event
    pub fn blur(target: NodeId) -> Self {
        Self::new(EventType::Blur, target)
    }

    /// Prevent default action
    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    /// Stop propagation to further ancestors
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Event listener callback
pub type Listener = Rc<dyn Fn(&mut DomEvent)>;

/// Handle returned by [`EventListeners::add`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Listeners keyed by target node and event type
#[derive(Default)]
pub struct EventListeners {
    next_id: u64,
    entries: HashMap<(NodeId, EventType), Vec<(ListenerId, Listener)>>,
}

impl EventListeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; listeners run in registration order
    pub fn add(&mut self, target: NodeId, event_type: EventType, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.entry((target, event_type)).or_default().push((id, listener));
        tracing::trace!("listener {:?} added for {} on {}", id, event_type.as_str(), target);
        id
    }

    /// Remove a listener by handle
    pub fn remove(&mut self, id: ListenerId) -> bool {
        for listeners in self.entries.values_mut() {
            if let Some(pos) = listeners.iter().position(|(lid, _)| *lid == id) {
                listeners.remove(pos);
                return true;
            }
        }
        false
    }

    /// Snapshot of the listeners for a target/type pair
    pub fn get(&self, target: NodeId, event_type: EventType) -> Vec<Listener> {
        self.entries
            .get(&(target, event_type))
            .map(|ls| ls.iter().map(|(_, l)| Rc::clone(l)).collect())
            .unwrap_or_default()
    }

    /// Number of listeners for a target/type pair
    pub fn count(&self, target: NodeId, event_type: EventType) -> usize {
        self.entries.get(&(target, event_type)).map_or(0, Vec::len)
    }
}

impl std::fmt::Debug for EventListeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventListeners")
            .field("targets", &self.entries.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

/// Dispatch an event through the document.
///
/// The listener snapshot is taken before any listener runs and the document
/// is not borrowed while they run, so listeners may freely mutate it.
/// Returns false if a listener called `prevent_default`.
pub fn dispatch_event(document: &SharedDocument, mut event: DomEvent) -> bool {
    let path: Vec<(NodeId, Vec<Listener>)> = {
        let doc = document.borrow();
        let mut nodes = vec![event.target];
        if event.bubbles {
            let mut current = doc.tree().parent(event.target);
            while let Some(parent) = current {
                nodes.push(parent);
                current = doc.tree().parent(parent);
            }
        }
        nodes
            .into_iter()
            .map(|node| (node, doc.listeners().get(node, event.event_type)))
            .collect()
    };

    tracing::debug!("dispatching {} to {}", event.event_type.as_str(), event.target);

    for (node, listeners) in path {
        event.current_target = Some(node);
        for listener in listeners {
            listener(&mut event);
        }
        if event.propagation_stopped {
            break;
        }
    }

    !event.default_prevented
}
