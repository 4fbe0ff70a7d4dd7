//! Event channel
//!
//! Publish/subscribe surface external code observes a controller through.
//! Listeners are keyed by [`EventName`] and invoked synchronously, in
//! registration order, on the thread that emits.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use loadmore_dom::NodeId;

use crate::LoadError;

/// Names of the events a controller emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventName {
    /// A fetch cycle is starting
    LoadStart,
    /// A fragment was parsed into nodes
    PostsParsed,
    /// One node was appended to the container
    PostAppend,
    /// No more content; the trigger is gone
    PostsEnd,
    /// A fetch cycle is complete, whatever its outcome
    LoadFinish,
    /// A fetch cycle failed
    LoadError,
}

impl EventName {
    pub const ALL: [EventName; 6] = [
        EventName::LoadStart,
        EventName::PostsParsed,
        EventName::PostAppend,
        EventName::PostsEnd,
        EventName::LoadFinish,
        EventName::LoadError,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::LoadStart => "load:start",
            EventName::PostsParsed => "posts:parsed",
            EventName::PostAppend => "post:append",
            EventName::PostsEnd => "posts:end",
            EventName::LoadFinish => "load:finish",
            EventName::LoadError => "load:error",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventName {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| LoadError::UnknownEvent(s.to_string()))
    }
}

/// An emitted event and its payload
#[derive(Debug, Clone, Copy)]
pub enum LoadMoreEvent<'a> {
    LoadStart,
    PostsParsed { posts: &'a [NodeId] },
    PostAppend { post: NodeId },
    PostsEnd,
    LoadFinish,
    LoadError { error: &'a LoadError },
}

impl LoadMoreEvent<'_> {
    pub fn name(&self) -> EventName {
        match self {
            LoadMoreEvent::LoadStart => EventName::LoadStart,
            LoadMoreEvent::PostsParsed { .. } => EventName::PostsParsed,
            LoadMoreEvent::PostAppend { .. } => EventName::PostAppend,
            LoadMoreEvent::PostsEnd => EventName::PostsEnd,
            LoadMoreEvent::LoadFinish => EventName::LoadFinish,
            LoadMoreEvent::LoadError { .. } => EventName::LoadError,
        }
    }
}

/// Handle for removing a subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Rc<dyn Fn(&LoadMoreEvent<'_>)>;

struct Registration {
    id: SubscriptionId,
    once: bool,
    callback: Callback,
}

/// Listener registry keyed by event name
#[derive(Default)]
pub struct EventChannel {
    next_id: Cell<u64>,
    listeners: RefCell<HashMap<EventName, Vec<Registration>>>,
}

impl EventChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to every future `name` event
    pub fn on<L>(&self, name: EventName, listener: L) -> SubscriptionId
    where
        L: Fn(&LoadMoreEvent<'_>) + 'static,
    {
        self.register(name, false, Rc::new(listener))
    }

    /// Subscribe to the next `name` event only
    pub fn once<L>(&self, name: EventName, listener: L) -> SubscriptionId
    where
        L: Fn(&LoadMoreEvent<'_>) + 'static,
    {
        self.register(name, true, Rc::new(listener))
    }

    /// Remove a subscription; returns false if it was already gone
    pub fn off(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        for registrations in listeners.values_mut() {
            if let Some(pos) = registrations.iter().position(|r| r.id == id) {
                registrations.remove(pos);
                return true;
            }
        }
        false
    }

    pub fn listener_count(&self, name: EventName) -> usize {
        self.listeners.borrow().get(&name).map_or(0, Vec::len)
    }

    /// Invoke the listeners of `event`'s name and return how many ran.
    ///
    /// The registry is not borrowed while listeners run, so they may
    /// subscribe or unsubscribe; such changes apply from the next emit.
    pub fn emit(&self, event: &LoadMoreEvent<'_>) -> usize {
        let name = event.name();
        let callbacks: Vec<Callback> = {
            let mut listeners = self.listeners.borrow_mut();
            let Some(registrations) = listeners.get_mut(&name) else {
                return 0;
            };
            let callbacks = registrations.iter().map(|r| Rc::clone(&r.callback)).collect();
            registrations.retain(|r| !r.once);
            callbacks
        };

        tracing::trace!("emit {} to {} listener(s)", name, callbacks.len());
        for callback in &callbacks {
            callback(event);
        }
        callbacks.len()
    }

    fn register(&self, name: EventName, once: bool, callback: Callback) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners
            .borrow_mut()
            .entry(name)
            .or_default()
            .push(Registration { id, once, callback });
        id
    }
}

impl fmt::Debug for EventChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<&str, usize> = self
            .listeners
            .borrow()
            .iter()
            .map(|(name, regs)| (name.as_str(), regs.len()))
            .collect();
        f.debug_struct("EventChannel").field("listeners", &counts).finish()
    }
}
