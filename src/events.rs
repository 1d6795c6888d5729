//! Typed, priority-ordered event bus.
//!
//! Every emitter in the crate (the application, each panel instance) embeds an
//! [`EventBus`] parameterised over its own event enum. Handlers are keyed by
//! the event's [`BusEvent::Kind`], so a subscription names exactly one variant
//! and receives the full typed payload.
//!
//! Within one kind, handlers run in registration order; [`Priority::High`]
//! handlers run before every [`Priority::Normal`] handler. A handler that
//! returns an error or panics is logged and skipped over, and the remaining
//! handlers of the same emission still run.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

/// An event payload that can travel over an [`EventBus`].
pub trait BusEvent: 'static {
    /// Discriminant used as the subscription key.
    type Kind: Copy + Eq + Hash + Debug + 'static;

    fn kind(&self) -> Self::Kind;
}

/// Shared handler signature.
pub type Handler<E> = Rc<dyn Fn(&E) -> anyhow::Result<()>>;

/// Placement of a new handler relative to the existing ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Priority {
    #[default]
    Normal,
    /// Runs ahead of all normal handlers, after earlier high-priority ones.
    High,
}

/// Token returned by every subscription, used to remove exactly that handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Outcome of a single [`EventBus::emit`] call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EmitReport {
    /// Handlers that were called.
    pub invoked: usize,
    /// Handlers that returned an error or panicked.
    pub failed: usize,
}

struct Listener<E> {
    id: ListenerId,
    priority: Priority,
    once: bool,
    handler: Handler<E>,
}

impl<E> Clone for Listener<E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            priority: self.priority,
            once: self.once,
            handler: Rc::clone(&self.handler),
        }
    }
}

pub struct EventBus<E: BusEvent> {
    label: &'static str,
    listeners: RefCell<HashMap<E::Kind, Vec<Listener<E>>>>,
    next_id: Cell<u64>,
}

impl<E: BusEvent> EventBus<E> {
    /// Create an empty bus. `label` only shows up in log lines.
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            listeners: RefCell::new(HashMap::new()),
            next_id: Cell::new(1),
        }
    }

    pub fn on<F>(&self, kind: E::Kind, handler: F) -> ListenerId
    where
        F: Fn(&E) -> anyhow::Result<()> + 'static,
    {
        self.subscribe(kind, Priority::Normal, false, Rc::new(handler))
    }

    pub fn on_with_priority<F>(&self, kind: E::Kind, priority: Priority, handler: F) -> ListenerId
    where
        F: Fn(&E) -> anyhow::Result<()> + 'static,
    {
        self.subscribe(kind, priority, false, Rc::new(handler))
    }

    /// Subscribe a handler that is removed right before its first invocation.
    pub fn once<F>(&self, kind: E::Kind, handler: F) -> ListenerId
    where
        F: Fn(&E) -> anyhow::Result<()> + 'static,
    {
        self.subscribe(kind, Priority::Normal, true, Rc::new(handler))
    }

    /// Register an already shared handler.
    pub fn on_shared(&self, kind: E::Kind, priority: Priority, handler: Handler<E>) -> ListenerId {
        self.subscribe(kind, priority, false, handler)
    }

    fn subscribe(&self, kind: E::Kind, priority: Priority, once: bool, handler: Handler<E>) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        let listener = Listener {
            id,
            priority,
            once,
            handler,
        };
        let mut listeners = self.listeners.borrow_mut();
        let list = listeners.entry(kind).or_default();
        match priority {
            Priority::Normal => list.push(listener),
            Priority::High => {
                let at = list.iter().take_while(|l| l.priority == Priority::High).count();
                list.insert(at, listener);
            }
        }
        id
    }

    /// Remove one handler, or every handler of `kind` when `id` is `None`.
    ///
    /// Returns how many handlers were removed.
    pub fn off(&self, kind: E::Kind, id: Option<ListenerId>) -> usize {
        let mut listeners = self.listeners.borrow_mut();
        match id {
            None => listeners.remove(&kind).map(|list| list.len()).unwrap_or(0),
            Some(id) => {
                let Some(list) = listeners.get_mut(&kind) else {
                    return 0;
                };
                let before = list.len();
                list.retain(|l| l.id != id);
                let removed = before - list.len();
                if list.is_empty() {
                    listeners.remove(&kind);
                }
                removed
            }
        }
    }

    /// Deliver `event` to every handler subscribed to its kind.
    ///
    /// The handler list is snapshotted before the first call, so handlers may
    /// subscribe, unsubscribe or emit re-entrantly. Changes take effect from the
    /// next emission.
    pub fn emit(&self, event: &E) -> EmitReport {
        let kind = event.kind();
        let snapshot: Vec<Listener<E>> = {
            let mut listeners = self.listeners.borrow_mut();
            let Some(list) = listeners.get_mut(&kind) else {
                return EmitReport::default();
            };
            let snapshot = list.clone();
            list.retain(|l| !l.once);
            if list.is_empty() {
                listeners.remove(&kind);
            }
            snapshot
        };

        let mut report = EmitReport::default();
        for listener in snapshot {
            report.invoked += 1;
            match catch_unwind(AssertUnwindSafe(|| (listener.handler)(event))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    report.failed += 1;
                    log::warn!("{}: handler {:?} for {:?} failed: {:#}", self.label, listener.id, kind, e);
                }
                Err(_) => {
                    report.failed += 1;
                    log::error!("{}: handler {:?} for {:?} panicked", self.label, listener.id, kind);
                }
            }
        }
        report
    }

    pub fn listener_count(&self, kind: E::Kind) -> usize {
        self.listeners.borrow().get(&kind).map(Vec::len).unwrap_or(0)
    }

    /// Drop every handler of every kind.
    pub fn clear(&self) {
        self.listeners.borrow_mut().clear();
    }
}

impl<E: BusEvent> Default for EventBus<E> {
    fn default() -> Self {
        Self::new("events")
    }
}
