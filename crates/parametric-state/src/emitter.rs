//! Synchronous typed pub/sub.
//!
//! Subscribers register per event kind and are called in registration
//! order on the emitting thread. A panicking handler is isolated: the panic
//! is logged and the remaining handlers still run.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::{Receiver, Sender};
use parametric_model::{EventKind, StateEvent};
use parking_lot::RwLock;

/// An event type that can be routed by kind.
pub trait Event: Clone + Send + Sync + 'static {
    type Kind: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static;

    fn kind(&self) -> Self::Kind;
}

impl Event for StateEvent {
    type Kind = EventKind;

    fn kind(&self) -> EventKind {
        StateEvent::kind(self)
    }
}

/// Token returned by [`EventEmitter::on`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

type Handler<E> = Arc<dyn Fn(&E) + Send + Sync>;

enum Subscriber<E> {
    Callback(Handler<E>),
    Channel(Sender<E>),
}

impl<E> Clone for Subscriber<E> {
    fn clone(&self) -> Self {
        match self {
            Self::Callback(handler) => Self::Callback(Arc::clone(handler)),
            Self::Channel(sender) => Self::Channel(sender.clone()),
        }
    }
}

pub struct EventEmitter<E: Event> {
    subscribers: RwLock<HashMap<E::Kind, Vec<(HandlerId, Subscriber<E>)>>>,
    next_id: AtomicU64,
}

impl<E: Event> Default for EventEmitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Event> fmt::Debug for EventEmitter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<E::Kind, usize> = self
            .subscribers
            .read()
            .iter()
            .map(|(kind, subs)| (*kind, subs.len()))
            .collect();
        f.debug_struct("EventEmitter")
            .field("subscribers", &counts)
            .finish()
    }
}

impl<E: Event> EventEmitter<E> {
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn subscribe(&self, kind: E::Kind, subscriber: Subscriber<E>) -> HandlerId {
        let id = HandlerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers
            .write()
            .entry(kind)
            .or_default()
            .push((id, subscriber));
        id
    }

    /// Register `handler` for events of `kind`.
    pub fn on<F>(&self, kind: E::Kind, handler: F) -> HandlerId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.subscribe(kind, Subscriber::Callback(Arc::new(handler)))
    }

    /// Deliver events of `kind` into an unbounded channel.
    ///
    /// The subscription is dropped automatically once the receiver is gone.
    pub fn channel(&self, kind: E::Kind) -> (HandlerId, Receiver<E>) {
        let (sender, receiver) = crossbeam_channel::unbounded();
        (self.subscribe(kind, Subscriber::Channel(sender)), receiver)
    }

    /// Remove a subscription. Returns whether it existed.
    pub fn off(&self, kind: E::Kind, id: HandlerId) -> bool {
        let mut subscribers = self.subscribers.write();
        let Some(list) = subscribers.get_mut(&kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|(existing, _)| *existing != id);
        before != list.len()
    }

    /// Call every subscriber of `event.kind()` in registration order.
    ///
    /// Handlers run without any emitter lock held, so they may subscribe,
    /// unsubscribe or emit. Returns how many subscribers completed normally.
    pub fn emit(&self, event: &E) -> usize {
        let kind = event.kind();
        let subscribers = match self.subscribers.read().get(&kind) {
            Some(list) => list.clone(),
            None => return 0,
        };

        let mut delivered = 0;
        let mut disconnected = Vec::new();
        for (id, subscriber) in &subscribers {
            match subscriber {
                Subscriber::Callback(handler) => {
                    match catch_unwind(AssertUnwindSafe(|| handler(event))) {
                        Ok(()) => delivered += 1,
                        Err(payload) => tracing::error!(
                            event = ?kind,
                            handler = id.0,
                            "Event handler panicked: {}",
                            panic_message(payload.as_ref())
                        ),
                    }
                }
                Subscriber::Channel(sender) => {
                    if sender.send(event.clone()).is_ok() {
                        delivered += 1;
                    } else {
                        disconnected.push(*id);
                    }
                }
            }
        }

        if !disconnected.is_empty() {
            tracing::debug!(event = ?kind, count = disconnected.len(), "Pruning closed channels");
            for id in disconnected {
                self.off(kind, id);
            }
        }
        delivered
    }

    pub fn handler_count(&self, kind: E::Kind) -> usize {
        self.subscribers.read().get(&kind).map_or(0, Vec::len)
    }

    /// Drop every subscription.
    pub fn clear(&self) {
        self.subscribers.write().clear();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}
