//! Publish/subscribe event bus
//!
//! The registry maps `event -> subscriber -> handler name -> handler`.
//! Subscribing the same `(event, subscriber, name)` twice replaces the earlier
//! handler. Broadcast order follows registration order and is stable between
//! calls.
//!
//! Handlers run on the thread that calls [`EventBus::emit`]. The handler list
//! is snapshotted before the first handler runs, so handlers may subscribe or
//! unsubscribe freely; such changes are visible from the next `emit` on.
//!
//! # Example
//!
//! ```rust
//! use pact_core::{Event, EventBus, EventId, NamedHandler, SubscriberId};
//!
//! let bus = EventBus::new();
//! let printer = SubscriberId::next();
//!
//! bus.subscribe(
//!     EventId::TEST_MESSAGE,
//!     printer,
//!     NamedHandler::new("print_it", |event| {
//!         if let Event::Message(text) = event {
//!             println!("{text}, for sure!");
//!         }
//!         Ok(())
//!     }),
//! );
//!
//! bus.emit(&EventId::TEST_MESSAGE, &Event::Message("hellothere!".into()))
//!     .unwrap();
//! ```

use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use rustc_hash::FxBuildHasher;
use smallvec::SmallVec;
use tracing::{debug, info, trace};

use crate::error::{EventError, Result};
use crate::events::{Event, EventId};

/// Diagnostics target for bus activity
pub const EVENTS_TARGET: &str = "pact_core::events";
/// Diagnostics target for the per-tick held-keys broadcast
pub const KEYS_TARGET: &str = "pact_core::events::keys";

/// Error type returned by handlers and trigger callbacks
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

pub type HandlerResult = std::result::Result<(), HandlerError>;

/// Event handler function type
pub type Handler = Arc<dyn Fn(&Event) -> HandlerResult + Send + Sync>;

static NEXT_SUBSCRIBER: AtomicU64 = AtomicU64::new(1);

/// Identity of a subscribing instance.
///
/// Allocate one per instance with [`SubscriberId::next`] and keep it for the
/// lifetime of its subscriptions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

impl SubscriberId {
    pub fn next() -> Self {
        Self(NEXT_SUBSCRIBER.fetch_add(1, Ordering::Relaxed))
    }

    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A handler together with the name it is registered under
#[derive(Clone)]
pub struct NamedHandler {
    name: Cow<'static, str>,
    handler: Handler,
}

impl NamedHandler {
    pub fn new<F>(name: impl Into<Cow<'static, str>>, handler: F) -> Self
    where
        F: Fn(&Event) -> HandlerResult + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            handler: Arc::new(handler),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, event: &Event) -> HandlerResult {
        (self.handler)(event)
    }
}

impl fmt::Debug for NamedHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedHandler")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// One handler or a list of handlers for a single event
#[derive(Clone, Debug)]
pub enum Handlers {
    One(NamedHandler),
    Many(Vec<NamedHandler>),
}

impl Handlers {
    fn into_vec(self) -> Vec<NamedHandler> {
        match self {
            Handlers::One(handler) => vec![handler],
            Handlers::Many(handlers) => handlers,
        }
    }
}

impl From<NamedHandler> for Handlers {
    fn from(handler: NamedHandler) -> Self {
        Handlers::One(handler)
    }
}

impl From<Vec<NamedHandler>> for Handlers {
    fn from(handlers: Vec<NamedHandler>) -> Self {
        Handlers::Many(handlers)
    }
}

/// Declarative handler table: event -> handler(s)
pub type HandlerMap = Vec<(EventId, Handlers)>;

/// An instance with a fixed table of event handlers.
///
/// Handlers usually capture a `Weak<Self>` so the bus does not keep the
/// instance alive.
pub trait Subscriber: Send + Sync + 'static {
    fn subscriber_id(&self) -> SubscriberId;

    fn event_handlers(self: &Arc<Self>) -> HandlerMap;
}

type InstanceHandlers = IndexMap<Cow<'static, str>, Handler, FxBuildHasher>;
type EventSubscribers = IndexMap<SubscriberId, InstanceHandlers, FxBuildHasher>;
type Registry = IndexMap<EventId, EventSubscribers, FxBuildHasher>;

type Snapshot = SmallVec<[(SubscriberId, Cow<'static, str>, Handler); 8]>;

/// Routes events to subscribed handlers
pub struct EventBus {
    registry: Mutex<Registry>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            registry: Mutex::new(Registry::default()),
        }
    }

    /// Broadcast `event` to every handler currently subscribed to `id`.
    ///
    /// Handlers run in registration order. The first handler error stops the
    /// broadcast and is returned; later handlers do not run.
    pub fn emit(&self, id: &EventId, event: &Event) -> Result<()> {
        let snapshot: Snapshot = {
            let registry = self.registry.lock();
            let Some(subscribers) = registry.get(id) else {
                log_unrouted(id);
                return Ok(());
            };
            subscribers
                .iter()
                .flat_map(|(subscriber, handlers)| {
                    handlers
                        .iter()
                        .map(move |(name, handler)| (*subscriber, name.clone(), handler.clone()))
                })
                .collect()
        };

        log_emit(id, event, snapshot.len());

        for (subscriber, name, handler) in snapshot {
            handler(event).map_err(|source| EventError::Handler {
                event: id.clone(),
                subscriber,
                handler: name.into_owned(),
                source,
            })?;
        }
        Ok(())
    }

    /// Emit a native input event under its own identifier.
    ///
    /// Application payloads without a native id are ignored.
    pub fn emit_native(&self, event: &Event) -> Result<()> {
        match event.native_id() {
            Some(id) => self.emit(&id, event),
            None => Ok(()),
        }
    }

    pub fn subscribe(&self, id: EventId, subscriber: SubscriberId, handler: NamedHandler) {
        debug!(
            target: EVENTS_TARGET,
            %subscriber,
            handler = %handler.name,
            event = %id,
            "Handler registered"
        );
        self.registry
            .lock()
            .entry(id)
            .or_default()
            .entry(subscriber)
            .or_default()
            .insert(handler.name, handler.handler);
    }

    /// Remove one named handler, or every handler of `subscriber` when
    /// `handler` is `None`.
    ///
    /// Returns whether anything was removed. Missing targets are logged and
    /// otherwise ignored.
    pub fn unsubscribe(&self, id: &EventId, subscriber: SubscriberId, handler: Option<&str>) -> bool {
        debug!(
            target: EVENTS_TARGET,
            %subscriber,
            handler = handler.unwrap_or("*"),
            event = %id,
            "Unsubscribe"
        );
        let mut registry = self.registry.lock();
        let subscribers = registry.get_mut(id);

        let removed = match handler {
            Some(name) => subscribers
                .and_then(|subscribers| subscribers.get_mut(&subscriber))
                .and_then(|instance| instance.shift_remove(name))
                .is_some(),
            None => subscribers
                .and_then(|subscribers| subscribers.shift_remove(&subscriber))
                .is_some(),
        };

        if !removed {
            info!(
                target: EVENTS_TARGET,
                %subscriber,
                handler = handler.unwrap_or("*"),
                event = %id,
                "Cannot locate subscription for unsubscribe"
            );
            return false;
        }

        Self::cleanup(&mut registry);
        true
    }

    /// Register every entry of the instance's handler table
    pub fn subscribe_all<S: Subscriber>(&self, instance: &Arc<S>) {
        let subscriber = instance.subscriber_id();
        for (id, handlers) in instance.event_handlers() {
            for handler in handlers.into_vec() {
                self.subscribe(id.clone(), subscriber, handler);
            }
        }
    }

    /// Remove `subscriber` from every event. Returns the number of events it
    /// was removed from.
    pub fn unsubscribe_all(&self, subscriber: SubscriberId) -> usize {
        debug!(target: EVENTS_TARGET, %subscriber, "Unsubscribed from all events");
        let mut registry = self.registry.lock();
        let removed = registry
            .values_mut()
            .filter_map(|subscribers| subscribers.shift_remove(&subscriber))
            .count();
        Self::cleanup(&mut registry);
        removed
    }

    pub fn is_subscribed(&self, id: &EventId, subscriber: SubscriberId, handler: &str) -> bool {
        self.registry
            .lock()
            .get(id)
            .and_then(|subscribers| subscribers.get(&subscriber))
            .is_some_and(|handlers| handlers.contains_key(handler))
    }

    /// Number of handlers registered for `id`
    pub fn handler_count(&self, id: &EventId) -> usize {
        self.registry
            .lock()
            .get(id)
            .map_or(0, |subscribers| subscribers.values().map(IndexMap::len).sum())
    }

    /// Number of distinct subscribers for `id`
    pub fn subscriber_count(&self, id: &EventId) -> usize {
        self.registry.lock().get(id).map_or(0, IndexMap::len)
    }

    /// Number of events with at least one subscriber
    pub fn event_count(&self) -> usize {
        self.registry.lock().len()
    }

    pub fn clear(&self) {
        self.registry.lock().clear();
    }

    /// Drop empty subscriber and event buckets
    fn cleanup(registry: &mut Registry) {
        for subscribers in registry.values_mut() {
            subscribers.retain(|_, handlers| !handlers.is_empty());
        }
        registry.retain(|_, subscribers| !subscribers.is_empty());
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.lock();
        f.debug_struct("EventBus")
            .field("events", &registry.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn log_emit(id: &EventId, event: &Event, handlers: usize) {
    if *id == EventId::KEYS_PRESSED {
        trace!(target: KEYS_TARGET, event = %id, handlers, "Event emitted");
    } else {
        debug!(target: EVENTS_TARGET, event = %id, handlers, payload = ?event, "Event emitted");
    }
}

fn log_unrouted(id: &EventId) {
    if *id == EventId::KEYS_PRESSED {
        trace!(target: KEYS_TARGET, event = %id, "Got event, but it is not in the registry");
    } else {
        debug!(target: EVENTS_TARGET, event = %id, "Got event, but it is not in the registry");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter(name: &'static str, hits: &Arc<AtomicUsize>) -> NamedHandler {
        let hits = hits.clone();
        NamedHandler::new(name, move |_| {
            hits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    #[test]
    fn test_emit_no_subscribers_is_ok() {
        let bus = EventBus::new();
        assert!(bus.emit(&EventId::TEST_MESSAGE, &Event::Quit).is_ok());
    }

    #[test]
    fn test_subscribe_then_emit_fires_once() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let id = SubscriberId::next();

        bus.subscribe(EventId::TEST_MESSAGE, id, counter("count", &hits));
        bus.emit(&EventId::TEST_MESSAGE, &Event::Message("x".into()))
            .unwrap();

        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_resubscribe_same_name_overwrites() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let id = SubscriberId::next();

        bus.subscribe(EventId::TEST_MESSAGE, id, counter("count", &hits));
        bus.subscribe(EventId::TEST_MESSAGE, id, counter("count", &hits));
        assert_eq!(bus.handler_count(&EventId::TEST_MESSAGE), 1);

        bus.emit(&EventId::TEST_MESSAGE, &Event::Quit).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribe_one_handler_leaves_other() {
        let bus = EventBus::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let id = SubscriberId::next();

        bus.subscribe(EventId::TEST_MESSAGE, id, counter("first", &first));
        bus.subscribe(EventId::TEST_MESSAGE, id, counter("second", &second));

        assert!(bus.unsubscribe(&EventId::TEST_MESSAGE, id, Some("first")));
        bus.emit(&EventId::TEST_MESSAGE, &Event::Quit).unwrap();

        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribe_missing_is_soft() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let id = SubscriberId::next();

        assert!(!bus.unsubscribe(&EventId::TEST_MESSAGE, id, None));

        bus.subscribe(EventId::TEST_MESSAGE, id, counter("count", &hits));
        assert!(!bus.unsubscribe(&EventId::TEST_MESSAGE, id, Some("missing")));
        assert!(bus.is_subscribed(&EventId::TEST_MESSAGE, id, "count"));
    }

    #[test]
    fn test_unsubscribe_instance_prunes_event() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let id = SubscriberId::next();

        bus.subscribe(EventId::TEST_MESSAGE, id, counter("a", &hits));
        bus.subscribe(EventId::TEST_MESSAGE, id, counter("b", &hits));
        assert!(bus.unsubscribe(&EventId::TEST_MESSAGE, id, None));

        assert_eq!(bus.event_count(), 0);
    }

    #[test]
    fn test_removing_last_handler_prunes_buckets() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let id = SubscriberId::next();

        bus.subscribe(EventId::QUIT, id, counter("only", &hits));
        bus.unsubscribe(&EventId::QUIT, id, Some("only"));

        assert_eq!(bus.subscriber_count(&EventId::QUIT), 0);
        assert_eq!(bus.event_count(), 0);
    }

    #[test]
    fn test_unsubscribe_all() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let leaving = SubscriberId::next();
        let staying = SubscriberId::next();

        bus.subscribe(EventId::QUIT, leaving, counter("a", &hits));
        bus.subscribe(EventId::TEST_MESSAGE, leaving, counter("b", &hits));
        bus.subscribe(EventId::TEST_MESSAGE, staying, counter("c", &hits));

        assert_eq!(bus.unsubscribe_all(leaving), 2);
        assert_eq!(bus.event_count(), 1);
        assert_eq!(bus.subscriber_count(&EventId::TEST_MESSAGE), 1);
    }

    #[test]
    fn test_broadcast_order_is_registration_order() {
        let bus = EventBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for label in ["first", "second", "third"] {
            let order = order.clone();
            bus.subscribe(
                EventId::TEST_MESSAGE,
                SubscriberId::next(),
                NamedHandler::new(label, move |_| {
                    order.lock().push(label);
                    Ok(())
                }),
            );
        }

        bus.emit(&EventId::TEST_MESSAGE, &Event::Quit).unwrap();
        bus.emit(&EventId::TEST_MESSAGE, &Event::Quit).unwrap();

        assert_eq!(
            *order.lock(),
            vec!["first", "second", "third", "first", "second", "third"]
        );
    }

    #[test]
    fn test_failing_handler_stops_broadcast() {
        let bus = EventBus::new();
        let after = Arc::new(AtomicUsize::new(0));

        bus.subscribe(
            EventId::TEST_MESSAGE,
            SubscriberId::next(),
            NamedHandler::new("broken", |_| Err("boom".into())),
        );
        bus.subscribe(EventId::TEST_MESSAGE, SubscriberId::next(), counter("after", &after));

        let err = bus.emit(&EventId::TEST_MESSAGE, &Event::Quit).unwrap_err();
        let EventError::Handler { handler, event, .. } = err;
        assert_eq!(handler, "broken");
        assert_eq!(event, EventId::TEST_MESSAGE);
        assert_eq!(after.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_handler_may_unsubscribe_itself() {
        let bus = Arc::new(EventBus::new());
        let hits = Arc::new(AtomicUsize::new(0));
        let id = SubscriberId::next();

        let inner_bus = Arc::downgrade(&bus);
        let inner_hits = hits.clone();
        bus.subscribe(
            EventId::TEST_MESSAGE,
            id,
            NamedHandler::new("once", move |_| {
                inner_hits.fetch_add(1, Ordering::SeqCst);
                if let Some(bus) = inner_bus.upgrade() {
                    bus.unsubscribe(&EventId::TEST_MESSAGE, id, Some("once"));
                }
                Ok(())
            }),
        );

        bus.emit(&EventId::TEST_MESSAGE, &Event::Quit).unwrap();
        bus.emit(&EventId::TEST_MESSAGE, &Event::Quit).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    struct Listener {
        id: SubscriberId,
        quits: AtomicUsize,
        messages: AtomicUsize,
    }

    impl Subscriber for Listener {
        fn subscriber_id(&self) -> SubscriberId {
            self.id
        }

        fn event_handlers(self: &Arc<Self>) -> HandlerMap {
            let on_quit = Arc::downgrade(self);
            let on_message = Arc::downgrade(self);
            let on_message_twice = Arc::downgrade(self);
            vec![
                (
                    EventId::QUIT,
                    NamedHandler::new("on_quit", move |_| {
                        if let Some(me) = on_quit.upgrade() {
                            me.quits.fetch_add(1, Ordering::SeqCst);
                        }
                        Ok(())
                    })
                    .into(),
                ),
                (
                    EventId::TEST_MESSAGE,
                    vec![
                        NamedHandler::new("on_message", move |_| {
                            if let Some(me) = on_message.upgrade() {
                                me.messages.fetch_add(1, Ordering::SeqCst);
                            }
                            Ok(())
                        }),
                        NamedHandler::new("on_message_again", move |_| {
                            if let Some(me) = on_message_twice.upgrade() {
                                me.messages.fetch_add(1, Ordering::SeqCst);
                            }
                            Ok(())
                        }),
                    ]
                    .into(),
                ),
            ]
        }
    }

    #[test]
    fn test_subscribe_all_from_handler_map() {
        let bus = EventBus::new();
        let listener = Arc::new(Listener {
            id: SubscriberId::next(),
            quits: AtomicUsize::new(0),
            messages: AtomicUsize::new(0),
        });

        bus.subscribe_all(&listener);
        bus.emit(&EventId::QUIT, &Event::Quit).unwrap();
        bus.emit(&EventId::TEST_MESSAGE, &Event::Message("hi".into()))
            .unwrap();

        assert_eq!(listener.quits.load(Ordering::SeqCst), 1);
        assert_eq!(listener.messages.load(Ordering::SeqCst), 2);

        assert_eq!(bus.unsubscribe_all(listener.id), 2);
        assert_eq!(bus.event_count(), 0);
    }
}
