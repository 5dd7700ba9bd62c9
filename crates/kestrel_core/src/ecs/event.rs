//! # Event Bus
//!
//! Synchronous, typed publish/subscribe between systems.
//!
//! ```text
//! world.send(DockRequest)
//!   ├─ snapshot subscribers of DockRequest
//!   ├─ H1(&mut world, &event)
//!   │    └─ world.send(PanelDocked)      <- nested, runs to completion here
//!   │         └─ ...
//!   └─ H2(&mut world, &event)
//! ```
//!
//! Dispatch is immediate and depth-first: there is no queue. The subscriber
//! list is snapshotted when `send` starts, so handlers may subscribe or
//! unsubscribe freely; changes apply from the next `send`.

use std::any::{Any, TypeId};
use std::rc::Rc;

use rustc_hash::FxHashMap;
use tracing::trace;

use super::world::World;

/// A subscribed event handler.
pub type Handler<E> = Rc<dyn Fn(&mut World, &E)>;

/// Receipt returned by [`World::subscribe`], used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle {
    event_type: TypeId,
    id: u64,
}

impl SubscriptionHandle {
    /// Returns the unique subscription id.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.id
    }
}

/// Ordered handlers for one event type.
struct HandlerList<E> {
    entries: Vec<(u64, Handler<E>)>,
}

trait AnyHandlerList {
    fn remove(&mut self, id: u64) -> bool;
    fn len(&self) -> usize;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<E: 'static> AnyHandlerList for HandlerList<E> {
    fn remove(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Per-event-type subscriber lists.
#[derive(Default)]
pub(crate) struct EventBus {
    lists: FxHashMap<TypeId, Box<dyn AnyHandlerList>>,
    next_id: u64,
}

impl EventBus {
    /// Creates an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler for `E`.
    pub fn subscribe<E: 'static>(&mut self, handler: Handler<E>) -> SubscriptionHandle {
        let id = self.next_id;
        self.next_id += 1;

        let list = self
            .lists
            .entry(TypeId::of::<E>())
            .or_insert_with(|| Box::new(HandlerList::<E> { entries: Vec::new() }));
        if let Some(list) = list.as_any_mut().downcast_mut::<HandlerList<E>>() {
            list.entries.push((id, handler));
        }

        SubscriptionHandle {
            event_type: TypeId::of::<E>(),
            id,
        }
    }

    /// Removes a handler. Returns whether it was still subscribed.
    pub fn unsubscribe(&mut self, handle: SubscriptionHandle) -> bool {
        self.lists
            .get_mut(&handle.event_type)
            .is_some_and(|list| list.remove(handle.id))
    }

    /// Clones the current handler list for `E`.
    #[must_use]
    pub fn snapshot<E: 'static>(&self) -> Vec<Handler<E>> {
        self.lists
            .get(&TypeId::of::<E>())
            .and_then(|list| list.as_any().downcast_ref::<HandlerList<E>>())
            .map(|list| list.entries.iter().map(|(_, handler)| Rc::clone(handler)).collect())
            .unwrap_or_default()
    }

    /// Returns the number of handlers subscribed to `E`.
    #[must_use]
    pub fn subscriber_count<E: 'static>(&self) -> usize {
        self.lists.get(&TypeId::of::<E>()).map_or(0, |list| list.len())
    }

    /// Returns the number of handlers across all event types.
    #[must_use]
    pub fn total_subscribers(&self) -> usize {
        self.lists.values().map(|list| list.len()).sum()
    }
}

impl World {
    /// Subscribes a handler to events of type `E`.
    ///
    /// Handlers run in subscription order. They receive the world mutably and
    /// may send further events, which are dispatched before `send` returns
    /// to them.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::cell::Cell;
    /// use std::rc::Rc;
    /// use kestrel_core::World;
    ///
    /// struct Ping;
    ///
    /// let mut world = World::new();
    /// let hits = Rc::new(Cell::new(0));
    /// let counter = Rc::clone(&hits);
    /// world.subscribe(move |_: &mut World, _: &Ping| counter.set(counter.get() + 1));
    ///
    /// world.send(Ping);
    /// assert_eq!(hits.get(), 1);
    /// ```
    pub fn subscribe<E, F>(&mut self, handler: F) -> SubscriptionHandle
    where
        E: 'static,
        F: Fn(&mut World, &E) + 'static,
    {
        let handle = self.events.subscribe::<E>(Rc::new(handler));
        trace!(event = std::any::type_name::<E>(), id = handle.id, "subscribed");
        handle
    }

    /// Unsubscribes a handler. Returns whether it was still subscribed.
    ///
    /// Safe to call from inside a handler; the current dispatch still
    /// reaches every handler that was subscribed when it started.
    pub fn unsubscribe(&mut self, handle: SubscriptionHandle) -> bool {
        let removed = self.events.unsubscribe(handle);
        trace!(id = handle.id, removed, "unsubscribed");
        removed
    }

    /// Sends an event to every handler subscribed to `E`.
    ///
    /// Runs synchronously on the calling stack. With no subscribers this is
    /// a no-op.
    pub fn send<E: 'static>(&mut self, event: E) {
        let handlers = self.events.snapshot::<E>();
        if handlers.is_empty() {
            return;
        }

        if self.config.trace_events {
            trace!(
                event = std::any::type_name::<E>(),
                subscribers = handlers.len(),
                depth = self.dispatch_depth,
                "dispatching event"
            );
        }

        self.dispatch_depth += 1;
        for handler in &handlers {
            handler(self, &event);
        }
        self.dispatch_depth -= 1;
    }

    /// Returns the number of handlers subscribed to `E`.
    #[must_use]
    pub fn subscriber_count<E: 'static>(&self) -> usize {
        self.events.subscriber_count::<E>()
    }

    /// Returns how many `send` calls are currently on the stack.
    #[must_use]
    pub fn dispatch_depth(&self) -> usize {
        self.dispatch_depth
    }
}

/// Collects subscription handles so they can be released together.
///
/// Systems keep one of these and call [`Subscriptions::release`] from
/// `dispose`.
#[derive(Debug, Default)]
pub struct Subscriptions {
    handles: Vec<SubscriptionHandle>,
}

impl Subscriptions {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a handle.
    pub fn push(&mut self, handle: SubscriptionHandle) {
        self.handles.push(handle);
    }

    /// Subscribes a handler and records its handle.
    pub fn subscribe<E, F>(&mut self, world: &mut World, handler: F) -> SubscriptionHandle
    where
        E: 'static,
        F: Fn(&mut World, &E) + 'static,
    {
        let handle = world.subscribe(handler);
        self.handles.push(handle);
        handle
    }

    /// Returns the number of recorded handles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Checks if no handle is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Unsubscribes every recorded handle. Returns how many were still live.
    pub fn release(&mut self, world: &mut World) -> usize {
        self.handles
            .drain(..)
            .filter(|&handle| world.unsubscribe(handle))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    struct Ping;
    struct Pong(u32);

    #[test]
    fn test_send_without_subscribers_is_noop() {
        let mut world = World::new();
        world.send(Ping);
        assert_eq!(world.subscriber_count::<Ping>(), 0);
    }

    #[test]
    fn test_subscription_order() {
        let mut world = World::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        for tag in ["h1", "h2", "h3"] {
            let log = Rc::clone(&log);
            world.subscribe(move |_: &mut World, _: &Ping| log.borrow_mut().push(tag));
        }

        world.send(Ping);
        assert_eq!(*log.borrow(), vec!["h1", "h2", "h3"]);
    }

    #[test]
    fn test_unsubscribe_during_dispatch_uses_snapshot() {
        let mut world = World::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let h2_handle = Rc::new(Cell::new(None));

        {
            let log = Rc::clone(&log);
            let h2_handle = Rc::clone(&h2_handle);
            world.subscribe(move |world: &mut World, _: &Ping| {
                log.borrow_mut().push("h1");
                if let Some(handle) = h2_handle.take() {
                    world.unsubscribe(handle);
                }
            });
        }
        {
            let log = Rc::clone(&log);
            let handle = world.subscribe(move |_: &mut World, _: &Ping| log.borrow_mut().push("h2"));
            h2_handle.set(Some(handle));
        }

        world.send(Ping);
        assert_eq!(*log.borrow(), vec!["h1", "h2"]);

        world.send(Ping);
        assert_eq!(*log.borrow(), vec!["h1", "h2", "h1"]);
    }

    #[test]
    fn test_subscribe_during_dispatch_applies_next_send() {
        let mut world = World::new();
        let late_hits = Rc::new(Cell::new(0));

        let hits = Rc::clone(&late_hits);
        world.subscribe(move |world: &mut World, _: &Ping| {
            let hits = Rc::clone(&hits);
            world.subscribe(move |_: &mut World, _: &Ping| hits.set(hits.get() + 1));
        });

        world.send(Ping);
        assert_eq!(late_hits.get(), 0);
        world.send(Ping);
        assert_eq!(late_hits.get(), 1);
    }

    #[test]
    fn test_nested_send_completes_before_outer_continues() {
        let mut world = World::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        {
            let log = Rc::clone(&log);
            world.subscribe(move |world: &mut World, _: &Ping| {
                log.borrow_mut().push("ping-start".to_string());
                assert_eq!(world.dispatch_depth(), 1);
                world.send(Pong(7));
                log.borrow_mut().push("ping-end".to_string());
            });
        }
        {
            let log = Rc::clone(&log);
            world.subscribe(move |world: &mut World, pong: &Pong| {
                assert_eq!(world.dispatch_depth(), 2);
                log.borrow_mut().push(format!("pong {}", pong.0));
            });
        }

        world.send(Ping);
        assert_eq!(*log.borrow(), vec!["ping-start", "pong 7", "ping-end"]);
        assert_eq!(world.dispatch_depth(), 0);
    }

    #[test]
    fn test_handlers_mutate_world() {
        struct Counter(u32);

        let mut world = World::new();
        let entity = world.spawn().with(Counter(0)).build();

        world.subscribe(move |world: &mut World, pong: &Pong| {
            if let Ok(counter) = world.get_mut::<Counter>(entity) {
                counter.0 += pong.0;
            }
        });

        world.send(Pong(2));
        world.send(Pong(3));
        assert_eq!(world.get::<Counter>(entity).unwrap().0, 5);
    }

    #[test]
    fn test_subscriptions_release() {
        let mut world = World::new();
        let mut subscriptions = Subscriptions::new();

        subscriptions.subscribe(&mut world, |_: &mut World, _: &Ping| {});
        subscriptions.subscribe(&mut world, |_: &mut World, _: &Pong| {});
        let handle = world.subscribe(|_: &mut World, _: &Ping| {});
        assert_eq!(world.events.total_subscribers(), 3);

        assert_eq!(subscriptions.release(&mut world), 2);
        assert!(subscriptions.is_empty());
        assert_eq!(world.subscriber_count::<Ping>(), 1);
        assert!(world.unsubscribe(handle));
        assert!(!world.unsubscribe(handle));
    }
}
