//! Route-change subscribers.
//!
//! # Design Decisions
//! - Listeners are snapshotted before delivery: one added during a
//!   notification is not called for that notification
//! - Only the controller's commit step calls `notify`
//! - A `Subscription` unsubscribes on drop unless detached

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use crate::routing::ResolvedRoute;

/// Callback receiving each committed route.
pub type RouteListener = Arc<dyn Fn(&ResolvedRoute) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, RouteListener)>,
}

/// Ordered set of route-change listeners.
#[derive(Clone, Default)]
pub struct SubscriberRegistry {
    inner: Arc<Mutex<Listeners>>,
}

impl fmt::Debug for SubscriberRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriberRegistry")
            .field("subscribers", &self.len())
            .finish()
    }
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn listeners(&self) -> std::sync::MutexGuard<'_, Listeners> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a listener. Keep the returned handle alive to stay subscribed.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ResolvedRoute) + Send + Sync + 'static,
    {
        let mut listeners = self.listeners();
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.entries.push((id, Arc::new(listener)));
        Subscription {
            id,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Number of live listeners.
    pub fn len(&self) -> usize {
        self.listeners().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn notify(&self, route: &ResolvedRoute) {
        let snapshot: Vec<RouteListener> = self
            .listeners()
            .entries
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();

        tracing::trace!(route = %route.route_id, subscribers = snapshot.len(), "Notifying subscribers");
        for listener in snapshot {
            listener(route);
        }
    }
}

/// Handle returned by `subscribe`.
#[must_use = "dropping a Subscription unsubscribes it"]
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Listeners>>,
}

impl Subscription {
    /// Stop receiving notifications.
    pub fn unsubscribe(self) {}

    /// Keep the listener registered for the registry's lifetime.
    pub fn detach(mut self) {
        self.registry = Weak::new();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.registry.upgrade() {
            inner
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .entries
                .retain(|(id, _)| *id != self.id);
        }
    }
}
