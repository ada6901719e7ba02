// Listener registry for host bindings
// Native callbacks fan out through a ListenerSet; each subscribe() hands back the
// Subscription the push subsystem stores in its slots.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use dashmap::DashMap;

use crate::components::platform::{EventHandler, Subscription};

pub struct ListenerSet<T> {
    listeners: Arc<DashMap<u64, EventHandler<T>>>,
    next_id: Arc<AtomicU64>,
}

impl<T> Clone for ListenerSet<T> {
    fn clone(&self) -> Self {
        Self {
            listeners: Arc::clone(&self.listeners),
            next_id: Arc::clone(&self.next_id),
        }
    }
}

impl<T> Default for ListenerSet<T> {
    fn default() -> Self {
        Self {
            listeners: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl<T: Clone + Send + 'static> ListenerSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listener that stays registered until the returned handle is cancelled or dropped
    pub fn subscribe(&self, handler: EventHandler<T>) -> Subscription {
        let id = self.insert(handler);
        let listeners: Weak<DashMap<u64, EventHandler<T>>> = Arc::downgrade(&self.listeners);
        Subscription::new(move || {
            if let Some(listeners) = listeners.upgrade() {
                listeners.remove(&id);
            }
        })
    }

    /// Add a listener for the life of the set (process-scope hooks)
    pub fn attach(&self, handler: EventHandler<T>) {
        self.insert(handler);
    }

    fn insert(&self, handler: EventHandler<T>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.insert(id, handler);
        id
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver an event to every listener in registration order.
    /// Returns how many listeners ran.
    pub async fn emit(&self, event: T) -> usize {
        // Snapshot first: handlers may subscribe or unsubscribe while running
        let mut handlers: Vec<(u64, EventHandler<T>)> = self
            .listeners
            .iter()
            .map(|entry| (*entry.key(), Arc::clone(entry.value())))
            .collect();
        handlers.sort_by_key(|(id, _)| *id);

        for (_, handler) in &handlers {
            handler(event.clone()).await;
        }
        handlers.len()
    }
}
