//! In-process fan-out of [`BookmarkChangeEvent`]s.
//!
//! Delivery is synchronous: `publish` returns after every listener has run.
//! Listeners mounted later never see earlier events and must read the store
//! when they mount.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use cb_core::{BookmarkChangeEvent, EventName};
use tracing::{debug, warn};

pub type BookmarkEventHandler = Arc<dyn Fn(&BookmarkChangeEvent) + Send + Sync>;

struct Listener {
    id: u64,
    names: Vec<EventName>,
    handler: BookmarkEventHandler,
}

#[derive(Default)]
struct BusInner {
    listeners: Mutex<Vec<Listener>>,
    next_id: AtomicU64,
    legacy_warned: AtomicBool,
}

impl BusInner {
    fn remove(&self, id: u64) {
        let mut listeners = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
        listeners.retain(|listener| listener.id != id);
    }
}

/// Cloneable handle to one bus; clones share listeners.
#[derive(Clone, Default)]
pub struct BookmarkEventBus {
    inner: Arc<BusInner>,
}

impl BookmarkEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `event` once to every listener, whichever names it registered
    /// under. Returns the number of listeners that ran.
    pub fn publish(&self, event: &BookmarkChangeEvent) -> usize {
        // Snapshot so handlers can subscribe, unsubscribe or publish re-entrantly.
        let handlers: Vec<(u64, BookmarkEventHandler)> = {
            let listeners = self.inner.listeners.lock().unwrap_or_else(|e| e.into_inner());
            listeners
                .iter()
                .map(|listener| (listener.id, Arc::clone(&listener.handler)))
                .collect()
        };

        debug!(
            event = EventName::Changed.as_str(),
            alias = EventName::LegacyUpdated.as_str(),
            action = ?event.action,
            listeners = handlers.len(),
            "publishing bookmark change"
        );

        let mut delivered = 0;
        for (id, handler) in handlers {
            match catch_unwind(AssertUnwindSafe(|| handler(event))) {
                Ok(()) => delivered += 1,
                Err(_) => warn!(listener_id = id, "bookmark listener panicked"),
            }
        }
        delivered
    }

    /// Listen under both the current name and the deprecated alias. Each
    /// event is still delivered once.
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&BookmarkChangeEvent) + Send + Sync + 'static,
    {
        self.register(EventName::all().to_vec(), Arc::new(handler))
    }

    /// Listen under a single name.
    pub fn subscribe_to<F>(&self, name: EventName, handler: F) -> Subscription
    where
        F: Fn(&BookmarkChangeEvent) + Send + Sync + 'static,
    {
        if name.is_deprecated() && !self.inner.legacy_warned.swap(true, Ordering::SeqCst) {
            warn!(
                name = name.as_str(),
                replacement = EventName::Changed.as_str(),
                "listener registered under deprecated bookmark event name"
            );
        }
        self.register(vec![name], Arc::new(handler))
    }

    pub fn listener_count(&self) -> usize {
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// Number of listeners registered under `name`.
    pub fn listener_count_for(&self, name: EventName) -> usize {
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|listener| listener.names.contains(&name))
            .count()
    }

    fn register(&self, names: Vec<EventName>, handler: BookmarkEventHandler) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Listener { id, names, handler });

        Subscription {
            id,
            bus: Arc::downgrade(&self.inner),
        }
    }
}

/// Disposer for one registration. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    bus: Weak<BusInner>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        // Drop does the work.
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.bus.upgrade() {
            inner.remove(self.id);
        }
    }
}
