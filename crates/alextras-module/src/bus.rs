//! Event bus for lifecycle events.
//!
//! Listeners registered with [`EventBus::on`] run synchronously inside
//! `emit`, in registration order. Async consumers use
//! [`EventBus::subscribe`] instead.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::broadcast;
use tracing::error;

use alextras_core::events::{EventKind, LifecycleEvent};

/// Handle returned by [`EventBus::on`], used to remove the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// A synchronous listener.
pub type Listener = Arc<dyn Fn(&LifecycleEvent) + Send + Sync>;

/// Entry in the listener table.
struct ListenerEntry {
    id: ListenerId,
    once: bool,
    callback: Listener,
}

/// Publish/subscribe hub for [`LifecycleEvent`]s.
pub struct EventBus {
    /// Event kind → listeners in registration order.
    listeners: RwLock<HashMap<EventKind, Vec<ListenerEntry>>>,
    next_id: AtomicU64,
    tx: broadcast::Sender<LifecycleEvent>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count: usize = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(Vec::len)
            .sum();
        f.debug_struct("EventBus")
            .field("listeners", &count)
            .field("subscribers", &self.tx.receiver_count())
            .finish()
    }
}

impl EventBus {
    /// Create a bus whose subscribers buffer up to `capacity` events.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            listeners: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            tx,
        }
    }

    fn add<F>(&self, kind: EventKind, once: bool, callback: F) -> ListenerId
    where
        F: Fn(&LifecycleEvent) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(kind)
            .or_default()
            .push(ListenerEntry {
                id,
                once,
                callback: Arc::new(callback),
            });
        id
    }

    /// Call `callback` for every event of `kind`.
    pub fn on<F>(&self, kind: EventKind, callback: F) -> ListenerId
    where
        F: Fn(&LifecycleEvent) + Send + Sync + 'static,
    {
        self.add(kind, false, callback)
    }

    /// Call `callback` for the next event of `kind` only.
    pub fn once<F>(&self, kind: EventKind, callback: F) -> ListenerId
    where
        F: Fn(&LifecycleEvent) + Send + Sync + 'static,
    {
        self.add(kind, true, callback)
    }

    /// Remove a listener. Returns `false` if it was already gone.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
        for entries in listeners.values_mut() {
            if let Some(pos) = entries.iter().position(|e| e.id == id) {
                entries.remove(pos);
                return true;
            }
        }
        false
    }

    /// Receive every event asynchronously.
    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.tx.subscribe()
    }

    /// Publish an event to listeners and subscribers.
    pub fn emit(&self, event: LifecycleEvent) {
        let kind = event.kind();
        let callbacks: Vec<Listener> = {
            let mut listeners = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
            match listeners.get_mut(&kind) {
                Some(entries) => {
                    let callbacks = entries.iter().map(|e| e.callback.clone()).collect();
                    entries.retain(|e| !e.once);
                    callbacks
                }
                None => Vec::new(),
            }
        };

        for callback in callbacks {
            if std::panic::catch_unwind(AssertUnwindSafe(|| callback(&event))).is_err() {
                error!(event = %kind, "Event listener panicked");
            }
        }

        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
