use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

// ---

use uuid::Uuid;

// ---

use lbsync_domain::{
    // ---
    CallbackManager,
    EventHandler,
    SessionEvent,
    SessionEventKind,
    Subscription,
};

// ---

use super::lock;

// ---------------------------------------------------------------------------
// SimCallbackManager
// ---------------------------------------------------------------------------

type Registry = HashMap<Uuid, (SessionEventKind, EventHandler)>;

/// In-process subscription registry and event queue.
///
/// [`SimSessionClient`] posts events with [`SimCallbackManager::post`];
/// whichever thread calls [`CallbackManager::run_wait_callbacks`] delivers
/// them. Handlers run with no lock held, so they may drop subscriptions.
///
/// [`SimSessionClient`]: super::SimSessionClient
pub struct SimCallbackManager {
    // ---
    handlers: Arc<Mutex<Registry>>,
    queue_tx: Mutex<mpsc::Sender<SessionEvent>>,
    queue_rx: Mutex<mpsc::Receiver<SessionEvent>>,
    dispatched: AtomicU64,
}

// ---

impl SimCallbackManager {
    // ---
    pub fn new() -> Self {
        // ---
        let (queue_tx, queue_rx) = mpsc::channel();
        Self {
            handlers: Arc::new(Mutex::new(HashMap::new())),
            queue_tx: Mutex::new(queue_tx),
            queue_rx: Mutex::new(queue_rx),
            dispatched: AtomicU64::new(0),
        }
    }

    // ---

    /// Queue an event for the next pump.
    pub fn post(&self, event: SessionEvent) {
        // ---
        tracing::debug!(?event, "sim: event queued");
        // The receiver lives as long as `self`; send cannot fail here.
        let _ = lock(&self.queue_tx).send(event);
    }

    // ---

    /// Number of live subscriptions across all event types.
    pub fn subscription_count(&self) -> usize {
        lock(&self.handlers).len()
    }

    /// Number of live subscriptions for one event type.
    pub fn subscriptions_for(&self, kind: SessionEventKind) -> usize {
        lock(&self.handlers)
            .values()
            .filter(|(k, _)| *k == kind)
            .count()
    }

    /// Events delivered so far (each counted once, whatever the fan-out).
    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::SeqCst)
    }

    // ---

    fn dispatch(&self, event: &SessionEvent) {
        // ---
        let kind = event.kind();

        // Snapshot under the lock, invoke without it.
        let targets: Vec<(Uuid, EventHandler)> = lock(&self.handlers)
            .iter()
            .filter(|(_, (k, _))| *k == kind)
            .map(|(id, (_, handler))| (*id, Arc::clone(handler)))
            .collect();

        for (id, handler) in targets {
            // An earlier handler in this batch may have unsubscribed this one.
            if !lock(&self.handlers).contains_key(&id) {
                continue;
            }
            handler(event);
        }

        self.dispatched.fetch_add(1, Ordering::SeqCst);
    }
}

// ---

impl Default for SimCallbackManager {
    fn default() -> Self {
        Self::new()
    }
}

// ---

impl CallbackManager for SimCallbackManager {
    // ---
    fn subscribe(&self, kind: SessionEventKind, handler: EventHandler) -> Subscription {
        // ---
        let id = Uuid::new_v4();
        lock(&self.handlers).insert(id, (kind, handler));
        tracing::debug!(%id, ?kind, "sim: subscribed");

        let registry: Weak<Mutex<Registry>> = Arc::downgrade(&self.handlers);
        Subscription::new(id, kind, move || {
            if let Some(registry) = registry.upgrade() {
                lock(&registry).remove(&id);
                tracing::debug!(%id, ?kind, "sim: unsubscribed");
            }
        })
    }

    // ---

    fn run_wait_callbacks(&self, timeout: Duration) {
        // ---
        let batch = {
            let rx = lock(&self.queue_rx);
            let first = match rx.recv_timeout(timeout) {
                Ok(event) => event,
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => return,
            };
            let mut batch = vec![first];
            batch.extend(rx.try_iter());
            batch
        };

        for event in &batch {
            self.dispatch(event);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
