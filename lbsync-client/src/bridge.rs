//! Awaitable one-shot results over SDK event subscriptions.
//!
//! The SDK reports handshake outcomes as pushed events on the dispatch
//! thread. [`CallbackBridge::one_of`] arms a success and a failure
//! subscription *before* the SDK call is issued, so the completion can never
//! be missed, and hands back a [`PendingEvent`] the caller awaits.
//!
//! Whichever event fires first settles the pending result. Both
//! subscriptions are dropped before the outcome is handed over, so no later
//! event can observe or alter it, and a bridge never leaks registrations.

use std::sync::{Arc, Mutex};

// ---

use tokio::sync::oneshot;

// ---

use lbsync_domain::{CallbackManager, RemoteStatus, SessionEvent, SessionEventKind, Subscription};

// ---

use super::lock;

// ---------------------------------------------------------------------------
// BridgeFailure
// ---------------------------------------------------------------------------

/// The failure side of a settled [`PendingEvent`].
///
/// `kind` is the event that settled it: either the failure kind, or the
/// success kind arriving with a non-OK status. `status` is `None` when the
/// event carries no code (a plain disconnect) or the bridge was torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeFailure {
    pub kind: SessionEventKind,
    pub status: Option<RemoteStatus>,
}

type Outcome = std::result::Result<SessionEvent, BridgeFailure>;

// ---------------------------------------------------------------------------
// CallbackBridge
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct CallbackBridge {
    // ---
    manager: Arc<dyn CallbackManager>,
}

// ---

impl CallbackBridge {
    // ---
    pub fn new(manager: Arc<dyn CallbackManager>) -> Self {
        Self { manager }
    }

    // ---

    /// Arm a pending result settled by the next event of `kind`.
    ///
    /// Used to consume an event the caller is about to cause, so it cannot
    /// settle a later, unrelated wait.
    pub fn next(&self, kind: SessionEventKind) -> PendingEvent {
        // ---
        let (tx, rx) = oneshot::channel();
        let slot = Arc::new(Mutex::new(Slot {
            tx: Some(tx),
            subs: Vec::with_capacity(1),
        }));

        let sub = {
            let slot = Arc::clone(&slot);
            self.manager.subscribe(
                kind,
                Arc::new(move |event: &SessionEvent| settle(&slot, Ok(event.clone()))),
            )
        };

        let late = {
            let mut guard = lock(&slot);
            if guard.tx.is_some() {
                guard.subs.push(sub);
                None
            } else {
                Some(sub)
            }
        };
        drop(late);

        PendingEvent {
            rx,
            slot,
            failure: kind,
        }
    }

    // ---

    /// Arm a pending result settled by the first `success` or `failure`
    /// event, whichever is dispatched first.
    ///
    /// Call this before issuing the SDK operation whose completion it
    /// should capture.
    pub fn one_of(&self, success: SessionEventKind, failure: SessionEventKind) -> PendingEvent {
        // ---
        let (tx, rx) = oneshot::channel();
        let slot = Arc::new(Mutex::new(Slot {
            tx: Some(tx),
            subs: Vec::with_capacity(2),
        }));

        let on_success = {
            let slot = Arc::clone(&slot);
            self.manager.subscribe(
                success,
                Arc::new(move |event: &SessionEvent| {
                    let outcome = match event.status() {
                        Some(status) if !status.is_ok() => Err(BridgeFailure {
                            kind: success,
                            status: Some(status),
                        }),
                        _ => Ok(event.clone()),
                    };
                    settle(&slot, outcome);
                }),
            )
        };

        let on_failure = {
            let slot = Arc::clone(&slot);
            self.manager.subscribe(
                failure,
                Arc::new(move |event: &SessionEvent| {
                    settle(
                        &slot,
                        Err(BridgeFailure {
                            kind: failure,
                            status: event.status(),
                        }),
                    );
                }),
            )
        };

        // An event may already have settled the slot between the two
        // subscribe calls; in that case the handles go straight back.
        let late = {
            let mut guard = lock(&slot);
            if guard.tx.is_some() {
                guard.subs.push(on_success);
                guard.subs.push(on_failure);
                None
            } else {
                Some((on_success, on_failure))
            }
        };
        drop(late);

        PendingEvent {
            rx,
            slot,
            failure,
        }
    }
}

// ---------------------------------------------------------------------------
// PendingEvent
// ---------------------------------------------------------------------------

/// An armed, not yet observed, handshake completion.
///
/// Dropping it unsettled tears down both subscriptions.
pub struct PendingEvent {
    // ---
    rx: oneshot::Receiver<Outcome>,
    slot: Arc<Mutex<Slot>>,
    failure: SessionEventKind,
}

// ---

impl PendingEvent {
    // ---
    /// Wait for the first matching event.
    pub async fn wait(mut self) -> Outcome {
        // ---
        match (&mut self.rx).await {
            Ok(outcome) => outcome,
            Err(_) => Err(BridgeFailure {
                kind: self.failure,
                status: None,
            }),
        }
    }

    /// Whether an event has already settled this result.
    pub fn is_settled(&self) -> bool {
        lock(&self.slot).tx.is_none()
    }
}

// ---

impl Drop for PendingEvent {
    fn drop(&mut self) {
        // ---
        let subs = {
            let mut guard = lock(&self.slot);
            guard.tx = None;
            std::mem::take(&mut guard.subs)
        };
        drop(subs);
    }
}

// ---------------------------------------------------------------------------
// Slot
// ---------------------------------------------------------------------------

struct Slot {
    tx: Option<oneshot::Sender<Outcome>>,
    subs: Vec<Subscription>,
}

// ---

/// First caller wins. Subscriptions are released outside the slot lock,
/// then the outcome is delivered.
fn settle(slot: &Mutex<Slot>, outcome: Outcome) {
    // ---
    let (tx, subs) = {
        let mut guard = lock(slot);
        match guard.tx.take() {
            Some(tx) => (tx, std::mem::take(&mut guard.subs)),
            None => return,
        }
    };

    drop(subs);
    let _ = tx.send(outcome);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
