//! Collaborator traits for the remote session SDK.
//!
//! The SDK's wire protocol is opaque. These traits capture only what the
//! orchestration layer needs: a fire-and-forget handshake surface whose
//! completions arrive as pushed [`SessionEvent`]s, a subscription registry,
//! and the domain calls that return a [`RemoteStatus`]-bearing result.

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

// ---

use async_trait::async_trait;
use uuid::Uuid;

// ---

use super::credentials::Credentials;
use super::error::CallError;
use super::event::{SessionEvent, SessionEventKind};
use super::leaderboard::{DataRequest, LeaderboardEntries, LeaderboardInfo};
use super::status::RemoteStatus;

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// Handler invoked on the dispatch thread for each matching event.
pub type EventHandler = Arc<dyn Fn(&SessionEvent) + Send + Sync>;

// ---

/// Live registration returned by [`CallbackManager::subscribe`].
///
/// Dropping the handle unsubscribes. The handler is never invoked for an
/// event dispatched after the drop returns.
pub struct Subscription {
    // ---
    id: Uuid,
    kind: SessionEventKind,
    on_drop: Option<Box<dyn FnOnce() + Send>>,
}

// ---

impl Subscription {
    // ---
    /// Build a handle; `on_drop` removes the registration from the manager.
    pub fn new(id: Uuid, kind: SessionEventKind, on_drop: impl FnOnce() + Send + 'static) -> Self {
        // ---
        Self {
            id,
            kind,
            on_drop: Some(Box::new(on_drop)),
        }
    }

    // ---

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn kind(&self) -> SessionEventKind {
        self.kind
    }

    // ---

    /// Explicit form of dropping the handle.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

// ---

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(on_drop) = self.on_drop.take() {
            on_drop();
        }
    }
}

// ---

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// CallbackManager
// ---------------------------------------------------------------------------

/// Subscription registry and event pump of the SDK.
///
/// Implementations must not hold their registry lock while invoking
/// handlers: a handler is allowed to drop its own (or a sibling's)
/// [`Subscription`] from inside the callback. A subscription made while an
/// event is being dispatched does not receive that event.
pub trait CallbackManager: Send + Sync {
    // ---
    /// Register `handler` for every event of type `kind`.
    fn subscribe(&self, kind: SessionEventKind, handler: EventHandler) -> Subscription;

    /// Wait up to `timeout` for queued events and dispatch them to the
    /// registered handlers. Called in a loop by a single dedicated thread.
    fn run_wait_callbacks(&self, timeout: Duration);
}

// ---------------------------------------------------------------------------
// SessionClient
// ---------------------------------------------------------------------------

/// The stateful session link.
///
/// `connect` and `log_on` return immediately; their outcome is posted
/// later as a [`SessionEvent`]. The boolean accessors are the source of
/// truth for whether the link and logon session are currently up.
pub trait SessionClient: Send + Sync {
    // ---
    /// Begin connecting. `None` lets the SDK pick a server.
    /// Completion: [`SessionEvent::Connected`] or [`SessionEvent::Disconnected`].
    fn connect(&self, endpoint: Option<SocketAddr>);

    /// Begin the logon handshake on an established link.
    /// Completion: [`SessionEvent::LoggedOn`] or [`SessionEvent::Disconnected`].
    fn log_on(&self, credentials: &Credentials);

    /// Tear the link down synchronously.
    fn disconnect(&self);

    fn is_connected(&self) -> bool;

    fn is_logged_on(&self) -> bool;

    /// Install (or clear) the listener notified of raw packet traffic.
    fn set_network_listener(&self, listener: Option<Arc<dyn NetworkListener>>);
}

// ---------------------------------------------------------------------------
// NetworkListener
// ---------------------------------------------------------------------------

/// Observer of raw packet traffic on the session link.
pub trait NetworkListener: Send + Sync {
    // ---
    /// A packet of `bytes` length arrived from the remote.
    fn on_incoming(&self, bytes: usize);

    /// A packet of `bytes` length is about to be sent.
    fn on_outgoing(&self, bytes: usize) {
        let _ = bytes;
    }
}

// ---------------------------------------------------------------------------
// UserStats
// ---------------------------------------------------------------------------

/// Anything carrying a remote result code.
pub trait RemoteResult {
    fn status(&self) -> RemoteStatus;
}

// ---

/// Leaderboard domain calls. Only valid while logged on.
#[async_trait]
pub trait UserStats: Send + Sync {
    // ---
    async fn find_leaderboard(
        &self,
        app_id: u32,
        name: &str,
    ) -> std::result::Result<LeaderboardInfo, CallError>;

    async fn leaderboard_entries(
        &self,
        app_id: u32,
        leaderboard_id: i32,
        start: i32,
        end: i32,
        request: DataRequest,
    ) -> std::result::Result<LeaderboardEntries, CallError>;
}
