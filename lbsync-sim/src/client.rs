use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ---

use lbsync_domain::{
    // ---
    Credentials,
    NetworkListener,
    RemoteStatus,
    SessionClient,
    SessionEvent,
};

// ---

use super::{lock, HandshakeOutcome, SimCallbackManager, SimConfig};

// ---------------------------------------------------------------------------
// Handshake
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum Handshake {
    Connect,
    LogOn,
}

// ---------------------------------------------------------------------------
// Inner
// ---------------------------------------------------------------------------

struct Inner {
    // ---
    callbacks: Arc<SimCallbackManager>,
    config: SimConfig,

    connected: AtomicBool,
    logged_on: AtomicBool,

    connect_calls: AtomicU32,
    log_on_calls: AtomicU32,
    disconnect_calls: AtomicU32,

    /// Scripted answers, consumed front-first before falling back to config.
    connect_script: Mutex<VecDeque<HandshakeOutcome>>,
    log_on_script: Mutex<VecDeque<HandshakeOutcome>>,

    last_user: Mutex<Option<String>>,
    listener: Mutex<Option<Arc<dyn NetworkListener>>>,
}

// ---

impl Inner {
    // ---
    /// Apply `outcome` to the link flags and post the matching event.
    ///
    /// Flags change before the event is queued so a handler that observes
    /// the event also observes the new state.
    fn complete(&self, handshake: Handshake, outcome: HandshakeOutcome) {
        // ---
        let event = match (handshake, outcome) {
            (Handshake::Connect, HandshakeOutcome::Accept) => {
                self.connected.store(true, Ordering::SeqCst);
                SessionEvent::Connected {
                    status: RemoteStatus::Ok,
                }
            }
            (Handshake::Connect, HandshakeOutcome::Reject(status)) => {
                SessionEvent::Connected { status }
            }
            (Handshake::LogOn, HandshakeOutcome::Accept) => {
                if !self.connected.load(Ordering::SeqCst) {
                    // Logon on a dead link: the SDK reports a disconnect.
                    SessionEvent::Disconnected {
                        user_initiated: false,
                    }
                } else {
                    self.logged_on.store(true, Ordering::SeqCst);
                    SessionEvent::LoggedOn {
                        status: RemoteStatus::Ok,
                    }
                }
            }
            (Handshake::LogOn, HandshakeOutcome::Reject(status)) => {
                SessionEvent::LoggedOn { status }
            }
            (_, HandshakeOutcome::Drop) => {
                self.connected.store(false, Ordering::SeqCst);
                self.logged_on.store(false, Ordering::SeqCst);
                SessionEvent::Disconnected {
                    user_initiated: false,
                }
            }
        };

        self.notify_incoming(64);
        self.callbacks.post(event);
    }

    // ---

    fn notify_incoming(&self, bytes: usize) {
        // ---
        let listener = lock(&self.listener).clone();
        if let Some(listener) = listener {
            listener.on_incoming(bytes);
        }
    }
}

// ---------------------------------------------------------------------------
// SimSessionClient
// ---------------------------------------------------------------------------

/// Simulated session link.
///
/// Handshake requests return immediately; the completion event is posted
/// to the shared [`SimCallbackManager`] either inline or, when
/// `handshake_latency` is non-zero, from a short-lived helper thread.
pub struct SimSessionClient {
    // ---
    inner: Arc<Inner>,
}

// ---

impl SimSessionClient {
    // ---
    pub fn new(callbacks: Arc<SimCallbackManager>, config: SimConfig) -> Self {
        // ---
        Self {
            inner: Arc::new(Inner {
                callbacks,
                config,
                connected: AtomicBool::new(false),
                logged_on: AtomicBool::new(false),
                connect_calls: AtomicU32::new(0),
                log_on_calls: AtomicU32::new(0),
                disconnect_calls: AtomicU32::new(0),
                connect_script: Mutex::new(VecDeque::new()),
                log_on_script: Mutex::new(VecDeque::new()),
                last_user: Mutex::new(None),
                listener: Mutex::new(None),
            }),
        }
    }

    // --- scripting ----------------------------------------------------------

    /// Answer the next `connect` with `outcome` instead of the config default.
    pub fn script_connect(&self, outcome: HandshakeOutcome) {
        lock(&self.inner.connect_script).push_back(outcome);
    }

    /// Answer the next `log_on` with `outcome` instead of the config default.
    pub fn script_log_on(&self, outcome: HandshakeOutcome) {
        lock(&self.inner.log_on_script).push_back(outcome);
    }

    /// Simulate the remote dropping the link.
    pub fn drop_link(&self) {
        self.inner.complete(Handshake::Connect, HandshakeOutcome::Drop);
    }

    // --- observation --------------------------------------------------------

    pub fn connect_calls(&self) -> u32 {
        self.inner.connect_calls.load(Ordering::SeqCst)
    }

    pub fn log_on_calls(&self) -> u32 {
        self.inner.log_on_calls.load(Ordering::SeqCst)
    }

    pub fn disconnect_calls(&self) -> u32 {
        self.inner.disconnect_calls.load(Ordering::SeqCst)
    }

    /// User name presented on the most recent `log_on`.
    pub fn last_user(&self) -> Option<String> {
        lock(&self.inner.last_user).clone()
    }

    pub fn has_network_listener(&self) -> bool {
        lock(&self.inner.listener).is_some()
    }

    /// Report `bytes` of inbound traffic to the installed listener.
    pub(crate) fn notify_incoming(&self, bytes: usize) {
        self.inner.notify_incoming(bytes);
    }

    // ---

    fn next_outcome(&self, handshake: Handshake) -> HandshakeOutcome {
        // ---
        let (script, default) = match handshake {
            Handshake::Connect => (&self.inner.connect_script, &self.inner.config.connect),
            Handshake::LogOn => (&self.inner.log_on_script, &self.inner.config.log_on),
        };
        lock(script).pop_front().unwrap_or_else(|| default.clone())
    }

    // ---

    fn begin(&self, handshake: Handshake) {
        // ---
        let outcome = self.next_outcome(handshake);
        let latency = self.inner.config.handshake_latency;

        if latency == Duration::ZERO {
            self.inner.complete(handshake, outcome);
            return;
        }

        let inner = Arc::clone(&self.inner);
        let delayed = outcome.clone();
        let spawned = std::thread::Builder::new()
            .name("lbsync-sim-handshake".into())
            .spawn(move || {
                std::thread::sleep(latency);
                inner.complete(handshake, delayed);
            });

        if let Err(e) = spawned {
            tracing::warn!("sim: handshake thread spawn failed ({e}), completing inline");
            self.inner.complete(handshake, outcome);
        }
    }
}

// ---

impl SessionClient for SimSessionClient {
    // ---
    fn connect(&self, endpoint: Option<SocketAddr>) {
        // ---
        self.inner.connect_calls.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(?endpoint, "sim: connect requested");
        self.begin(Handshake::Connect);
    }

    // ---

    fn log_on(&self, credentials: &Credentials) {
        // ---
        self.inner.log_on_calls.fetch_add(1, Ordering::SeqCst);
        *lock(&self.inner.last_user) = Some(credentials.user_name().to_string());
        tracing::debug!(user = credentials.user_name(), "sim: logon requested");
        self.begin(Handshake::LogOn);
    }

    // ---

    fn disconnect(&self) {
        // ---
        self.inner.disconnect_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.logged_on.store(false, Ordering::SeqCst);

        // Tearing down an idle link is a no-op: no event.
        if self.inner.connected.swap(false, Ordering::SeqCst) {
            self.inner.callbacks.post(SessionEvent::Disconnected {
                user_initiated: true,
            });
        }
    }

    // ---

    fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::SeqCst)
    }

    fn is_logged_on(&self) -> bool {
        self.inner.connected.load(Ordering::SeqCst) && self.inner.logged_on.load(Ordering::SeqCst)
    }

    // ---

    fn set_network_listener(&self, listener: Option<Arc<dyn NetworkListener>>) {
        *lock(&self.inner.listener) = listener;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
