//! [`SessionOrchestrator`] — owns the remote session and guarantees it is
//! connected and logged on before any domain call goes out.
//!
//! # Single flight
//!
//! Many tasks may call [`SessionOrchestrator::ensure_ready`] at once. At
//! most one connect/logon sequence runs at a time: callers queue on an async
//! gate, and whoever gets through first does the handshake. Everyone after
//! it re-checks the SDK flags and finds the session already up.
//!
//! ```text
//! ensure_ready ─► disposed? ─► SDK ready? ──yes──► Ok
//!                                  │ no
//!                                  ▼
//!                 gate (timeout / cancel / dispose)
//!                                  │ acquired
//!                                  ▼
//!               handshake task (owns the gate guard)
//!                 connect ─► Connected ─► log_on ─► LoggedOn
//! ```
//!
//! # Cancellation
//!
//! A caller's token only covers the wait for the gate. Once the gate is
//! granted, the handshake runs in its own task holding the guard, so a
//! caller that gives up cannot leave the SDK half way through a handshake
//! with the gate released. Disposal is the one thing that ends an in-flight
//! handshake early.
//!
//! # State
//!
//! The SDK's own flags are the source of truth. The published
//! [`ConnectionState`] adds the in-flight phases (`Connecting`, `LoggingOn`)
//! that the flags cannot express.
//!
//! # Teardown events
//!
//! Every teardown posts a `Disconnected` event, which the dispatch thread
//! delivers some time later. [`SessionOrchestrator::disconnect`] holds the
//! gate until its own event has been consumed, so a reconnect that follows
//! it cannot mistake that event for a failed connect. A teardown the remote
//! initiated is not awaited; if its event reaches a connect wait after the
//! SDK already reports the link up, the flags win and the event is ignored.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

// ---

use tokio::sync::{watch, Mutex, OwnedMutexGuard};
use tokio_util::sync::CancellationToken;

// ---

use lbsync_domain::{
    // ---
    CallbackManager,
    ConnectionState,
    Credentials,
    LbError,
    Result,
    SessionClient,
    SessionEvent,
    SessionEventKind,
};

// ---

use super::{BridgeFailure, CallbackBridge, DispatchLoop, PendingEvent, SessionConfig};

// ---------------------------------------------------------------------------
// SessionOrchestrator
// ---------------------------------------------------------------------------

/// Cheap-clone handle; all clones drive the same session.
#[derive(Clone)]
pub struct SessionOrchestrator {
    // ---
    shared: Arc<Shared>,
}

// ---

struct Shared {
    // ---
    client: Arc<dyn SessionClient>,
    bridge: CallbackBridge,
    credentials: Credentials,
    endpoint: Option<SocketAddr>,

    /// Serialises connect/logon sequences.
    gate: Arc<Mutex<()>>,
    gate_timeout: Duration,

    state_tx: watch::Sender<ConnectionState>,

    disposed: AtomicBool,
    shutdown: CancellationToken,
    dispatch: DispatchLoop,
}

// ---

impl SessionOrchestrator {
    // ---
    /// Wire the orchestrator to the SDK and start the dispatch thread.
    pub fn new(
        client: Arc<dyn SessionClient>,
        callbacks: Arc<dyn CallbackManager>,
        credentials: Credentials,
        config: SessionConfig,
    ) -> Result<Self> {
        // ---
        config.validate()?;

        let dispatch = DispatchLoop::spawn(Arc::clone(&callbacks), config.dispatch_poll)?;
        let initial = ConnectionState::project(client.is_connected(), client.is_logged_on());
        let (state_tx, _) = watch::channel(initial);

        let shared = Shared {
            client,
            bridge: CallbackBridge::new(callbacks),
            credentials,
            endpoint: config.endpoint,
            gate: Arc::new(Mutex::new(())),
            gate_timeout: config.gate_timeout,
            state_tx,
            disposed: AtomicBool::new(false),
            shutdown: CancellationToken::new(),
            dispatch,
        };

        Ok(Self {
            shared: Arc::new(shared),
        })
    }

    // ---

    /// Return once the session is connected and logged on, running the
    /// handshake if needed.
    ///
    /// # Errors
    ///
    /// - [`LbError::Disposed`] after [`dispose`](Self::dispose)
    /// - [`LbError::Cancelled`] if `cancel` fires while waiting for the gate
    /// - [`LbError::GateTimeout`] if another handshake holds the gate too long
    /// - [`LbError::ConnectionFailure`] / [`LbError::LogonFailure`] from the handshake
    pub async fn ensure_ready(&self, cancel: &CancellationToken) -> Result<()> {
        // ---
        self.shared.check_disposed()?;
        if self.shared.is_ready() {
            return Ok(());
        }

        let guard = self.shared.acquire_gate(cancel).await?;

        // From here the sequence belongs to its own task; dropping this
        // future only stops us from observing the outcome.
        let shared = Arc::clone(&self.shared);
        let sequence = tokio::spawn(async move {
            let _guard = guard;
            shared.connect_and_log_on().await
        });

        sequence
            .await
            .map_err(|e| LbError::HandshakeAborted(e.to_string()))?
    }

    // ---

    /// Current state: the in-flight phase if a handshake is running,
    /// otherwise the projection of the SDK flags.
    pub fn state(&self) -> ConnectionState {
        // ---
        let phase = *self.shared.state_tx.borrow();
        if phase.is_in_flight() {
            phase
        } else {
            self.shared.projected()
        }
    }

    /// Receiver of every published state change.
    pub fn state_rx(&self) -> watch::Receiver<ConnectionState> {
        self.shared.state_tx.subscribe()
    }

    pub fn is_connected(&self) -> bool {
        self.shared.client.is_connected()
    }

    pub fn is_logged_on(&self) -> bool {
        self.shared.is_ready()
    }

    pub fn is_disposed(&self) -> bool {
        self.shared.disposed.load(Ordering::Acquire)
    }

    // ---

    /// Tear the link down and wait for the SDK to report it. The next
    /// [`ensure_ready`](Self::ensure_ready) reconnects.
    ///
    /// Runs under the gate: a handshake in flight finishes first.
    ///
    /// # Errors
    ///
    /// [`LbError::Disposed`], or [`LbError::GateTimeout`] if a handshake
    /// holds the gate too long.
    pub async fn disconnect(&self) -> Result<()> {
        // ---
        self.shared.check_disposed()?;
        let _guard = self.shared.acquire_gate(&CancellationToken::new()).await?;

        tracing::info!("disconnecting session");
        self.shared.tear_down().await
    }

    /// Disconnect if connected, stop the dispatch thread and fail every
    /// present and future caller with [`LbError::Disposed`]. Idempotent.
    pub fn dispose(&self) {
        // ---
        if self.shared.disposed.swap(true, Ordering::AcqRel) {
            return;
        }

        tracing::info!("disposing session orchestrator");
        self.shared.shutdown.cancel();
        if self.shared.client.is_connected() {
            self.shared.client.disconnect();
        }
        self.shared.dispatch.stop();
        self.shared.publish(ConnectionState::Disconnected);
    }
}

// ---------------------------------------------------------------------------
// Handshake
// ---------------------------------------------------------------------------

impl Shared {
    // ---
    fn check_disposed(&self) -> Result<()> {
        if self.disposed.load(Ordering::Acquire) {
            return Err(LbError::Disposed);
        }
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.client.is_connected() && self.client.is_logged_on()
    }

    fn projected(&self) -> ConnectionState {
        ConnectionState::project(self.client.is_connected(), self.client.is_logged_on())
    }

    /// Wait for the gate, giving up on cancel, disposal or `gate_timeout`.
    async fn acquire_gate(&self, cancel: &CancellationToken) -> Result<OwnedMutexGuard<()>> {
        // ---
        let gate = Arc::clone(&self.gate);
        let gate_timeout = self.gate_timeout;

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(LbError::Cancelled),
            _ = self.shutdown.cancelled() => Err(LbError::Disposed),
            acquired = tokio::time::timeout(gate_timeout, gate.lock_owned()) => {
                acquired.map_err(|_| LbError::GateTimeout(gate_timeout))
            }
        }
    }

    fn publish(&self, state: ConnectionState) {
        // ---
        let previous = self.state_tx.send_replace(state);
        if previous != state {
            tracing::debug!("session state {previous:?} → {state:?}");
        }
    }

    // ---

    /// Runs with the gate held. Each step re-checks the SDK flags, since a
    /// previous holder may already have done the work.
    async fn connect_and_log_on(&self) -> Result<()> {
        // ---
        self.check_disposed()?;

        if !self.client.is_connected() {
            // ---
            self.publish(ConnectionState::Connecting);
            let pending = self
                .bridge
                .one_of(SessionEventKind::Connected, SessionEventKind::Disconnected);
            self.client.connect(self.endpoint);

            match self.settle(pending).await? {
                Err(failure) if failure.status.is_none() && self.client.is_connected() => {
                    tracing::debug!("ignoring stale disconnect; link is up");
                }
                Err(failure) => {
                    tracing::warn!(code = ?failure.status, "connect failed ({:?})", failure.kind);
                    self.publish(self.projected());
                    return Err(LbError::ConnectionFailure {
                        code: failure.status,
                    });
                }
                Ok(_) => {}
            }

            tracing::info!("connected to remote");
            self.publish(ConnectionState::Connected);
        }

        if !self.client.is_logged_on() {
            // ---
            self.publish(ConnectionState::LoggingOn);
            let pending = self
                .bridge
                .one_of(SessionEventKind::LoggedOn, SessionEventKind::Disconnected);
            self.client.log_on(&self.credentials);

            match self.settle(pending).await? {
                Err(failure) if failure.status.is_none() && self.client.is_logged_on() => {
                    tracing::debug!("ignoring stale disconnect; logged on");
                }
                Err(failure) => {
                    tracing::warn!(code = ?failure.status, "logon failed ({:?})", failure.kind);
                    self.publish(self.projected());
                    return Err(LbError::LogonFailure {
                        code: failure.status,
                    });
                }
                Ok(_) => {}
            }

            tracing::info!(user = self.credentials.user_name(), "logged on");
        }

        self.publish(ConnectionState::LoggedOn);
        Ok(())
    }

    /// Disconnect and consume the resulting `Disconnected` event. Caller
    /// holds the gate.
    async fn tear_down(&self) -> Result<()> {
        // ---
        if !self.client.is_connected() {
            self.client.disconnect();
            self.publish(ConnectionState::Disconnected);
            return Ok(());
        }

        let teardown = self.bridge.next(SessionEventKind::Disconnected);
        self.client.disconnect();
        self.publish(ConnectionState::Disconnected);

        match tokio::time::timeout(self.gate_timeout, self.settle(teardown)).await {
            Ok(settled) => settled.map(drop),
            Err(_) => {
                tracing::warn!("no disconnect event within {:?}", self.gate_timeout);
                Ok(())
            }
        }
    }

    /// Wait for a handshake event, abandoning the wait on disposal.
    async fn settle(
        &self,
        pending: PendingEvent,
    ) -> Result<std::result::Result<SessionEvent, BridgeFailure>> {
        // ---
        tokio::select! {
            outcome = pending.wait() => Ok(outcome),
            _ = self.shutdown.cancelled() => Err(LbError::Disposed),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    // ---
    use lbsync_domain::RemoteStatus;
    use lbsync_sim::{HandshakeOutcome, SimConfig, SimPlatform};

    use super::*;

    fn credentials() -> Credentials {
        Credentials::new("alice", "hunter2").unwrap()
    }

    fn poll_config() -> SessionConfig {
        SessionConfig {
            dispatch_poll: Duration::from_millis(5),
            ..Default::default()
        }
    }

    fn orchestrator(sim: &SimPlatform, config: SessionConfig) -> SessionOrchestrator {
        SessionOrchestrator::new(sim.client.clone(), sim.callbacks.clone(), credentials(), config)
            .unwrap()
    }

    fn slow(latency: Duration) -> SimConfig {
        SimConfig {
            handshake_latency: latency,
            ..SimConfig::perfect()
        }
    }

    #[tokio::test]
    async fn handshake_reaches_logged_on() {
        // ---
        let sim = SimPlatform::new(SimConfig::perfect());
        let session = orchestrator(&sim, poll_config());
        assert_eq!(session.state(), ConnectionState::Disconnected);

        session.ensure_ready(&CancellationToken::new()).await.unwrap();

        assert_eq!(session.state(), ConnectionState::LoggedOn);
        assert_eq!(*session.state_rx().borrow(), ConnectionState::LoggedOn);
        assert_eq!(sim.client.connect_calls(), 1);
        assert_eq!(sim.client.log_on_calls(), 1);
        assert_eq!(sim.client.last_user().as_deref(), Some("alice"));
        assert_eq!(sim.callbacks.subscription_count(), 0);
    }

    /// Collect published states, collapsing repeats, until `last` shows up
    /// after the initial value.
    async fn record(
        mut rx: watch::Receiver<ConnectionState>,
        last: ConnectionState,
    ) -> Vec<ConnectionState> {
        // ---
        let mut seen = vec![*rx.borrow_and_update()];
        while rx.changed().await.is_ok() {
            let state = *rx.borrow_and_update();
            if seen.last() != Some(&state) {
                seen.push(state);
            }
            if state == last {
                break;
            }
        }
        seen
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn handshake_publishes_each_phase_in_order() {
        // ---
        let sim = SimPlatform::new(slow(Duration::from_millis(20)));
        let session = orchestrator(&sim, poll_config());
        let recorder = tokio::spawn(record(session.state_rx(), ConnectionState::LoggedOn));

        session.ensure_ready(&CancellationToken::new()).await.unwrap();
        let seen = tokio::time::timeout(Duration::from_secs(5), recorder)
            .await
            .expect("recorder finished")
            .unwrap();

        // Connected is followed at once by LoggingOn, so a receiver may
        // only ever see the later value.
        let phases: Vec<_> = seen
            .iter()
            .copied()
            .filter(|s| *s != ConnectionState::Connected)
            .collect();
        assert_eq!(
            phases,
            vec![
                ConnectionState::Disconnected,
                ConnectionState::Connecting,
                ConnectionState::LoggingOn,
                ConnectionState::LoggedOn,
            ],
            "{seen:?}"
        );
        if let Some(at) = seen.iter().position(|s| *s == ConnectionState::Connected) {
            assert_eq!(seen[at - 1], ConnectionState::Connecting, "{seen:?}");
            assert_eq!(seen[at + 1], ConnectionState::LoggingOn, "{seen:?}");
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn rejected_connect_falls_back_to_disconnected() {
        // ---
        let sim = SimPlatform::new(slow(Duration::from_millis(20)));
        sim.client
            .script_connect(HandshakeOutcome::Reject(RemoteStatus::ServiceUnavailable));
        let session = orchestrator(&sim, poll_config());
        let recorder = tokio::spawn(record(session.state_rx(), ConnectionState::Disconnected));

        let err = session.ensure_ready(&CancellationToken::new()).await.unwrap_err();
        let seen = tokio::time::timeout(Duration::from_secs(5), recorder)
            .await
            .expect("recorder finished")
            .unwrap();

        assert!(matches!(err, LbError::ConnectionFailure { .. }));
        assert_eq!(
            seen,
            vec![
                ConnectionState::Disconnected,
                ConnectionState::Connecting,
                ConnectionState::Disconnected,
            ]
        );
        assert_eq!(session.state(), ConnectionState::Disconnected);
        assert_eq!(sim.client.log_on_calls(), 0);
    }

    #[tokio::test]
    async fn ready_session_short_circuits() {
        // ---
        let sim = SimPlatform::new(SimConfig::perfect());
        let session = orchestrator(&sim, poll_config());
        let cancel = CancellationToken::new();

        session.ensure_ready(&cancel).await.unwrap();
        session.ensure_ready(&cancel).await.unwrap();

        assert_eq!(sim.client.connect_calls(), 1);
        assert_eq!(sim.client.log_on_calls(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_callers_share_one_handshake() {
        // ---
        let sim = SimPlatform::new(slow(Duration::from_millis(50)));
        let session = orchestrator(&sim, poll_config());

        let callers: Vec<_> = (0..16)
            .map(|_| {
                let session = session.clone();
                tokio::spawn(async move { session.ensure_ready(&CancellationToken::new()).await })
            })
            .collect();

        for caller in callers {
            caller.await.unwrap().unwrap();
        }

        assert_eq!(sim.client.connect_calls(), 1);
        assert_eq!(sim.client.log_on_calls(), 1);
        assert_eq!(sim.callbacks.subscription_count(), 0);
    }

    #[tokio::test]
    async fn disconnect_before_connected_never_logs_on() {
        // ---
        let sim = SimPlatform::new(SimConfig::perfect());
        sim.client.script_connect(HandshakeOutcome::Drop);
        let session = orchestrator(&sim, poll_config());

        let err = session.ensure_ready(&CancellationToken::new()).await.unwrap_err();

        assert!(matches!(err, LbError::ConnectionFailure { code: None }), "{err}");
        assert_eq!(sim.client.log_on_calls(), 0);
        assert_eq!(session.state(), ConnectionState::Disconnected);
        assert_eq!(sim.callbacks.subscription_count(), 0);
    }

    #[tokio::test]
    async fn rejected_connect_carries_code() {
        // ---
        let sim = SimPlatform::new(SimConfig::perfect());
        sim.client
            .script_connect(HandshakeOutcome::Reject(RemoteStatus::ServiceUnavailable));
        let session = orchestrator(&sim, poll_config());

        let err = session.ensure_ready(&CancellationToken::new()).await.unwrap_err();
        assert_eq!(err.code(), Some(RemoteStatus::ServiceUnavailable));
        assert!(matches!(err, LbError::ConnectionFailure { .. }));
    }

    #[tokio::test]
    async fn rejected_logon_carries_code_and_keeps_link() {
        // ---
        let sim = SimPlatform::new(SimConfig::perfect());
        sim.client
            .script_log_on(HandshakeOutcome::Reject(RemoteStatus::InvalidPassword));
        let session = orchestrator(&sim, poll_config());

        let err = session.ensure_ready(&CancellationToken::new()).await.unwrap_err();

        assert!(matches!(
            err,
            LbError::LogonFailure {
                code: Some(RemoteStatus::InvalidPassword)
            }
        ));
        assert!(!err.is_transient());
        assert_eq!(session.state(), ConnectionState::Connected);

        // Second attempt reuses the link and only logs on again.
        session.ensure_ready(&CancellationToken::new()).await.unwrap();
        assert_eq!(sim.client.connect_calls(), 1);
        assert_eq!(sim.client.log_on_calls(), 2);
    }

    #[tokio::test]
    async fn reconnects_after_link_drop() {
        // ---
        let sim = SimPlatform::new(SimConfig::perfect());
        let session = orchestrator(&sim, poll_config());
        let cancel = CancellationToken::new();

        session.ensure_ready(&cancel).await.unwrap();
        sim.client.drop_link();
        assert_eq!(session.state(), ConnectionState::Disconnected);

        // No pause: the drop's event may still be queued when we reconnect.
        session.ensure_ready(&cancel).await.unwrap();
        assert_eq!(sim.client.connect_calls(), 2);
        assert!(session.is_logged_on());
    }

    #[tokio::test]
    async fn repeated_link_drops_reconnect_immediately() {
        // ---
        let sim = SimPlatform::new(SimConfig::perfect());
        let session = orchestrator(&sim, poll_config());
        let cancel = CancellationToken::new();

        session.ensure_ready(&cancel).await.unwrap();
        for round in 0..100 {
            sim.client.drop_link();
            if let Err(err) = session.ensure_ready(&cancel).await {
                panic!("round {round}: {err}");
            }
        }

        assert_eq!(sim.client.connect_calls(), 101);
        assert_eq!(sim.client.log_on_calls(), 101);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn cancelled_gate_wait_leaves_handshake_running() {
        // ---
        let sim = SimPlatform::new(slow(Duration::from_millis(200)));
        let session = orchestrator(&sim, poll_config());

        let first = {
            let session = session.clone();
            tokio::spawn(async move { session.ensure_ready(&CancellationToken::new()).await })
        };
        tokio::time::sleep(Duration::from_millis(30)).await;

        let cancel = CancellationToken::new();
        let waiter = {
            let session = session.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { session.ensure_ready(&cancel).await })
        };
        tokio::time::sleep(Duration::from_millis(30)).await;
        cancel.cancel();

        assert!(matches!(waiter.await.unwrap(), Err(LbError::Cancelled)));
        first.await.unwrap().unwrap();
        assert_eq!(sim.client.connect_calls(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn dropped_caller_does_not_abort_handshake() {
        // ---
        let sim = SimPlatform::new(slow(Duration::from_millis(100)));
        let session = orchestrator(&sim, poll_config());

        let first = {
            let session = session.clone();
            tokio::spawn(async move { session.ensure_ready(&CancellationToken::new()).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        first.abort();

        // The gate is still held by the orphaned handshake, which completes.
        session.ensure_ready(&CancellationToken::new()).await.unwrap();
        assert_eq!(sim.client.connect_calls(), 1);
        assert_eq!(sim.client.log_on_calls(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn gate_wait_times_out() {
        // ---
        let sim = SimPlatform::new(slow(Duration::from_millis(400)));
        let config = SessionConfig {
            gate_timeout: Duration::from_millis(50),
            ..poll_config()
        };
        let session = orchestrator(&sim, config);

        let first = {
            let session = session.clone();
            tokio::spawn(async move { session.ensure_ready(&CancellationToken::new()).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        let err = session.ensure_ready(&CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, LbError::GateTimeout(_)));
        assert!(err.is_transient());

        first.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn disconnect_then_ready_again() {
        // ---
        let sim = SimPlatform::new(SimConfig::perfect());
        let session = orchestrator(&sim, poll_config());
        let cancel = CancellationToken::new();

        session.ensure_ready(&cancel).await.unwrap();
        session.disconnect().await.unwrap();
        assert_eq!(session.state(), ConnectionState::Disconnected);
        assert_eq!(sim.client.disconnect_calls(), 1);

        session.ensure_ready(&cancel).await.unwrap();
        assert_eq!(sim.client.connect_calls(), 2);
        assert_eq!(sim.callbacks.subscription_count(), 0);
    }

    #[tokio::test]
    async fn disconnect_and_reconnect_back_to_back() {
        // ---
        let sim = SimPlatform::new(SimConfig::perfect());
        let session = orchestrator(&sim, poll_config());
        let cancel = CancellationToken::new();

        session.ensure_ready(&cancel).await.unwrap();
        for round in 0..200 {
            session.disconnect().await.unwrap();
            if let Err(err) = session.ensure_ready(&cancel).await {
                panic!("round {round}: {err}");
            }
        }

        assert_eq!(sim.client.connect_calls(), 201);
        assert_eq!(sim.client.disconnect_calls(), 200);
        assert_eq!(sim.callbacks.subscription_count(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn disconnect_waits_for_in_flight_handshake() {
        // ---
        let sim = SimPlatform::new(slow(Duration::from_millis(50)));
        let session = orchestrator(&sim, poll_config());

        let first = {
            let session = session.clone();
            tokio::spawn(async move { session.ensure_ready(&CancellationToken::new()).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        session.disconnect().await.unwrap();
        first.await.unwrap().unwrap();

        assert_eq!(sim.client.log_on_calls(), 1);
        assert!(!session.is_connected());
        assert_eq!(session.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn disconnect_on_idle_session_returns_at_once() {
        // ---
        let sim = SimPlatform::new(SimConfig::perfect());
        let session = orchestrator(&sim, poll_config());

        session.disconnect().await.unwrap();

        assert_eq!(sim.client.disconnect_calls(), 1);
        assert_eq!(sim.callbacks.subscription_count(), 0);
    }

    #[tokio::test]
    async fn dispose_disconnects_and_rejects_later_calls() {
        // ---
        let sim = SimPlatform::new(SimConfig::perfect());
        let session = orchestrator(&sim, poll_config());

        session.ensure_ready(&CancellationToken::new()).await.unwrap();
        session.dispose();
        session.dispose();

        assert!(session.is_disposed());
        assert_eq!(sim.client.disconnect_calls(), 1);
        assert!(matches!(
            session.ensure_ready(&CancellationToken::new()).await,
            Err(LbError::Disposed)
        ));
        assert!(matches!(session.disconnect().await, Err(LbError::Disposed)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn dispose_releases_in_flight_callers() {
        // ---
        let sim = SimPlatform::new(slow(Duration::from_secs(2)));
        let session = orchestrator(&sim, poll_config());

        let callers: Vec<_> = (0..3)
            .map(|_| {
                let session = session.clone();
                tokio::spawn(async move { session.ensure_ready(&CancellationToken::new()).await })
            })
            .collect();
        tokio::time::sleep(Duration::from_millis(50)).await;

        session.dispose();

        for caller in callers {
            let outcome = tokio::time::timeout(Duration::from_secs(1), caller)
                .await
                .expect("caller released")
                .unwrap();
            assert!(matches!(outcome, Err(LbError::Disposed)));
        }
    }

    #[test]
    fn zero_poll_is_rejected() {
        // ---
        let sim = SimPlatform::new(SimConfig::perfect());
        let config = SessionConfig {
            dispatch_poll: Duration::ZERO,
            ..Default::default()
        };
        let outcome = SessionOrchestrator::new(
            sim.client.clone(),
            sim.callbacks.clone(),
            credentials(),
            config,
        );
        assert!(matches!(outcome, Err(LbError::ArgumentInvalid(_))));
    }
}
