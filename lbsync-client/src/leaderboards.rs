//! [`LeaderboardClient`] — leaderboard lookups over a managed session.
//!
//! The facade wires the SDK collaborators to one [`SessionOrchestrator`]
//! and one [`RetryingExecutor`], installs a [`ProgressListener`] on the
//! session client, and exposes the two leaderboard operations the sync
//! workflow needs. Every operation brings the session up on demand.

use std::sync::Arc;

// ---

use tokio_util::sync::CancellationToken;

// ---

use lbsync_domain::{
    // ---
    CallbackManager,
    Credentials,
    DataRequest,
    LbError,
    LeaderboardEntries,
    LeaderboardInfo,
    NetworkListener,
    Result,
    SessionClient,
    UserStats,
};

// ---

use super::{
    // ---
    BackoffProvider,
    ClientConfig,
    ProgressListener,
    ProgressSink,
    RetryingExecutor,
    SessionOrchestrator,
};

// ---------------------------------------------------------------------------
// LeaderboardClient
// ---------------------------------------------------------------------------

pub struct LeaderboardClient {
    // ---
    session: SessionOrchestrator,
    executor: RetryingExecutor,
    client: Arc<dyn SessionClient>,
    stats: Arc<dyn UserStats>,
    progress: Arc<ProgressListener>,
}

// ---

impl LeaderboardClient {
    // ---
    /// Build a client using the process-wide [`BackoffProvider`].
    ///
    /// # Errors
    ///
    /// [`LbError::ArgumentInvalid`] for empty credentials or an invalid
    /// config; [`LbError::Io`] if the dispatch thread cannot be spawned.
    pub fn new(
        user_name: &str,
        password: &str,
        client: Arc<dyn SessionClient>,
        callbacks: Arc<dyn CallbackManager>,
        stats: Arc<dyn UserStats>,
        config: ClientConfig,
    ) -> Result<Self> {
        // ---
        let credentials = Credentials::new(user_name, password)?;
        Self::with_backoff(credentials, client, callbacks, stats, config, BackoffProvider::shared())
    }

    /// Build a client with an explicit backoff source.
    pub fn with_backoff(
        credentials: Credentials,
        client: Arc<dyn SessionClient>,
        callbacks: Arc<dyn CallbackManager>,
        stats: Arc<dyn UserStats>,
        config: ClientConfig,
        backoff: Arc<BackoffProvider>,
    ) -> Result<Self> {
        // ---
        config.retry.validate()?;

        let session = SessionOrchestrator::new(
            Arc::clone(&client),
            callbacks,
            credentials,
            config.session,
        )?;
        let executor = RetryingExecutor::new(session.clone(), backoff, config.retry)?;

        let progress = Arc::new(ProgressListener::new());
        let listener: Arc<dyn NetworkListener> = progress.clone();
        client.set_network_listener(Some(listener));

        Ok(Self {
            session,
            executor,
            client,
            stats,
            progress,
        })
    }

    // ---

    /// Look a leaderboard up by name.
    pub async fn find_leaderboard(
        &self,
        app_id: u32,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<LeaderboardInfo> {
        // ---
        self.check_disposed()?;

        let operation = format!("find leaderboard '{name}'");
        let stats = &*self.stats;
        let info = self
            .executor
            .execute(&operation, move || stats.find_leaderboard(app_id, name), cancel)
            .await?;

        tracing::info!(id = info.id, entries = info.entry_count, "found leaderboard '{name}'");
        Ok(info)
    }

    /// Download every global entry of a leaderboard.
    pub async fn leaderboard_entries(
        &self,
        app_id: u32,
        leaderboard_id: i32,
        cancel: &CancellationToken,
    ) -> Result<LeaderboardEntries> {
        // ---
        self.check_disposed()?;

        let operation = format!("leaderboard entries #{leaderboard_id}");
        let stats = &*self.stats;
        let entries = self
            .executor
            .execute(
                &operation,
                move || {
                    let request = DataRequest::Global;
                    stats.leaderboard_entries(app_id, leaderboard_id, 0, i32::MAX, request)
                },
                cancel,
            )
            .await?;

        tracing::info!(leaderboard_id, count = entries.entries.len(), "entries downloaded");
        Ok(entries)
    }

    // ---

    /// Bring the session up without issuing a request.
    pub async fn connect(&self, cancel: &CancellationToken) -> Result<()> {
        self.session.ensure_ready(cancel).await
    }

    /// Tear the link down; the next operation reconnects.
    pub async fn disconnect(&self) -> Result<()> {
        self.session.disconnect().await
    }

    /// Disconnect and release the SDK. Idempotent; every later call fails
    /// with [`LbError::Disposed`].
    pub fn dispose(&self) {
        // ---
        if self.session.is_disposed() {
            return;
        }
        self.session.dispose();
        self.client.set_network_listener(None);
    }

    pub fn session(&self) -> &SessionOrchestrator {
        &self.session
    }

    // ---

    /// Current progress sink, if one is installed.
    pub fn progress(&self) -> Result<Option<ProgressSink>> {
        self.check_disposed()?;
        Ok(self.progress.sink())
    }

    /// Install (or clear) the per-packet progress sink.
    pub fn set_progress(&self, sink: Option<ProgressSink>) -> Result<()> {
        self.check_disposed()?;
        self.progress.set_sink(sink);
        Ok(())
    }

    /// Total inbound bytes seen on the session link.
    pub fn bytes_received(&self) -> u64 {
        self.progress.received()
    }

    // ---

    fn check_disposed(&self) -> Result<()> {
        if self.session.is_disposed() {
            return Err(LbError::Disposed);
        }
        Ok(())
    }
}

// ---

impl Drop for LeaderboardClient {
    fn drop(&mut self) {
        self.dispose();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
