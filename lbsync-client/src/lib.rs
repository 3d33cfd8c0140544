//! Session connection / retry orchestration for the lbsync leaderboard client.
//!
//! The remote SDK is callback driven: `connect` and `log_on` return at once
//! and their outcome arrives later on a dispatch thread. This crate turns
//! that into an awaitable, retryable request model.
//!
//! # Structure (leaves first)
//!
//! - [`BackoffProvider`]    — jittered exponential sleep durations
//! - [`CallbackBridge`]     — one-shot event subscriptions as awaitable results
//! - [`DispatchLoop`]       — the thread that pumps SDK callbacks
//! - [`SessionOrchestrator`] — single-flight connect + logon, `ensure_ready`
//! - [`RetryingExecutor`]   — bounded retry around individual remote calls
//! - [`LeaderboardClient`]  — leaderboard operations on top of all of the above
//!
//! ```text
//! caller ──► RetryingExecutor ──► SessionOrchestrator::ensure_ready
//!                 │                     │  gate (single-flight)
//!                 │                     ├─► SessionClient::connect / log_on
//!                 │                     └─► CallbackBridge ◄── DispatchLoop thread
//!                 └─► UserStats call ──► RemoteStatus check
//! ```

mod backoff;
mod bridge;
mod config;
mod dispatch;
mod executor;
mod leaderboards;
mod orchestrator;
mod progress;

// --- public API
pub use backoff::{jitter_bounds, sleep_duration_with_jitter, BackoffProvider};
pub use bridge::{BridgeFailure, CallbackBridge, PendingEvent};
pub use config::{ClientConfig, RetryPolicy, SessionConfig};
pub use dispatch::DispatchLoop;
pub use executor::RetryingExecutor;
pub use leaderboards::LeaderboardClient;
pub use orchestrator::SessionOrchestrator;
pub use progress::{ProgressListener, ProgressSink};

// ---

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock ignoring poison. Guarded sections here never leave state half-written.
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
