//! In-process simulated session SDK for lbsync unit and integration testing.
//!
//! [`SimPlatform`] bundles the three SDK collaborators the client layer
//! consumes, all sharing one event queue:
//!
//! - [`SimCallbackManager`] — subscription registry + event pump
//! - [`SimSessionClient`]   — connect / logon handshakes driven by a script
//! - [`SimUserStats`]       — leaderboard calls with injectable faults
//!
//! [`SimConfig`] controls the defaults:
//!
//! - Handshake outcome (accept, reject with a code, drop the link)
//! - Handshake and call latency
//! - Call timeout probability
//! - Deterministic RNG seed for reproducible runs
//!
//! Every collaborator counts what was asked of it so tests can assert on
//! exactly how many connects, logons and calls were issued.
//!
//! # Quick start
//!
//! ```rust
//! use lbsync_sim::{SimConfig, SimPlatform};
//!
//! let sim = SimPlatform::new(SimConfig::perfect());
//! sim.stats.add_leaderboard("Speedrun", 739999, Vec::new());
//! ```

mod callbacks;
mod client;
mod config;
mod platform;
mod stats;

// --- public API
pub use callbacks::SimCallbackManager;
pub use client::SimSessionClient;
pub use config::{CallOutcome, HandshakeOutcome, SimConfig};
pub use platform::SimPlatform;
pub use stats::SimUserStats;

// ---

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock ignoring poison: sim state stays usable after a panicking test handler.
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
