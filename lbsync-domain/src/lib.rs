//! Core traits and types for the lbsync leaderboard session client.
//!
//! This crate defines the vocabulary of the system. All other crates depend
//! on `lbsync-domain` and speak its types. No implementations live here.
//!
//! # Structure
//!
//! - [`error`]       — [`LbError`], [`CallError`] and [`Result<T>`] alias
//! - [`status`]      — [`RemoteStatus`] result codes reported by the remote platform
//! - [`credentials`] — validated [`Credentials`]
//! - [`state`]       — [`ConnectionState`] handshake state machine
//! - [`event`]       — [`SessionEvent`], [`SessionEventKind`]
//! - [`sdk`]         — [`SessionClient`], [`CallbackManager`], [`UserStats`] collaborator traits
//! - [`leaderboard`] — leaderboard records returned by [`UserStats`]

mod credentials;
mod error;
mod event;
mod leaderboard;
mod sdk;
mod state;
mod status;

// --- error
pub use error::{CallError, LbError, Result};

// --- status
pub use status::RemoteStatus;

// --- credentials
pub use credentials::Credentials;

// --- state
pub use state::ConnectionState;

// --- event
pub use event::{SessionEvent, SessionEventKind};

// --- sdk
pub use sdk::{
    // ---
    CallbackManager,
    EventHandler,
    NetworkListener,
    RemoteResult,
    SessionClient,
    Subscription,
    UserStats,
};

// --- leaderboard
pub use leaderboard::{
    // ---
    DataRequest,
    LeaderboardEntries,
    LeaderboardEntry,
    LeaderboardInfo,
};
