use std::time::Duration;

// ---

use lbsync_domain::RemoteStatus;

// ---------------------------------------------------------------------------
// HandshakeOutcome
// ---------------------------------------------------------------------------

/// How the simulated remote answers a `connect` or `log_on` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandshakeOutcome {
    // ---
    /// Post the completion event with [`RemoteStatus::Ok`].
    Accept,

    /// Post the completion event carrying this (non-OK) code.
    Reject(RemoteStatus),

    /// Drop the link and post `Disconnected` instead of a completion.
    Drop,
}

// ---------------------------------------------------------------------------
// CallOutcome
// ---------------------------------------------------------------------------

/// How the simulated remote answers one leaderboard call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    // ---
    /// Answer from the leaderboard table.
    Respond,

    /// Raise [`lbsync_domain::CallError::Timeout`].
    Timeout,

    /// Raise [`lbsync_domain::CallError::Transport`].
    Transport(String),

    /// Complete with this code and an empty payload.
    Status(RemoteStatus),
}

// ---------------------------------------------------------------------------
// SimConfig
// ---------------------------------------------------------------------------

/// Configuration for the in-process SDK simulator.
///
/// All fields default to a perfect remote: every handshake accepted, no
/// latency, no timeouts.
#[derive(Debug, Clone)]
pub struct SimConfig {
    // ---
    /// Default answer to `connect` when no scripted outcome is queued.
    pub connect: HandshakeOutcome,

    /// Default answer to `log_on` when no scripted outcome is queued.
    pub log_on: HandshakeOutcome,

    /// Delay between a handshake request and its completion event.
    pub handshake_latency: Duration,

    /// Delay before a leaderboard call completes.
    pub call_latency: Duration,

    /// Probability `[0.0, 1.0]` that an unscripted call times out.
    pub timeout_percent: f64,

    /// RNG seed for reproducible fault sequences. `None` = random.
    pub seed: Option<u64>,
}

// ---

impl Default for SimConfig {
    fn default() -> Self {
        // ---
        Self {
            connect: HandshakeOutcome::Accept,
            log_on: HandshakeOutcome::Accept,
            handshake_latency: Duration::ZERO,
            call_latency: Duration::ZERO,
            timeout_percent: 0.0,
            seed: None,
        }
    }
}

// ---

impl SimConfig {
    // ---
    /// Perfect remote — no impairments. Useful as a baseline.
    pub fn perfect() -> Self {
        Self::default()
    }

    // ---

    /// Busy remote: slow handshakes and one call in five timing out.
    pub fn flaky(seed: u64) -> Self {
        // ---
        Self {
            handshake_latency: Duration::from_millis(50),
            call_latency: Duration::from_millis(10),
            timeout_percent: 0.2,
            seed: Some(seed),
            ..Default::default()
        }
    }

    // ---

    /// Remote that never accepts a connection.
    pub fn refusing() -> Self {
        // ---
        Self {
            connect: HandshakeOutcome::Drop,
            ..Default::default()
        }
    }
}
