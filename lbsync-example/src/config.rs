//! CLI configuration for `lbsync-example`.
//!
//! Run modes:
//!   lbsync-example [--seed 7] find Speedrun Marathon
//!   lbsync-example [--timeout-percent 0.5] entries 739999 740000

use std::time::Duration;

use clap::{Parser, Subcommand};

// ---

use lbsync_client::{ClientConfig, RetryPolicy, SessionConfig};
use lbsync_sim::SimConfig;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Parser)]
#[command(
    name = "lbsync-example",
    about = "Fetch leaderboards through a retrying session against the simulator"
)]
pub struct Config {
    // ---
    #[command(subcommand)]
    pub mode: Mode,

    /// Account name presented at logon.
    #[arg(long, env = "LBSYNC_USER", default_value = "demo")]
    pub user: String,

    /// Account password presented at logon.
    #[arg(long, env = "LBSYNC_PASSWORD", default_value = "demo", hide_env_values = true)]
    pub password: String,

    /// Application whose leaderboards are queried.
    #[arg(long, default_value_t = 480)]
    pub app_id: u32,

    // --- retry policy -------------------------------------------------------
    /// Retries per operation after the first call.
    #[arg(long, default_value_t = 10)]
    pub max_attempts: u32,

    #[arg(long, default_value_t = 1_000)]
    pub min_backoff_ms: u64,

    #[arg(long, default_value_t = 20_000)]
    pub max_backoff_ms: u64,

    #[arg(long, default_value_t = 2_000)]
    pub delta_backoff_ms: u64,

    /// How long a caller waits for another caller's handshake.
    #[arg(long, default_value_t = 5_000)]
    pub gate_timeout_ms: u64,

    // --- simulator ----------------------------------------------------------
    /// Seed for both fault injection and backoff jitter. Random if omitted.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Probability (0.0 - 1.0) that a remote call times out.
    #[arg(long, default_value_t = 0.2)]
    pub timeout_percent: f64,

    /// Simulated connect / logon round trip.
    #[arg(long, default_value_t = 50)]
    pub handshake_latency_ms: u64,
}

// ---

#[derive(Debug, Subcommand)]
pub enum Mode {
    // ---
    /// Look leaderboards up by name, concurrently.
    Find {
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Download every entry of the given leaderboard ids, concurrently.
    Entries {
        #[arg(required = true)]
        ids: Vec<i32>,
    },
}

// ---

impl Config {
    // ---
    pub fn client_config(&self) -> anyhow::Result<ClientConfig> {
        // ---
        let retry = RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.min_backoff_ms),
            Duration::from_millis(self.max_backoff_ms),
            Duration::from_millis(self.delta_backoff_ms),
        )?;

        let session = SessionConfig {
            gate_timeout: Duration::from_millis(self.gate_timeout_ms),
            ..Default::default()
        };
        session.validate()?;

        Ok(ClientConfig { session, retry })
    }

    pub fn sim_config(&self) -> SimConfig {
        // ---
        SimConfig {
            handshake_latency: Duration::from_millis(self.handshake_latency_ms),
            call_latency: Duration::from_millis(20),
            timeout_percent: self.timeout_percent,
            seed: self.seed,
            ..SimConfig::perfect()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
