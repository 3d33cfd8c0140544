//! lbsync example — leaderboard sync against the simulated session SDK.
//!
//! Builds a [`SimPlatform`] seeded with a few demo leaderboards, wires a
//! [`LeaderboardClient`] to it and runs the requested lookups concurrently.
//! Every lookup shares one session: the first one to need it connects and
//! logs on, the rest wait on the handshake gate.
//!
//! Run with:
//!   cargo run -p lbsync-example -- find Speedrun Marathon Daily
//!   cargo run -p lbsync-example -- --seed 7 --timeout-percent 0.5 entries 739999 740000
//!   RUST_LOG=debug cargo run -p lbsync-example -- find Speedrun

use std::sync::Arc;

// ---

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

// ---

use lbsync_client::{BackoffProvider, LeaderboardClient};
use lbsync_domain::{Credentials, LeaderboardEntry};
use lbsync_sim::SimPlatform;

// ---

mod config;
mod sync;

use config::{Config, Mode};

/// Demo leaderboards loaded into the simulator: (name, id, entry count).
const DEMO_BOARDS: &[(&str, i32, u32)] = &[
    ("Speedrun", 739_999, 250),
    ("Marathon", 740_000, 40),
    ("Daily", 740_001, 1_200),
];

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ---
    let cfg = Config::parse();

    let no_color = std::env::var("EMACS").is_ok()
        || std::env::var("NO_COLOR").is_ok()
        || std::env::var("CARGO_TERM_COLOR").as_deref() == Ok("never")
        || !std::io::IsTerminal::is_terminal(&std::io::stdout());

    tracing_subscriber::fmt()
        .with_target(false)
        .with_ansi(!no_color)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "lbsync-example starting");

    let sim = demo_platform(&cfg);
    let backoff = match cfg.seed {
        Some(seed) => Arc::new(BackoffProvider::seeded(seed)),
        None => BackoffProvider::shared(),
    };

    let client = Arc::new(LeaderboardClient::with_backoff(
        Credentials::new(&cfg.user, &cfg.password)?,
        sim.client.clone(),
        sim.callbacks.clone(),
        sim.stats.clone(),
        cfg.client_config()?,
        backoff,
    )?);
    client.set_progress(Some(Arc::new(|bytes| tracing::trace!(bytes, "packet received"))))?;

    // Ctrl-C cancels pending gate waits and backoff sleeps.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupt received — cancelling");
                cancel.cancel();
            }
        });
    }

    let outcome = match &cfg.mode {
        Mode::Find { names } => sync::find_all(&client, cfg.app_id, names, &cancel).await,
        Mode::Entries { ids } => sync::entries_all(&client, cfg.app_id, ids, &cancel).await,
    };

    info!(
        connects = sim.client.connect_calls(),
        logons = sim.client.log_on_calls(),
        calls = sim.stats.calls(),
        bytes = client.bytes_received(),
        "session summary",
    );

    client.dispose();
    outcome
}

// ---------------------------------------------------------------------------
// Demo data
// ---------------------------------------------------------------------------

fn demo_platform(cfg: &Config) -> SimPlatform {
    // ---
    let sim = SimPlatform::new(cfg.sim_config());

    for &(name, id, count) in DEMO_BOARDS {
        let entries = (1..=count)
            .map(|rank| LeaderboardEntry {
                player_id: 76_561_197_960_265_728 + u64::from(rank),
                global_rank: rank as i32,
                score: 100_000 - (rank as i32) * 37,
                ugc_id: 0,
                details: Vec::new(),
            })
            .collect();
        sim.stats.add_leaderboard(name, id, entries);
    }

    sim
}
