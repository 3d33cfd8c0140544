use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ---

use async_trait::async_trait;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

// ---

use lbsync_domain::{
    // ---
    CallError,
    DataRequest,
    LeaderboardEntries,
    LeaderboardEntry,
    LeaderboardInfo,
    RemoteStatus,
    SessionClient,
    UserStats,
};

// ---

use super::{lock, CallOutcome, SimConfig, SimSessionClient};

/// Approximate wire size of one entry row, for progress reporting.
const ENTRY_WIRE_BYTES: usize = 32;

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Board {
    id: i32,
    name: String,
    entries: Vec<LeaderboardEntry>,
}

// ---------------------------------------------------------------------------
// SimUserStats
// ---------------------------------------------------------------------------

/// Simulated leaderboard endpoint.
///
/// Answers from an in-memory table. Every call first consults the scripted
/// outcome queue, then falls back to a seeded coin flip against
/// `timeout_percent`. The simulated player has no rank or friends, so only
/// [`DataRequest::Global`] ranges are served; other requests come back
/// with [`RemoteStatus::InvalidParam`].
pub struct SimUserStats {
    // ---
    client: Arc<SimSessionClient>,
    boards: Mutex<HashMap<String, Board>>,
    script: Mutex<VecDeque<CallOutcome>>,
    rng: Mutex<SmallRng>,
    call_latency: Duration,
    timeout_percent: f64,

    calls: AtomicU32,
    /// Calls that arrived while the session was not logged on.
    calls_while_logged_off: AtomicU32,
}

// ---

impl SimUserStats {
    // ---
    pub fn new(client: Arc<SimSessionClient>, config: &SimConfig) -> Self {
        // ---
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };

        Self {
            client,
            boards: Mutex::new(HashMap::new()),
            script: Mutex::new(VecDeque::new()),
            rng: Mutex::new(rng),
            call_latency: config.call_latency,
            timeout_percent: config.timeout_percent.clamp(0.0, 1.0),
            calls: AtomicU32::new(0),
            calls_while_logged_off: AtomicU32::new(0),
        }
    }

    // ---

    /// Add (or replace) a leaderboard. Entries are ranked in the given order.
    pub fn add_leaderboard(&self, name: &str, id: i32, entries: Vec<LeaderboardEntry>) {
        // ---
        let board = Board {
            id,
            name: name.to_string(),
            entries,
        };
        lock(&self.boards).insert(name.to_string(), board);
    }

    /// Answer the next call with `outcome`.
    pub fn script(&self, outcome: CallOutcome) {
        lock(&self.script).push_back(outcome);
    }

    /// Answer the next `n` calls with `outcome`.
    pub fn script_n(&self, outcome: CallOutcome, n: usize) {
        let mut script = lock(&self.script);
        script.extend(std::iter::repeat(outcome).take(n));
    }

    // ---

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn calls_while_logged_off(&self) -> u32 {
        self.calls_while_logged_off.load(Ordering::SeqCst)
    }

    // ---

    /// Common prologue: count, gate on logon, wait, pick an outcome.
    async fn begin_call(&self) -> Result<CallOutcome, CallError> {
        // ---
        self.calls.fetch_add(1, Ordering::SeqCst);

        if !self.client.is_logged_on() {
            self.calls_while_logged_off.fetch_add(1, Ordering::SeqCst);
            return Err(CallError::Transport("not logged on".into()));
        }

        if self.call_latency > Duration::ZERO {
            tokio::time::sleep(self.call_latency).await;
        }

        let scripted = lock(&self.script).pop_front();
        let outcome = match scripted {
            Some(outcome) => outcome,
            None if lock(&self.rng).gen_bool(self.timeout_percent) => CallOutcome::Timeout,
            None => CallOutcome::Respond,
        };

        match outcome {
            CallOutcome::Timeout => Err(CallError::Timeout),
            CallOutcome::Transport(reason) => Err(CallError::Transport(reason)),
            other => Ok(other),
        }
    }

    // ---

    fn board_by_id(&self, id: i32) -> Option<Board> {
        lock(&self.boards).values().find(|b| b.id == id).cloned()
    }
}

// ---

#[async_trait]
impl UserStats for SimUserStats {
    // ---
    async fn find_leaderboard(
        &self,
        app_id: u32,
        name: &str,
    ) -> Result<LeaderboardInfo, CallError> {
        // ---
        let outcome = self.begin_call().await?;
        tracing::debug!(app_id, name, ?outcome, "sim: find_leaderboard");

        let board = lock(&self.boards).get(name).cloned();
        let info = match (outcome, board) {
            (CallOutcome::Status(status), _) => LeaderboardInfo {
                status,
                id: 0,
                name: name.to_string(),
                entry_count: 0,
            },
            (_, Some(board)) => LeaderboardInfo {
                status: RemoteStatus::Ok,
                id: board.id,
                name: board.name,
                entry_count: board.entries.len() as i32,
            },
            (_, None) => LeaderboardInfo {
                status: RemoteStatus::Fail,
                id: 0,
                name: name.to_string(),
                entry_count: 0,
            },
        };

        self.client.notify_incoming(64 + name.len());
        Ok(info)
    }

    // ---

    async fn leaderboard_entries(
        &self,
        app_id: u32,
        leaderboard_id: i32,
        start: i32,
        end: i32,
        request: DataRequest,
    ) -> Result<LeaderboardEntries, CallError> {
        // ---
        let outcome = self.begin_call().await?;
        tracing::debug!(
            app_id,
            leaderboard_id,
            start,
            end,
            ?request,
            ?outcome,
            "sim: leaderboard_entries"
        );

        let empty = |status| LeaderboardEntries {
            status,
            leaderboard_id,
            entry_count: 0,
            entries: Vec::new(),
        };

        let result = match (outcome, self.board_by_id(leaderboard_id)) {
            (CallOutcome::Status(status), _) => empty(status),
            (_, None) => empty(RemoteStatus::Fail),
            (_, Some(_)) if request != DataRequest::Global => empty(RemoteStatus::InvalidParam),
            (_, Some(board)) => {
                // Ranks are 1-based and inclusive.
                let first = start.max(1) as usize - 1;
                let last = (end.max(0) as usize).min(board.entries.len());
                let entries = if first < last {
                    board.entries[first..last].to_vec()
                } else {
                    Vec::new()
                };
                LeaderboardEntries {
                    status: RemoteStatus::Ok,
                    leaderboard_id,
                    entry_count: board.entries.len() as i32,
                    entries,
                }
            }
        };

        self.client
            .notify_incoming(64 + result.entries.len() * ENTRY_WIRE_BYTES);
        Ok(result)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
