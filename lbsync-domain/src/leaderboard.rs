use super::sdk::RemoteResult;
use super::status::RemoteStatus;

// ---------------------------------------------------------------------------
// DataRequest
// ---------------------------------------------------------------------------

/// Which slice of a leaderboard an entries request covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataRequest {
    // ---
    /// Absolute ranks `start..=end`.
    Global,
    /// Ranks relative to the logged-on user.
    GlobalAroundUser,
    /// Entries for the logged-on user's friends.
    Friends,
}

// ---------------------------------------------------------------------------
// LeaderboardInfo
// ---------------------------------------------------------------------------

/// Response to a find-leaderboard call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardInfo {
    // ---
    pub status: RemoteStatus,
    pub id: i32,
    pub name: String,
    pub entry_count: i32,
}

impl RemoteResult for LeaderboardInfo {
    fn status(&self) -> RemoteStatus {
        self.status
    }
}

// ---------------------------------------------------------------------------
// LeaderboardEntries
// ---------------------------------------------------------------------------

/// One ranked row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    // ---
    pub player_id: u64,
    pub global_rank: i32,
    pub score: i32,
    /// User-generated content attached to the entry (e.g. a replay), `0` if none.
    pub ugc_id: u64,
    /// Opaque per-entry detail words supplied by the game.
    pub details: Vec<i32>,
}

// ---

/// Response to a get-entries call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntries {
    // ---
    pub status: RemoteStatus,
    pub leaderboard_id: i32,
    /// Total rows on the leaderboard, which may exceed `entries.len()`.
    pub entry_count: i32,
    pub entries: Vec<LeaderboardEntry>,
}

impl RemoteResult for LeaderboardEntries {
    fn status(&self) -> RemoteStatus {
        self.status
    }
}
