use std::sync::Arc;

// ---

use super::{SimCallbackManager, SimConfig, SimSessionClient, SimUserStats};

// ---------------------------------------------------------------------------
// SimPlatform
// ---------------------------------------------------------------------------

/// One simulated remote: callback manager, session client and stats
/// endpoint wired to the same event queue and link flags.
///
/// The handles are public so tests can script outcomes and read counters
/// while the client layer holds the same `Arc`s behind trait objects.
pub struct SimPlatform {
    // ---
    pub callbacks: Arc<SimCallbackManager>,
    pub client: Arc<SimSessionClient>,
    pub stats: Arc<SimUserStats>,
}

// ---

impl SimPlatform {
    // ---
    pub fn new(config: SimConfig) -> Self {
        // ---
        let callbacks = Arc::new(SimCallbackManager::new());
        let client = Arc::new(SimSessionClient::new(Arc::clone(&callbacks), config.clone()));
        let stats = Arc::new(SimUserStats::new(Arc::clone(&client), &config));

        Self {
            callbacks,
            client,
            stats,
        }
    }
}
