//! Tunables for the session orchestrator and the retry executor.

use std::net::SocketAddr;
use std::time::Duration;

// ---

use lbsync_domain::{LbError, Result};

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Everything [`SessionOrchestrator`] needs besides the SDK handles and
/// credentials.
///
/// [`SessionOrchestrator`]: super::SessionOrchestrator
#[derive(Debug, Clone)]
pub struct SessionConfig {
    // ---
    /// Server to connect to. `None` lets the SDK choose.
    pub endpoint: Option<SocketAddr>,

    /// How long a caller waits for the connect/logon gate before giving up
    /// with [`LbError::GateTimeout`].
    pub gate_timeout: Duration,

    /// Upper bound on one blocking wait inside the dispatch loop. Also the
    /// latency with which the loop notices a stop request.
    pub dispatch_poll: Duration,
}

// ---

impl Default for SessionConfig {
    fn default() -> Self {
        // ---
        Self {
            endpoint: None,
            gate_timeout: Duration::from_secs(5),
            dispatch_poll: Duration::from_millis(100),
        }
    }
}

// ---

impl SessionConfig {
    // ---
    pub fn validate(&self) -> Result<()> {
        // ---
        if self.dispatch_poll.is_zero() {
            return Err(LbError::ArgumentInvalid("dispatch_poll must be non-zero".into()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// RetryPolicy
// ---------------------------------------------------------------------------

/// Bounded retry with jittered exponential backoff.
///
/// `max_attempts` counts retries after the first call: a policy of 10
/// makes at most 11 calls and sleeps at most 10 times. Zero disables retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    // ---
    pub max_attempts: u32,
    pub min_backoff: Duration,
    pub max_backoff: Duration,
    pub delta_backoff: Duration,
}

// ---

impl Default for RetryPolicy {
    fn default() -> Self {
        // ---
        Self {
            max_attempts: 10,
            min_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(20),
            delta_backoff: Duration::from_secs(2),
        }
    }
}

// ---

impl RetryPolicy {
    // ---
    pub fn new(
        max_attempts: u32,
        min_backoff: Duration,
        max_backoff: Duration,
        delta_backoff: Duration,
    ) -> Result<Self> {
        // ---
        let policy = Self {
            max_attempts,
            min_backoff,
            max_backoff,
            delta_backoff,
        };
        policy.validate()?;
        Ok(policy)
    }

    // ---

    pub fn validate(&self) -> Result<()> {
        // ---
        if self.min_backoff > self.max_backoff {
            return Err(LbError::ArgumentInvalid(format!(
                "min_backoff {:?} exceeds max_backoff {:?}",
                self.min_backoff, self.max_backoff
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ClientConfig
// ---------------------------------------------------------------------------

/// Combined configuration for [`LeaderboardClient`].
///
/// [`LeaderboardClient`]: super::LeaderboardClient
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    // ---
    pub session: SessionConfig,
    pub retry: RetryPolicy,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn defaults_match_production_policy() {
        // ---
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 10);
        assert_eq!(policy.min_backoff, Duration::from_secs(1));
        assert_eq!(policy.max_backoff, Duration::from_secs(20));
        assert_eq!(policy.delta_backoff, Duration::from_secs(2));
        assert_eq!(SessionConfig::default().gate_timeout, Duration::from_secs(5));
    }

    #[test]
    fn zero_retries_is_allowed() {
        let policy = RetryPolicy::new(0, Duration::ZERO, Duration::ZERO, Duration::ZERO).unwrap();
        assert_eq!(policy.max_attempts, 0);
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        // ---
        let err = RetryPolicy::new(
            3,
            Duration::from_secs(5),
            Duration::from_secs(1),
            Duration::from_secs(1),
        )
        .unwrap_err();
        assert!(matches!(err, LbError::ArgumentInvalid(_)));
    }

    #[test]
    fn zero_dispatch_poll_is_rejected() {
        let config = SessionConfig {
            dispatch_poll: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
