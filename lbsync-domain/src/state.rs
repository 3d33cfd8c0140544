// ---------------------------------------------------------------------------
// ConnectionState
// ---------------------------------------------------------------------------

/// Handshake state of the remote session.
///
/// ```text
/// Disconnected -> Connecting -> Connected -> LoggingOn -> LoggedOn
///      ^               |              ^             |
///      +---------------+              +-------------+   (handshake failure)
/// ```
///
/// A failed step falls back to whatever the SDK flags project: a rejected
/// logon on a live link lands in `Connected`, a dropped link in
/// `Disconnected`.
///
/// The settled states (`Disconnected`, `Connected`, `LoggedOn`) are always
/// derived from the SDK's own connection and session flags via
/// [`ConnectionState::project`]. Only the two in-flight states are tracked
/// by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    // ---
    Disconnected,
    Connecting,
    Connected,
    LoggingOn,
    LoggedOn,
}

// ---

impl ConnectionState {
    // ---
    /// Settled state implied by the SDK's point-in-time flags.
    pub fn project(is_connected: bool, is_logged_on: bool) -> Self {
        // ---
        match (is_connected, is_logged_on) {
            (true, true) => Self::LoggedOn,
            (true, false) => Self::Connected,
            // A session id without a live link is stale.
            (false, _) => Self::Disconnected,
        }
    }

    // ---

    /// `true` while a connect or logon handshake is on the wire.
    pub fn is_in_flight(self) -> bool {
        matches!(self, Self::Connecting | Self::LoggingOn)
    }

    // ---

    pub fn is_connected(self) -> bool {
        matches!(self, Self::Connected | Self::LoggingOn | Self::LoggedOn)
    }

    pub fn is_logged_on(self) -> bool {
        self == Self::LoggedOn
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::ConnectionState;

    #[test]
    fn projection_follows_sdk_flags() {
        assert_eq!(ConnectionState::project(false, false), ConnectionState::Disconnected);
        assert_eq!(ConnectionState::project(true, false), ConnectionState::Connected);
        assert_eq!(ConnectionState::project(true, true), ConnectionState::LoggedOn);
        assert_eq!(ConnectionState::project(false, true), ConnectionState::Disconnected);
    }

    #[test]
    fn boolean_projections() {
        assert!(ConnectionState::LoggingOn.is_connected());
        assert!(!ConnectionState::LoggingOn.is_logged_on());
        assert!(ConnectionState::Connecting.is_in_flight());
        assert!(!ConnectionState::Connecting.is_connected());
        assert!(ConnectionState::LoggedOn.is_logged_on());
    }
}
