use super::status::RemoteStatus;

// ---------------------------------------------------------------------------
// SessionEventKind
// ---------------------------------------------------------------------------

/// Event types a handler can subscribe to on the [`CallbackManager`].
///
/// [`CallbackManager`]: super::CallbackManager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionEventKind {
    // ---
    Connected,
    Disconnected,
    LoggedOn,
    LoggedOff,
}

// ---------------------------------------------------------------------------
// SessionEvent
// ---------------------------------------------------------------------------

/// A push-style notification dispatched by the SDK's callback pump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    // ---
    /// Outcome of a `connect` request.
    Connected { status: RemoteStatus },

    /// The link went down, or a `connect` attempt never came up.
    Disconnected { user_initiated: bool },

    /// Outcome of a `log_on` request.
    LoggedOn { status: RemoteStatus },

    /// The remote ended the logon session while the link stayed up.
    LoggedOff { status: RemoteStatus },
}

// ---

impl SessionEvent {
    // ---
    pub fn kind(&self) -> SessionEventKind {
        // ---
        match self {
            Self::Connected { .. } => SessionEventKind::Connected,
            Self::Disconnected { .. } => SessionEventKind::Disconnected,
            Self::LoggedOn { .. } => SessionEventKind::LoggedOn,
            Self::LoggedOff { .. } => SessionEventKind::LoggedOff,
        }
    }

    // ---

    /// Result code carried by the payload. `Disconnected` carries none.
    pub fn status(&self) -> Option<RemoteStatus> {
        // ---
        match self {
            Self::Connected { status } | Self::LoggedOn { status } | Self::LoggedOff { status } => {
                Some(*status)
            }
            Self::Disconnected { .. } => None,
        }
    }
}
