use std::time::Duration;

use thiserror::Error;

use super::status::RemoteStatus;

// ---------------------------------------------------------------------------
// LbError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LbError {
    // ---
    #[error("unable to connect (result {})", display_code(.code))]
    ConnectionFailure { code: Option<RemoteStatus> },

    #[error("unable to log on (result {})", display_code(.code))]
    LogonFailure { code: Option<RemoteStatus> },

    #[error("{operation}: request timed out")]
    RequestTimeout { operation: String },

    #[error("{operation}: transport error: {reason}")]
    Transport { operation: String, reason: String },

    #[error("{operation}: remote reported {code}")]
    RemoteStatusFailure {
        operation: String,
        code: RemoteStatus,
    },

    #[error("{operation}: gave up after {attempts} attempts: {last}")]
    RetryExhausted {
        operation: String,
        attempts: u32,
        #[source]
        last: Box<LbError>,
    },

    #[error("invalid argument: {0}")]
    ArgumentInvalid(String),

    #[error("client has been disposed")]
    Disposed,

    #[error("operation cancelled")]
    Cancelled,

    #[error("timed out after {0:?} waiting for the connect/logon gate")]
    GateTimeout(Duration),

    #[error("handshake task aborted: {0}")]
    HandshakeAborted(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

// ---

impl LbError {
    // ---
    /// Transient faults are retried locally by the executor; everything
    /// else propagates to the caller on first occurrence.
    pub fn is_transient(&self) -> bool {
        // ---
        matches!(
            self,
            LbError::RequestTimeout { .. } | LbError::Transport { .. } | LbError::GateTimeout(_)
        )
    }

    // ---

    /// Remote result code carried by this error, if any.
    pub fn code(&self) -> Option<RemoteStatus> {
        // ---
        match self {
            LbError::ConnectionFailure { code } | LbError::LogonFailure { code } => *code,
            LbError::RemoteStatusFailure { code, .. } => Some(*code),
            LbError::RetryExhausted { last, .. } => last.code(),
            _ => None,
        }
    }
}

// ---

fn display_code(code: &Option<RemoteStatus>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "unknown".into(),
    }
}

// ---

pub type Result<T> = std::result::Result<T, LbError>;

// ---------------------------------------------------------------------------
// CallError
// ---------------------------------------------------------------------------

/// Failure raised by an individual SDK domain call before any result code
/// was received. Both variants are transient.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    // ---
    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),
}

// ---

impl CallError {
    // ---
    /// Translate into a domain error named after `operation`.
    pub fn into_lb_error(self, operation: &str) -> LbError {
        // ---
        match self {
            CallError::Timeout => LbError::RequestTimeout {
                operation: operation.to_string(),
            },
            CallError::Transport(reason) => LbError::Transport {
                operation: operation.to_string(),
                reason,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
