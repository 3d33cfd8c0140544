use std::fmt;

// ---------------------------------------------------------------------------
// RemoteStatus
// ---------------------------------------------------------------------------

/// Result code attached to every handshake event and domain call response.
///
/// Numeric values follow the remote platform's wire codes so they can be
/// logged and compared against upstream documentation. Codes the client
/// does not know by name are preserved in [`RemoteStatus::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteStatus {
    // ---
    Ok,
    Fail,
    NoConnection,
    InvalidPassword,
    LoggedInElsewhere,
    InvalidParam,
    FileNotFound,
    Busy,
    Timeout,
    ServiceUnavailable,
    TryAnotherCm,
    AccountLogonDenied,
    RateLimitExceeded,
    Other(i32),
}

// ---

impl RemoteStatus {
    // ---
    pub fn from_code(code: i32) -> Self {
        // ---
        match code {
            1 => Self::Ok,
            2 => Self::Fail,
            3 => Self::NoConnection,
            5 => Self::InvalidPassword,
            6 => Self::LoggedInElsewhere,
            8 => Self::InvalidParam,
            9 => Self::FileNotFound,
            10 => Self::Busy,
            16 => Self::Timeout,
            20 => Self::ServiceUnavailable,
            48 => Self::TryAnotherCm,
            63 => Self::AccountLogonDenied,
            84 => Self::RateLimitExceeded,
            other => Self::Other(other),
        }
    }

    // ---

    pub fn code(self) -> i32 {
        // ---
        match self {
            Self::Ok => 1,
            Self::Fail => 2,
            Self::NoConnection => 3,
            Self::InvalidPassword => 5,
            Self::LoggedInElsewhere => 6,
            Self::InvalidParam => 8,
            Self::FileNotFound => 9,
            Self::Busy => 10,
            Self::Timeout => 16,
            Self::ServiceUnavailable => 20,
            Self::TryAnotherCm => 48,
            Self::AccountLogonDenied => 63,
            Self::RateLimitExceeded => 84,
            Self::Other(code) => code,
        }
    }

    // ---

    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }
}

// ---

impl fmt::Display for RemoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Other(code) => write!(f, "Other({code})"),
            named => write!(f, "{named:?}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::RemoteStatus;

    #[test]
    fn known_codes_keep_their_names() {
        assert_eq!(RemoteStatus::from_code(1), RemoteStatus::Ok);
        assert_eq!(RemoteStatus::from_code(2), RemoteStatus::Fail);
        assert_eq!(RemoteStatus::from_code(84).code(), 84);
        assert_eq!(RemoteStatus::Fail.to_string(), "Fail");
    }

    #[test]
    fn unknown_code_is_preserved() {
        let status = RemoteStatus::from_code(999);
        assert_eq!(status, RemoteStatus::Other(999));
        assert_eq!(status.code(), 999);
        assert_eq!(status.to_string(), "Other(999)");
        assert!(!status.is_ok());
    }
}
