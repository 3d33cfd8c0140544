use std::fmt;

use super::error::{LbError, Result};

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Username / password pair used for the logon handshake.
///
/// Validated once at construction and immutable afterwards. The password
/// never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    // ---
    user_name: String,
    password: String,
}

// ---

impl Credentials {
    // ---
    /// Returns [`LbError::ArgumentInvalid`] if either field is empty.
    pub fn new(user_name: impl Into<String>, password: impl Into<String>) -> Result<Self> {
        // ---
        let user_name = user_name.into();
        let password = password.into();

        if user_name.is_empty() {
            return Err(LbError::ArgumentInvalid("user name is empty".into()));
        }
        if password.is_empty() {
            return Err(LbError::ArgumentInvalid("password is empty".into()));
        }

        Ok(Self {
            user_name,
            password,
        })
    }

    // ---

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

// ---

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user_name", &self.user_name)
            .field("password", &"<redacted>")
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn empty_password_is_rejected() {
        let err = Credentials::new("alice", "").unwrap_err();
        assert!(matches!(err, LbError::ArgumentInvalid(_)));
    }

    #[test]
    fn empty_user_name_is_rejected() {
        let err = Credentials::new("", "hunter2").unwrap_err();
        assert!(matches!(err, LbError::ArgumentInvalid(_)));
    }

    #[test]
    fn debug_output_redacts_password() {
        let creds = Credentials::new("alice", "hunter2").unwrap();
        let shown = format!("{creds:?}");
        assert!(shown.contains("alice"));
        assert!(!shown.contains("hunter2"));
    }
}
