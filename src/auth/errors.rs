//! Session error taxonomy.

use thiserror::Error;

/// Failure modes of a session check or refresh.
///
/// Only `AuthExpired` is recoverable (by one refresh). The other kinds are
/// terminal: the caller signs the user out or redirects to the landing route.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    /// An API call was rejected with 401.
    #[error("access token expired")]
    AuthExpired,

    /// The refresh endpoint rejected the refresh or did not confirm it.
    #[error("session refresh failed (HTTP {status})")]
    RefreshFailed { status: u16 },

    /// The verify endpoint rejected the access token or did not confirm it.
    #[error("session verification failed (HTTP {status})")]
    VerifyFailed { status: u16 },

    /// Transport-level failure talking to a session endpoint.
    #[error("network failure: {message}")]
    NetworkFailure { message: String },
}

impl From<reqwest::Error> for SessionError {
    fn from(err: reqwest::Error) -> Self {
        SessionError::NetworkFailure {
            message: err.to_string(),
        }
    }
}

impl SessionError {
    /// Whether the error can be repaired by refreshing the session.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SessionError::AuthExpired)
    }
}
