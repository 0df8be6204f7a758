//! API client errors.

use reqwest::StatusCode;
use thiserror::Error;

use crate::auth::SessionError;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The API answered with a non-2xx status. Propagated to the caller as-is.
    #[error("request failed with HTTP {status}")]
    Request { status: StatusCode, body: String },

    /// The session could not be repaired; the user has been signed out.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The request never got an answer.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid request url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// HTTP status of a [`ClientError::Request`].
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Session view of this error: a bare 401 reads as an expired session.
    pub fn session_error(&self) -> Option<SessionError> {
        match self {
            ClientError::Request { status, .. } if *status == StatusCode::UNAUTHORIZED => {
                Some(SessionError::AuthExpired)
            }
            ClientError::Session(e) => Some(e.clone()),
            _ => None,
        }
    }
}
