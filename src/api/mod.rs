//! Typed calls to the PongArcadia API.
//!
//! Reads never fail: on any error they log a warning and return the type's
//! default, so a page renders empty rather than broken. Writes return their
//! errors to the caller.

mod friends;
mod game;
mod stats;

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::client::{ApiClient, ApiRequest, ClientError};

pub use friends::{FriendInvitation, UserSummary};
pub use game::{GameInvite, GameStart};
pub use stats::{MatchRecord, MatchResult, PlayerStats, Profile};

/// Data-fetching layer shared by the pages.
#[derive(Debug, Clone)]
pub struct PongApi {
    client: ApiClient,
}

impl PongApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Fetch and decode, falling back to `T::default()` on any error.
    async fn read_or_default<T>(&self, request: ApiRequest) -> T
    where
        T: DeserializeOwned + Default,
    {
        match self.fetch(&request).await {
            Ok(value) => value,
            Err(e) => {
                warn!(path = request.path(), error = %e, "read failed, using default");
                T::default()
            }
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T, ClientError> {
        self.client.send(request).await?.json()
    }

    /// Send a write and discard the response body.
    async fn write(&self, request: ApiRequest) -> Result<(), ClientError> {
        self.client.send(&request).await.map(|_| ())
    }
}

/// Encode a value for use as a single path segment.
fn segment(value: &str) -> String {
    // Form encoding writes spaces as '+', which a path would keep literally.
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
