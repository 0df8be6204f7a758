//! Backend session endpoints as seen by the route middleware.

use async_trait::async_trait;
use axum::http::{HeaderValue, header};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use super::cookie::REFRESH_COOKIE_NAME;
use super::endpoints::{AuthEndpoints, join_url};
use super::errors::SessionError;

/// A confirmed session, with whatever cookies the backend issued for it.
#[derive(Debug, Clone, Default)]
pub struct SessionGrant {
    /// Set-Cookie values to forward to the browser.
    pub set_cookies: Vec<HeaderValue>,
}

/// The backend calls the route middleware depends on.
#[async_trait]
pub trait SessionBackend: Send + Sync {
    /// Exchange a refresh token for a new session.
    async fn refresh(&self, refresh_token: &str) -> Result<SessionGrant, SessionError>;

    /// Check that an access token is still valid.
    async fn verify(&self, access_token: &str) -> Result<SessionGrant, SessionError>;
}

/// Acknowledgement body some backend endpoints return.
#[derive(Debug, Deserialize)]
struct Ack {
    success: Option<bool>,
}

/// Whether a session endpoint response confirms the operation.
///
/// The status must be 2xx. If the body is a JSON object with a boolean
/// `success` field, it must be `true`; any other body is accepted.
pub fn confirms(status: StatusCode, body: &[u8]) -> bool {
    if !status.is_success() {
        return false;
    }
    match serde_json::from_slice::<Ack>(body) {
        Ok(ack) => ack.success != Some(false),
        Err(_) => true,
    }
}

/// [`SessionBackend`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSessionBackend {
    client: reqwest::Client,
    base: Url,
    endpoints: AuthEndpoints,
}

impl HttpSessionBackend {
    pub fn new(base: Url, endpoints: AuthEndpoints) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("pongarcadia-gate/", env!("CARGO_PKG_VERSION")))
            // A 3xx from a session endpoint is a rejection.
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self {
            client,
            base,
            endpoints,
        })
    }

    fn url(&self, path: &str) -> Result<Url, SessionError> {
        join_url(&self.base, path).map_err(|e| SessionError::NetworkFailure {
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl SessionBackend for HttpSessionBackend {
    #[instrument(skip_all, fields(endpoint = %self.endpoints.refresh))]
    async fn refresh(&self, refresh_token: &str) -> Result<SessionGrant, SessionError> {
        let url = self.url(&self.endpoints.refresh)?;
        let response = self
            .client
            .post(url)
            .header(
                header::COOKIE,
                format!("{}={}", REFRESH_COOKIE_NAME, refresh_token),
            )
            .send()
            .await?;

        let status = response.status();
        let set_cookies = collect_set_cookies(response.headers());
        let body = response.bytes().await?;
        debug!(%status, "refresh response");

        if confirms(status, &body) {
            Ok(SessionGrant { set_cookies })
        } else {
            Err(SessionError::RefreshFailed {
                status: status.as_u16(),
            })
        }
    }

    #[instrument(skip_all, fields(endpoint = %self.endpoints.verify))]
    async fn verify(&self, access_token: &str) -> Result<SessionGrant, SessionError> {
        let url = self.url(&self.endpoints.verify)?;
        let response = self
            .client
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        let set_cookies = collect_set_cookies(response.headers());
        let body = response.bytes().await?;
        debug!(%status, "verify response");

        if confirms(status, &body) {
            Ok(SessionGrant { set_cookies })
        } else {
            Err(SessionError::VerifyFailed {
                status: status.as_u16(),
            })
        }
    }
}

fn collect_set_cookies(headers: &reqwest::header::HeaderMap) -> Vec<HeaderValue> {
    headers
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|v| HeaderValue::from_bytes(v.as_bytes()).ok())
        .collect()
}
