//! API client with transparent session recovery.
//!
//! Every call goes through [`ApiClient::send`]. When the API answers 401 the
//! client refreshes the session once and re-sends the same request once.
//! If the refresh fails the user is logged out and sent to the auth entry
//! route. Calls to the sign-in, sign-up and refresh endpoints are never
//! retried.

mod error;
mod navigator;
mod request;

use std::sync::{Arc, Mutex, PoisonError};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use reqwest::StatusCode;
use reqwest::cookie::{CookieStore, Jar};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::auth::{ACCESS_COOKIE_NAME, AuthEndpoints, SessionError, confirms, join_url};
use crate::routes::DEFAULT_AUTH_ENTRY;

pub use error::ClientError;
pub use navigator::{LogNavigator, Navigator, RouteSignal};
pub use request::{ApiRequest, ApiResponse};

/// How many times one request may be re-sent after a refresh.
const MAX_SESSION_RETRIES: u32 = 1;

/// How concurrent 401s share session refreshes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RefreshPolicy {
    /// Each failed request runs its own refresh.
    #[default]
    PerRequest,
    /// Requests failing while a refresh is in flight wait for that refresh.
    Coalesced,
}

type SharedRecovery = Shared<BoxFuture<'static, Result<(), SessionError>>>;

/// HTTP client for the PongArcadia API.
///
/// Cheap to clone; clones share the cookie jar and any in-flight refresh.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    jar: Arc<Jar>,
    base: Url,
    endpoints: AuthEndpoints,
    auth_entry: String,
    navigator: Arc<dyn Navigator>,
    policy: RefreshPolicy,
    in_flight: Mutex<Option<SharedRecovery>>,
}

/// Builder for [`ApiClient`].
pub struct ApiClientBuilder {
    base: Url,
    endpoints: AuthEndpoints,
    auth_entry: String,
    navigator: Arc<dyn Navigator>,
    policy: RefreshPolicy,
}

impl ApiClientBuilder {
    pub fn endpoints(mut self, endpoints: AuthEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Route to navigate to after a failed refresh.
    pub fn auth_entry(mut self, route: impl Into<String>) -> Self {
        self.auth_entry = route.into();
        self
    }

    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    pub fn refresh_policy(mut self, policy: RefreshPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn build(self) -> Result<ApiClient, ClientError> {
        let jar = Arc::new(Jar::default());
        let http = reqwest::Client::builder()
            .user_agent(concat!("pongarcadia/", env!("CARGO_PKG_VERSION")))
            .cookie_provider(jar.clone())
            // A 3xx from a session endpoint is a rejection.
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(ApiClient {
            inner: Arc::new(ClientInner {
                http,
                jar,
                base: self.base,
                endpoints: self.endpoints,
                auth_entry: self.auth_entry,
                navigator: self.navigator,
                policy: self.policy,
                in_flight: Mutex::new(None),
            }),
        })
    }
}

impl ApiClient {
    pub fn builder(base: Url) -> ApiClientBuilder {
        ApiClientBuilder {
            base,
            endpoints: AuthEndpoints::default(),
            auth_entry: DEFAULT_AUTH_ENTRY.to_string(),
            navigator: Arc::new(LogNavigator),
            policy: RefreshPolicy::default(),
        }
    }

    pub fn base(&self) -> &Url {
        &self.inner.base
    }

    /// Store a cookie exactly as received in a Set-Cookie header, e.g. one
    /// persisted from an earlier run.
    pub fn restore_cookie(&self, set_cookie: &str) {
        self.inner.jar.add_cookie_str(set_cookie, &self.inner.base);
    }

    /// Current value of a cookie the API would receive.
    pub fn cookie(&self, name: &str) -> Option<String> {
        let header = self.inner.jar.cookies(&self.inner.base)?;
        let header = header.to_str().ok()?;
        header.split(';').find_map(|part| {
            let (key, value) = part.trim().split_once('=')?;
            (key == name).then(|| value.to_string())
        })
    }

    /// Current access token, for channels that authenticate out of band.
    pub fn access_token(&self) -> Option<String> {
        self.cookie(ACCESS_COOKIE_NAME).filter(|v| !v.is_empty())
    }

    /// Send a request, refreshing the session once on 401.
    #[instrument(skip_all, fields(method = %request.method(), path = request.path()))]
    pub async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError> {
        let mut attempt = 0;
        loop {
            let response = self.dispatch(request).await?;
            if !self.should_refresh(request, response.status(), attempt) {
                return response.into_result();
            }
            debug!(attempt, "access token rejected, refreshing session");
            self.recover_session().await?;
            attempt += 1;
        }
    }

    fn should_refresh(&self, request: &ApiRequest, status: StatusCode, attempt: u32) -> bool {
        status == StatusCode::UNAUTHORIZED
            && attempt < MAX_SESSION_RETRIES
            && !self.inner.endpoints.is_whitelisted(request.path())
    }

    async fn dispatch(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError> {
        let url = join_url(&self.inner.base, request.path())?;
        let mut builder = self
            .inner
            .http
            .request(request.method().clone(), url)
            .headers(request.headers().clone());
        if !request.query_pairs().is_empty() {
            builder = builder.query(request.query_pairs());
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        ApiResponse::read(response).await
    }

    async fn recover_session(&self) -> Result<(), SessionError> {
        match self.inner.policy {
            RefreshPolicy::PerRequest => self.refresh_or_sign_out().await,
            RefreshPolicy::Coalesced => self.shared_recovery().await,
        }
    }

    /// Join the refresh already in flight, or start one.
    async fn shared_recovery(&self) -> Result<(), SessionError> {
        let recovery = {
            let mut slot = self
                .inner
                .in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            match slot.as_ref() {
                Some(recovery) => recovery.clone(),
                None => {
                    let client = self.clone();
                    let recovery = async move {
                        let result = client.refresh_or_sign_out().await;
                        client
                            .inner
                            .in_flight
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .take();
                        result
                    }
                    .boxed()
                    .shared();
                    *slot = Some(recovery.clone());
                    recovery
                }
            }
        };
        recovery.await
    }

    async fn refresh_or_sign_out(&self) -> Result<(), SessionError> {
        match self.refresh().await {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!(error = %e, "session refresh failed, signing out");
                self.sign_out().await;
                Err(e)
            }
        }
    }

    /// Ask the backend for a new session. New cookies land in the jar.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<(), SessionError> {
        let url = join_url(&self.inner.base, &self.inner.endpoints.refresh).map_err(|e| {
            SessionError::NetworkFailure {
                message: e.to_string(),
            }
        })?;
        let response = self.inner.http.post(url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if confirms(status, &body) {
            debug!("session refreshed");
            Ok(())
        } else {
            Err(SessionError::RefreshFailed {
                status: status.as_u16(),
            })
        }
    }

    /// Log out on the backend (best-effort) and navigate to the auth entry route.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) {
        match join_url(&self.inner.base, &self.inner.endpoints.logout) {
            Ok(url) => match self.inner.http.post(url).send().await {
                Ok(response) if !response.status().is_success() => {
                    debug!(status = %response.status(), "logout rejected, ignoring");
                }
                Ok(_) => {}
                Err(e) => debug!(error = %e, "logout failed, ignoring"),
            },
            Err(e) => debug!(error = %e, "invalid logout url, ignoring"),
        }
        self.inner.navigator.navigate(&self.inner.auth_entry);
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base", &self.inner.base)
            .field("policy", &self.inner.policy)
            .field("cookies", &"[REDACTED]")
            .finish()
    }
}
