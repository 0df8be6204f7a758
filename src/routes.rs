//! Route classification for page navigation.
//!
//! Every page route is either unprotected (reachable without a session) or
//! protected. Only the unprotected set is listed; anything not on the list
//! is protected.

use thiserror::Error;

/// Landing route for visitors without a session.
pub const DEFAULT_UNAUTHENTICATED_LANDING: &str = "/";

/// Landing route for signed-in users.
pub const DEFAULT_AUTHENTICATED_LANDING: &str = "/dashboard";

/// Route the API client navigates to after a session can no longer be repaired.
pub const DEFAULT_AUTH_ENTRY: &str = DEFAULT_UNAUTHENTICATED_LANDING;

/// Routes reachable without a session.
pub const DEFAULT_UNPROTECTED: &[&str] = &["/", "/auth/callback"];

/// Paths the route middleware never looks at.
/// Entries ending in '/' match as prefixes.
pub const DEFAULT_BYPASS: &[&str] = &["/healthz", "/favicon.ico", "/static/"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteConfigError {
    #[error("route must start with '/': {0}")]
    NotAbsolute(String),
    #[error("unauthenticated landing route {0} must be unprotected")]
    LandingProtected(String),
    #[error("authenticated landing route {0} must be protected")]
    DashboardUnprotected(String),
}

/// Static partition of page routes, fixed at startup.
#[derive(Debug, Clone)]
pub struct RouteTable {
    unprotected: Vec<String>,
    bypass: Vec<String>,
    unauthenticated_landing: String,
    authenticated_landing: String,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self {
            unprotected: DEFAULT_UNPROTECTED.iter().map(|r| r.to_string()).collect(),
            bypass: DEFAULT_BYPASS.iter().map(|r| r.to_string()).collect(),
            unauthenticated_landing: DEFAULT_UNAUTHENTICATED_LANDING.to_string(),
            authenticated_landing: DEFAULT_AUTHENTICATED_LANDING.to_string(),
        }
    }
}

impl RouteTable {
    /// Build a table from an explicit unprotected list and landing routes.
    ///
    /// Fails if the landing routes would bounce a user between each other:
    /// the unauthenticated landing must be unprotected and the
    /// authenticated landing must be protected.
    pub fn new(
        unprotected: impl IntoIterator<Item = String>,
        unauthenticated_landing: impl Into<String>,
        authenticated_landing: impl Into<String>,
    ) -> Result<Self, RouteConfigError> {
        let unprotected = unprotected
            .into_iter()
            .map(|r| validate_route(&r).map(|_| normalize(&r).to_string()))
            .collect::<Result<Vec<_>, _>>()?;

        let table = Self {
            unprotected,
            unauthenticated_landing: unauthenticated_landing.into(),
            authenticated_landing: authenticated_landing.into(),
            ..Self::default()
        };
        validate_route(&table.unauthenticated_landing)?;
        validate_route(&table.authenticated_landing)?;

        if table.is_protected(&table.unauthenticated_landing) {
            return Err(RouteConfigError::LandingProtected(
                table.unauthenticated_landing,
            ));
        }
        if !table.is_protected(&table.authenticated_landing) {
            return Err(RouteConfigError::DashboardUnprotected(
                table.authenticated_landing,
            ));
        }
        Ok(table)
    }

    /// Replace the bypass list.
    pub fn with_bypass(mut self, bypass: impl IntoIterator<Item = String>) -> Self {
        self.bypass = bypass.into_iter().collect();
        self
    }

    /// Whether a page at `path` requires a session.
    pub fn is_protected(&self, path: &str) -> bool {
        let path = normalize(path);
        !self.unprotected.iter().any(|r| r == path)
    }

    /// Whether the middleware should skip `path` entirely.
    pub fn is_bypassed(&self, path: &str) -> bool {
        self.bypass.iter().any(|b| {
            if b.ends_with('/') {
                path.starts_with(b.as_str())
            } else {
                path == b
            }
        })
    }

    pub fn unauthenticated_landing(&self) -> &str {
        &self.unauthenticated_landing
    }

    pub fn authenticated_landing(&self) -> &str {
        &self.authenticated_landing
    }

    pub fn unprotected(&self) -> &[String] {
        &self.unprotected
    }
}

fn validate_route(route: &str) -> Result<(), RouteConfigError> {
    if route.starts_with('/') {
        Ok(())
    } else {
        Err(RouteConfigError::NotAbsolute(route.to_string()))
    }
}

/// Strip a trailing slash so "/auth/callback/" and "/auth/callback" match.
fn normalize(path: &str) -> &str {
    if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    }
}
