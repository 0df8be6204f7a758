//! Backend session endpoints.

/// Paths of the backend's session endpoints, relative to the API base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthEndpoints {
    pub refresh: String,
    pub verify: String,
    pub logout: String,
    pub sign_in: String,
    pub sign_up: String,
}

impl Default for AuthEndpoints {
    fn default() -> Self {
        Self {
            refresh: "/auth/token/refresh".to_string(),
            verify: "/auth/token/verify".to_string(),
            logout: "/auth/logout".to_string(),
            sign_in: "/auth/sign_in".to_string(),
            sign_up: "/auth/sign_up".to_string(),
        }
    }
}

impl AuthEndpoints {
    /// Endpoints that establish or refresh a session themselves.
    /// A 401 from one of these is never answered with a refresh.
    pub fn whitelist(&self) -> [&str; 3] {
        [&self.sign_in, &self.sign_up, &self.refresh]
    }

    /// Whether a request path targets a whitelisted endpoint.
    /// Query strings and a trailing slash are ignored.
    pub fn is_whitelisted(&self, path: &str) -> bool {
        let path = path.split('?').next().unwrap_or(path);
        let path = if path.len() > 1 {
            path.trim_end_matches('/')
        } else {
            path
        };
        self.whitelist().iter().any(|w| *w == path)
    }
}

/// Join an endpoint path onto a base URL without dropping the base's path.
pub fn join_url(base: &url::Url, path: &str) -> Result<url::Url, url::ParseError> {
    let base = base.as_str().trim_end_matches('/');
    let path = path.trim_start_matches('/');
    url::Url::parse(&format!("{}/{}", base, path))
}
