//! Route access middleware.
//!
//! Runs before every page is served. The decision depends only on which
//! session cookies are present, the target route's classification and, when
//! a cookie is present, the backend's answer:
//!
//! | access | refresh | action |
//! |--------|---------|--------|
//! | absent | absent  | allow unprotected, else redirect to the landing route |
//! | absent | present | backend refresh; on success redirect unprotected targets to the dashboard, allow protected ones |
//! | present| any     | backend verify; same outcome as refresh |
//!
//! A failed or unreachable backend clears both cookies and redirects to the
//! landing route.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::{debug, warn};

use super::cookie::{ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME, clear_session_cookies, get_session_cookie};
use super::state::GateState;

/// Outcome of evaluating one navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// Serve the page.
    Allow {
        /// Cookies issued by the backend while confirming the session.
        set_cookies: Vec<HeaderValue>,
    },
    /// Send the browser elsewhere.
    Redirect {
        location: String,
        /// Delete both session cookies on the way.
        clear_session: bool,
        set_cookies: Vec<HeaderValue>,
    },
}

impl Access {
    fn allow() -> Self {
        Access::Allow {
            set_cookies: Vec::new(),
        }
    }

    /// Build the response for this decision. `page` is only run on `Allow`.
    async fn respond(self, secure_cookies: bool, page: impl Future<Output = Response>) -> Response {
        match self {
            Access::Allow { set_cookies } => {
                let mut response = page.await;
                append_cookies(response.headers_mut(), set_cookies);
                response
            }
            Access::Redirect {
                location,
                clear_session,
                set_cookies,
            } => {
                let mut response = Redirect::temporary(&location).into_response();
                let headers = response.headers_mut();
                if clear_session {
                    clear_session_cookies(headers, secure_cookies);
                }
                append_cookies(headers, set_cookies);
                response
            }
        }
    }
}

fn append_cookies(headers: &mut HeaderMap, cookies: Vec<HeaderValue>) {
    for cookie in cookies {
        headers.append(header::SET_COOKIE, cookie);
    }
}

/// Decide what to do with a navigation to `path` carrying `headers`.
pub async fn evaluate(gate: &GateState, headers: &HeaderMap, path: &str) -> Access {
    let routes = &gate.routes;
    let protected = routes.is_protected(path);
    let access_token = get_session_cookie(headers, ACCESS_COOKIE_NAME);
    let refresh_token = get_session_cookie(headers, REFRESH_COOKIE_NAME);

    let confirmed = match (access_token, refresh_token) {
        (None, None) => {
            return if protected {
                debug!(path, "no session, redirecting to landing");
                Access::Redirect {
                    location: routes.unauthenticated_landing().to_string(),
                    clear_session: false,
                    set_cookies: Vec::new(),
                }
            } else {
                Access::allow()
            };
        }
        (None, Some(refresh_token)) => gate.backend.refresh(refresh_token).await,
        (Some(access_token), _) => gate.backend.verify(access_token).await,
    };

    match confirmed {
        Ok(grant) if protected => Access::Allow {
            set_cookies: grant.set_cookies,
        },
        Ok(grant) => {
            debug!(path, "signed in, redirecting to dashboard");
            Access::Redirect {
                location: routes.authenticated_landing().to_string(),
                clear_session: false,
                set_cookies: grant.set_cookies,
            }
        }
        Err(e) => {
            warn!(path, error = %e, "session rejected, clearing cookies");
            Access::Redirect {
                location: routes.unauthenticated_landing().to_string(),
                clear_session: true,
                set_cookies: Vec::new(),
            }
        }
    }
}

/// Axum middleware applying [`evaluate`] to every request outside the bypass list.
pub async fn route_access(State(gate): State<GateState>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    if gate.routes.is_bypassed(&path) {
        return next.run(request).await;
    }

    let access = evaluate(&gate, request.headers(), &path).await;
    access.respond(gate.secure_cookies, next.run(request)).await
}
