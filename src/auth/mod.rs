//! Session authentication for page navigation.
//!
//! Sessions are two opaque cookies (`accessToken`, `refreshToken`) issued by
//! the backend. The gateway never parses them; it only checks which are
//! present and asks the backend to refresh or verify them.

mod backend;
mod cookie;
mod endpoints;
mod errors;
mod middleware;
mod state;

pub use backend::{HttpSessionBackend, SessionBackend, SessionGrant, confirms};
pub use cookie::{
    ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME, clear_cookie, clear_session_cookies, get_cookie,
    get_session_cookie,
};
pub use endpoints::{AuthEndpoints, join_url};
pub use errors::SessionError;
pub use middleware::{Access, evaluate, route_access};
pub use state::GateState;
