//! State shared by the route middleware.

use std::sync::Arc;

use super::backend::SessionBackend;
use crate::routes::RouteTable;

/// Everything the route middleware needs, passed in explicitly.
#[derive(Clone)]
pub struct GateState {
    pub routes: Arc<RouteTable>,
    pub backend: Arc<dyn SessionBackend>,
    /// Whether to set the Secure flag on cookies we write.
    pub secure_cookies: bool,
}

impl GateState {
    pub fn new(routes: RouteTable, backend: Arc<dyn SessionBackend>, secure_cookies: bool) -> Self {
        Self {
            routes: Arc::new(routes),
            backend,
            secure_cookies,
        }
    }
}
