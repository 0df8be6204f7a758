pub mod api;
pub mod auth;
pub mod cli;
pub mod client;
pub mod notify;
pub mod pages;
pub mod routes;

use auth::{AuthEndpoints, GateState, HttpSessionBackend, SessionBackend, route_access};
use axum::{Router, middleware};
use routes::RouteTable;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use url::Url;

pub struct ServerConfig {
    /// Base URL of the backend API (e.g., "http://localhost:8000/api")
    pub backend_url: Url,
    /// Backend session endpoints, relative to `backend_url`
    pub endpoints: AuthEndpoints,
    /// Route classification and landing routes
    pub routes: RouteTable,
    /// Whether to set Secure flag on cookies (should be true in production with HTTPS)
    pub secure_cookies: bool,
}

/// Create the gateway router, talking to the backend over HTTP.
pub fn create_app(config: &ServerConfig) -> Result<Router, reqwest::Error> {
    let backend = HttpSessionBackend::new(config.backend_url.clone(), config.endpoints.clone())?;
    Ok(create_app_with_backend(config, Arc::new(backend)))
}

/// Create the gateway router with an explicit session backend.
pub fn create_app_with_backend(config: &ServerConfig, backend: Arc<dyn SessionBackend>) -> Router {
    let gate = GateState::new(config.routes.clone(), backend, config.secure_cookies);

    // The layer also wraps the fallback, so unknown routes are gated too.
    pages::router().layer(middleware::from_fn_with_state(gate, route_access))
}

/// Run the server on the given listener. This function blocks until the server exits.
pub async fn run_server(config: ServerConfig, listener: TcpListener) -> Result<(), std::io::Error> {
    let app = create_app(&config).map_err(std::io::Error::other)?;
    axum::serve(listener, app).await
}

/// Start the server on the given port in a background task. Use port 0 to let the OS choose a random port.
/// Returns the actual address the server is listening on.
/// Note: For production use, prefer `run_server` directly in main.
pub async fn start_server(
    config: ServerConfig,
    port: u16,
) -> Result<(tokio::task::JoinHandle<()>, SocketAddr), std::io::Error> {
    let addr = format!("127.0.0.1:{}", port);
    let listener = TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = run_server(config, listener).await {
            tracing::error!(error = %e, "Server error");
        }
    });

    Ok((handle, local_addr))
}
