//! CLI argument parsing, validation, and startup helpers.

use crate::ServerConfig;
use crate::auth::AuthEndpoints;
use crate::routes::{DEFAULT_AUTHENTICATED_LANDING, DEFAULT_UNAUTHENTICATED_LANDING, RouteTable};
use clap::Parser;
use tracing::error;
use url::Url;

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "PongArcadia",
    about = "Front-end gateway for PongArcadia with session-gated pages"
)]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PONGARCADIA_PORT", default_value = "3000")]
    pub port: u16,

    /// Base URL of the backend API
    #[arg(
        long,
        env = "PONGARCADIA_BACKEND_URL",
        default_value = "http://localhost:8000/api"
    )]
    pub backend_url: String,

    /// Public origin of this gateway; cookies get the Secure flag when it is HTTPS
    #[arg(
        long,
        env = "PONGARCADIA_PUBLIC_ORIGIN",
        default_value = "http://localhost:3000"
    )]
    pub public_origin: String,

    /// Routes reachable without a session (comma separated). Everything else is protected
    #[arg(
        long,
        env = "PONGARCADIA_UNPROTECTED",
        value_delimiter = ',',
        value_parser = validate_route,
        default_values = ["/", "/auth/callback"]
    )]
    pub unprotected: Vec<String>,

    /// Paths served without any session check (comma separated). A trailing '/' matches a prefix
    #[arg(
        long,
        env = "PONGARCADIA_BYPASS",
        value_delimiter = ',',
        value_parser = validate_route,
        default_values = ["/healthz", "/favicon.ico", "/static/"]
    )]
    pub bypass: Vec<String>,

    /// Where visitors without a session are sent
    #[arg(long, value_parser = validate_route, default_value = DEFAULT_UNAUTHENTICATED_LANDING)]
    pub landing: String,

    /// Where signed-in users are sent from unprotected pages
    #[arg(long, value_parser = validate_route, default_value = DEFAULT_AUTHENTICATED_LANDING)]
    pub dashboard: String,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

fn validate_route(s: &str) -> Result<String, String> {
    if !s.starts_with('/') {
        return Err(format!("Route must start with '/': {}", s));
    }

    if s.chars().any(|c| !c.is_ascii() || c.is_whitespace()) {
        return Err(format!("Route contains invalid characters: {}", s));
    }

    Ok(s.to_string())
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Parse and validate an HTTP(S) URL argument.
/// Returns None and logs an error if validation fails.
pub fn validate_http_url(name: &str, value: &str) -> Option<Url> {
    let url = match Url::parse(value) {
        Ok(url) => url,
        Err(e) => {
            error!(argument = name, url = %value, error = %e, "Invalid URL");
            return None;
        }
    };

    if url.scheme() != "http" && url.scheme() != "https" {
        error!(argument = name, url = %value, "URL must use http or https");
        return None;
    }

    Some(url)
}

/// Build ServerConfig from validated arguments.
/// Returns None and logs an error if the arguments are inconsistent.
pub fn build_config(args: &Args) -> Option<ServerConfig> {
    let backend_url = validate_http_url("backend-url", &args.backend_url)?;
    let public_origin = validate_http_url("public-origin", &args.public_origin)?;
    let secure_cookies = public_origin.scheme() == "https";

    let routes = match RouteTable::new(
        args.unprotected.iter().cloned(),
        args.landing.clone(),
        args.dashboard.clone(),
    ) {
        Ok(routes) => routes.with_bypass(args.bypass.iter().cloned()),
        Err(e) => {
            error!(error = %e, "Invalid route configuration");
            return None;
        }
    };

    Some(ServerConfig {
        backend_url,
        endpoints: AuthEndpoints::default(),
        routes,
        secure_cookies,
    })
}
