//! Client-side navigation requests.

use tokio::sync::watch;
use tracing::info;

/// Receives "go to this route" requests from the API client.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

/// Navigator that only logs. Used when no UI is attached.
#[derive(Debug, Default)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, route: &str) {
        info!(route, "navigation requested");
    }
}

/// Navigator publishing the latest requested route to subscribers.
#[derive(Debug)]
pub struct RouteSignal {
    tx: watch::Sender<Option<String>>,
}

impl Default for RouteSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteSignal {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.tx.subscribe()
    }

    /// Last requested route, if any.
    pub fn current(&self) -> Option<String> {
        self.tx.borrow().clone()
    }
}

impl Navigator for RouteSignal {
    fn navigate(&self, route: &str) {
        info!(route, "navigation requested");
        self.tx.send_replace(Some(route.to_string()));
    }
}
