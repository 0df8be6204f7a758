//! WebSocket connection to the notification server.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::net::TcpStream;
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{HeaderValue, header};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};
use url::Url;

use super::{ChannelError, ServerEvent};
use crate::auth::ACCESS_COOKIE_NAME;
use crate::client::ApiClient;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Buffered incoming events per subscriber.
const EVENT_BUFFER: usize = 64;

#[derive(Serialize)]
struct Outgoing<'a> {
    event: &'a str,
    data: &'a serde_json::Value,
}

/// An owned notification connection.
///
/// The socket is opened lazily on the first [`open`](Self::open) or
/// [`send`](Self::send) and at most one is open at a time. Nothing reconnects
/// on its own: after [`close`](Self::close) or a server-side close, the next
/// `open` or `send` dials again. Clones share the same socket.
#[derive(Clone)]
pub struct NotificationChannel {
    inner: Arc<ChannelInner>,
}

struct ChannelInner {
    url: Url,
    /// Source of the access cookie sent with the upgrade request.
    session: Option<ApiClient>,
    connection: Mutex<Option<Connection>>,
    events: broadcast::Sender<ServerEvent>,
    next_id: AtomicU64,
}

struct Connection {
    id: u64,
    sink: SplitSink<WsStream, Message>,
    reader: JoinHandle<()>,
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

impl NotificationChannel {
    pub fn new(url: Url) -> Self {
        Self::build(url, None)
    }

    /// Channel authenticating with the access cookie currently held by `client`.
    pub fn with_session(url: Url, client: ApiClient) -> Self {
        Self::build(url, Some(client))
    }

    fn build(url: Url, session: Option<ApiClient>) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            inner: Arc::new(ChannelInner {
                url,
                session,
                connection: Mutex::new(None),
                events,
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Receive incoming events from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.inner.events.subscribe()
    }

    pub async fn is_open(&self) -> bool {
        self.inner.connection.lock().await.is_some()
    }

    /// Connect unless already connected.
    pub async fn open(&self) -> Result<(), ChannelError> {
        let mut connection = self.inner.connection.lock().await;
        if connection.is_none() {
            *connection = Some(self.connect().await?);
        }
        Ok(())
    }

    /// Send `{"event": .., "data": ..}`, connecting first if needed.
    pub async fn send(&self, event: &str, data: serde_json::Value) -> Result<(), ChannelError> {
        let text = serde_json::to_string(&Outgoing { event, data: &data })?;

        let mut slot = self.inner.connection.lock().await;
        let mut connection = match slot.take() {
            Some(connection) => connection,
            None => self.connect().await?,
        };

        // A socket that fails to send is dropped rather than put back.
        if let Err(e) = connection.sink.send(Message::Text(text.into())).await {
            warn!(error = %e, "notification send failed, dropping socket");
            return Err(e.into());
        }
        *slot = Some(connection);
        debug!(event, "notification sent");
        Ok(())
    }

    /// Close the socket if open. The channel can be opened again later.
    pub async fn close(&self) {
        let connection = self.inner.connection.lock().await.take();
        if let Some(mut connection) = connection {
            if let Err(e) = connection.sink.close().await {
                debug!(error = %e, "error closing notification socket");
            }
            info!("notification channel closed");
        }
    }

    async fn connect(&self) -> Result<Connection, ChannelError> {
        let mut request = self.inner.url.as_str().into_client_request()?;
        if let Some(token) = self.inner.session.as_ref().and_then(ApiClient::access_token) {
            let cookie = HeaderValue::from_str(&format!("{}={}", ACCESS_COOKIE_NAME, token))?;
            request.headers_mut().insert(header::COOKIE, cookie);
        }

        let (stream, _) = connect_async(request).await?;
        let (sink, source) = stream.split();
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let reader = tokio::spawn(read_events(
            source,
            self.inner.events.clone(),
            Arc::downgrade(&self.inner),
            id,
        ));

        info!(url = %self.inner.url, "notification channel open");
        Ok(Connection { id, sink, reader })
    }
}

/// Forward incoming frames until the socket ends, then forget the connection.
async fn read_events(
    mut source: SplitStream<WsStream>,
    events: broadcast::Sender<ServerEvent>,
    channel: Weak<ChannelInner>,
    id: u64,
) {
    while let Some(message) = source.next().await {
        match message {
            Ok(Message::Text(text)) => match serde_json::from_str::<ServerEvent>(text.as_str()) {
                Ok(event) => {
                    // No subscribers is fine.
                    let _ = events.send(event);
                }
                Err(e) => warn!(error = %e, "ignoring malformed notification"),
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "notification socket error");
                break;
            }
        }
    }

    let Some(channel) = channel.upgrade() else {
        return;
    };
    let mut slot = channel.connection.lock().await;
    if slot.as_ref().is_some_and(|c| c.id == id) {
        info!("notification socket closed by server");
        *slot = None;
    }
}

impl std::fmt::Debug for NotificationChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationChannel")
            .field("url", &self.inner.url)
            .finish()
    }
}
