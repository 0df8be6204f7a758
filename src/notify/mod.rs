//! Live notifications over a WebSocket.

mod channel;
mod store;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use channel::NotificationChannel;
pub use store::{Action, DEFAULT_CAPACITY, NotificationStore};

/// Frame exchanged with the notification server, in both directions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerEvent {
    pub event: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Known notification kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// Someone invited the user to a game.
    GameInvite { from: String, invite_id: Option<i64> },
    /// A game invite the user sent was accepted.
    InviteAccepted { game_id: String },
    /// The server wants the user in a game now.
    RedirectToGame { game_id: String },
    FriendRequest { from: String },
    Other(ServerEvent),
}

#[derive(Deserialize)]
struct FromPayload {
    from: String,
    #[serde(default)]
    invite_id: Option<i64>,
}

#[derive(Deserialize)]
struct GamePayload {
    game_id: String,
}

impl Notification {
    /// Interpret a raw frame. Unknown events and malformed payloads are kept as `Other`.
    pub fn from_event(event: ServerEvent) -> Self {
        let parsed = match event.event.as_str() {
            "game_invite" => serde_json::from_value::<FromPayload>(event.data.clone())
                .ok()
                .map(|p| Notification::GameInvite {
                    from: p.from,
                    invite_id: p.invite_id,
                }),
            "invite_accepted" => serde_json::from_value::<GamePayload>(event.data.clone())
                .ok()
                .map(|p| Notification::InviteAccepted { game_id: p.game_id }),
            "redirect_to_game" => serde_json::from_value::<GamePayload>(event.data.clone())
                .ok()
                .map(|p| Notification::RedirectToGame { game_id: p.game_id }),
            "friend_request" => serde_json::from_value::<FromPayload>(event.data.clone())
                .ok()
                .map(|p| Notification::FriendRequest { from: p.from }),
            _ => None,
        };
        parsed.unwrap_or(Notification::Other(event))
    }

    /// Page the UI should move to in response, if any.
    pub fn route(&self) -> Option<String> {
        match self {
            Notification::InviteAccepted { game_id } | Notification::RedirectToGame { game_id } => {
                Some(format!("/game/{}", game_id))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("invalid session cookie")]
    Cookie(#[from] tokio_tungstenite::tungstenite::http::header::InvalidHeaderValue),

    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
}
