//! Game invitations.

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::PongApi;
use crate::client::{ApiRequest, ClientError};

/// A game invitation sent to the current user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameInvite {
    pub id: i64,
    pub sender: String,
}

/// Where to go once an invitation is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStart {
    pub game_id: String,
}

impl GameStart {
    /// Page route of the game.
    pub fn route(&self) -> String {
        format!("/game/{}", self.game_id)
    }
}

impl PongApi {
    pub async fn game_invites(&self) -> Vec<GameInvite> {
        self.read_or_default(ApiRequest::get("/game/invitations"))
            .await
    }

    pub async fn send_game_invite(&self, username: &str) -> Result<(), ClientError> {
        let request = ApiRequest::post("/game/invitations").json(&json!({ "username": username }))?;
        self.write(request).await
    }

    pub async fn accept_game_invite(&self, id: i64) -> Result<GameStart, ClientError> {
        self.fetch(&ApiRequest::post(format!("/game/invitations/{}/accept", id)))
            .await
    }
}
