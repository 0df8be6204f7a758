//! Friends, invitations and blocking.

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{PongApi, segment};
use crate::client::{ApiRequest, ClientError};

/// Another player as shown in friend and block lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub username: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub online: bool,
}

/// A pending friend invitation addressed to the current user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendInvitation {
    pub id: i64,
    pub sender: UserSummary,
}

impl PongApi {
    pub async fn friends(&self) -> Vec<UserSummary> {
        self.read_or_default(ApiRequest::get("/friends")).await
    }

    pub async fn friend_invitations(&self) -> Vec<FriendInvitation> {
        self.read_or_default(ApiRequest::get("/friends/invitations"))
            .await
    }

    pub async fn blocked_users(&self) -> Vec<UserSummary> {
        self.read_or_default(ApiRequest::get("/friends/blocked"))
            .await
    }

    pub async fn send_friend_invitation(&self, username: &str) -> Result<(), ClientError> {
        let request = ApiRequest::post("/friends/invitations").json(&json!({ "username": username }))?;
        self.write(request).await
    }

    pub async fn accept_friend_invitation(&self, id: i64) -> Result<(), ClientError> {
        self.write(ApiRequest::post(format!("/friends/invitations/{}/accept", id)))
            .await
    }

    pub async fn decline_friend_invitation(&self, id: i64) -> Result<(), ClientError> {
        self.write(ApiRequest::post(format!("/friends/invitations/{}/decline", id)))
            .await
    }

    pub async fn remove_friend(&self, username: &str) -> Result<(), ClientError> {
        self.write(ApiRequest::delete(format!("/friends/{}", segment(username))))
            .await
    }

    pub async fn block_user(&self, username: &str) -> Result<(), ClientError> {
        let request = ApiRequest::post("/friends/blocked").json(&json!({ "username": username }))?;
        self.write(request).await
    }

    pub async fn unblock_user(&self, username: &str) -> Result<(), ClientError> {
        self.write(ApiRequest::delete(format!(
            "/friends/blocked/{}",
            segment(username)
        )))
        .await
    }
}
