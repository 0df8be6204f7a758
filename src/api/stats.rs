//! Player profile, statistics and match history.

use serde::{Deserialize, Serialize};

use super::{PongApi, segment};
use crate::client::ApiRequest;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub username: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub level: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerStats {
    pub games_played: u32,
    pub wins: u32,
    pub losses: u32,
    pub goals_scored: u32,
    pub goals_conceded: u32,
}

impl PlayerStats {
    /// Share of games won, 0.0 when no games were played.
    pub fn win_rate(&self) -> f64 {
        if self.games_played == 0 {
            0.0
        } else {
            f64::from(self.wins) / f64::from(self.games_played)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchResult {
    Win,
    Loss,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub opponent: String,
    pub score: u32,
    pub opponent_score: u32,
    pub result: MatchResult,
    pub played_at: String,
}

impl PongApi {
    /// Signed-in user's profile, `None` when it cannot be loaded.
    pub async fn current_user(&self) -> Option<Profile> {
        self.read_or_default(ApiRequest::get("/users/me")).await
    }

    pub async fn player_stats(&self, username: &str) -> PlayerStats {
        self.read_or_default(ApiRequest::get(format!("/stats/{}", segment(username))))
            .await
    }

    pub async fn match_history(&self, username: &str) -> Vec<MatchRecord> {
        self.read_or_default(ApiRequest::get(format!(
            "/game/history/{}",
            segment(username)
        )))
        .await
    }
}
