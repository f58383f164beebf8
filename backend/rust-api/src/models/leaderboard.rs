use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub player_name: String,
    pub score: i64,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LeaderboardResponse {
    pub entries: Vec<LeaderboardEntry>,
    /// True when the store is unconfigured and static fallback content is shown.
    pub degraded: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SaveScoreRequest {
    pub session_id: String,
    #[validate(length(min = 1, max = 32))]
    pub player_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SaveScoreResponse {
    pub player_name: String,
    pub score: i64,
}
