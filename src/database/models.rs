use chrono::{DateTime, Utc};
use serde::Serialize;

/// A completed game as stored in the history database
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    pub id: i64,
    pub backend_session_id: String,
    pub game_mode: String,
    pub total_rounds: u32,
    pub total_score: i64,
    pub average_score: f64,
    pub completed_at: DateTime<Utc>,
}

/// One scored round of a stored game
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundRecord {
    pub game_id: i64,
    pub round_number: u32,
    pub event_id: Option<String>,
    pub time_score: i64,
    pub location_score: i64,
    pub bonus_score: i64,
    pub final_score: i64,
    pub time_rank: String,
    pub location_rank: String,
    pub achievements: Vec<String>,
}
