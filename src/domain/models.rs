use std::fmt;

use serde::{Deserialize, Serialize};

use crate::scoring::{GeoPoint, Points, Year};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Timed,
    Untimed,
}

impl GameMode {
    pub fn as_str(&self) -> &str {
        match self {
            GameMode::Timed => "timed",
            GameMode::Untimed => "untimed",
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    #[serde(other)]
    Unknown,
}

/// Historical event shown to the player (the answer is not part of it)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalEvent {
    pub id: String,
    pub description: String,
    pub detail: Option<String>,
    pub image_url: Option<String>,
    pub difficulty: Option<Difficulty>,
}

/// What the player typed in for one round
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Guess {
    pub year: Year,
    pub location: GeoPoint,
}

/// A freshly started game on the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSetup {
    pub game_session_id: String,
    pub event_ids: Vec<String>,
    pub game_mode: GameMode,
    pub time_limit: Option<u32>,
}

impl GameSetup {
    pub fn total_rounds(&self) -> u32 {
        self.event_ids.len() as u32
    }

    /// Event played in the given 1-based round
    pub fn event_for_round(&self, round: u32) -> Option<&str> {
        let idx = (round as usize).checked_sub(1)?;
        self.event_ids.get(idx).map(String::as_str)
    }
}

/// Score components as the backend reported them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportedScore {
    pub time_score: Option<Points>,
    pub location_score: Option<Points>,
    pub bonus_score: Option<Points>,
    pub final_score: Points,
}

/// Backend's verdict for one submitted answer, normalized
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionOutcome {
    pub question_session_id: String,
    pub event_id: Option<String>,
    pub actual_year: Year,
    pub actual_location: GeoPoint,
    pub reported: Option<ReportedScore>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSummary {
    pub event_id: Option<String>,
    pub final_score: Points,
}

/// Backend's aggregate for a finished game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    pub game_session_id: String,
    pub total_score: Points,
    pub average_score: f64,
    pub questions: Vec<QuestionSummary>,
}
