use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::database::{GameRecord, RoundRecord};
use crate::domain::{GameMode, GameSession, GameSetup};
use crate::scoring::{GeoPoint, Points, ScoreBreakdown, Year};

pub const MIN_QUESTIONS: u32 = 1;
pub const MAX_QUESTIONS: u32 = 20;

/// Body of `POST /game/start`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartGameRequest {
    pub game_mode: GameMode,
    pub question_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<u32>,
}

impl StartGameRequest {
    pub fn untimed(question_count: u32) -> Self {
        Self {
            game_mode: GameMode::Untimed,
            question_count,
            time_limit: None,
        }
    }

    pub fn timed(question_count: u32, time_limit: u32) -> Self {
        Self {
            game_mode: GameMode::Timed,
            question_count,
            time_limit: Some(time_limit),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(MIN_QUESTIONS..=MAX_QUESTIONS).contains(&self.question_count) {
            bail!(
                "questionCount must be between {} and {}, got {}",
                MIN_QUESTIONS,
                MAX_QUESTIONS,
                self.question_count
            );
        }
        if self.game_mode == GameMode::Timed && self.time_limit.is_none() {
            bail!("timeLimit is required for timed games");
        }
        Ok(())
    }
}

/// Response of `POST /game/start`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartGameResponse {
    pub game_session_id: String,
    pub event_ids: Vec<String>,
    #[serde(default)]
    pub current_question: u32,
    pub total_questions: u32,
    pub game_mode: GameMode,
    #[serde(default)]
    pub time_limit: Option<u32>,
}

impl StartGameResponse {
    pub fn into_setup(self) -> Result<GameSetup> {
        if self.event_ids.is_empty() {
            bail!("Backend started game {} without events", self.game_session_id);
        }
        if self.event_ids.len() as u32 != self.total_questions {
            log::warn!(
                "Game {} reports {} questions but sent {} events",
                self.game_session_id,
                self.total_questions,
                self.event_ids.len()
            );
        }

        Ok(GameSetup {
            game_session_id: self.game_session_id,
            event_ids: self.event_ids,
            game_mode: self.game_mode,
            time_limit: self.time_limit,
        })
    }
}

/// Body of `POST /game/submit`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerRequest {
    pub game_session_id: String,
    pub event_id: String,
    pub guessed_year: Year,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guessed_location: Option<GeoPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_time: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Submitted,
    Completed,
}

/// Response of `POST /game/submit`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerResponse {
    pub question_session_id: String,
    pub game_session_id: String,
    pub status: SubmissionStatus,
}

/// Body of a 409 from `POST /game/submit` for an event that was already answered
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerConflict {
    pub question_session_id: String,
    #[serde(default)]
    pub status: Option<SubmissionStatus>,
}

/// Totals of a locally replayed session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummaryResponse {
    pub total_rounds: u32,
    pub total_score: Points,
    pub average_score: f64,
    pub streak_count: u32,
    pub best_round: Option<u32>,
    pub rounds: Vec<ScoreBreakdown>,
}

impl From<&GameSession> for SessionSummaryResponse {
    fn from(session: &GameSession) -> Self {
        Self {
            total_rounds: session.total_rounds(),
            total_score: session.total_score(),
            average_score: session.average_score(),
            streak_count: session.streak_count(),
            best_round: session.best_round().map(|(round, _)| round),
            rounds: session.scores().to_vec(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    #[serde(flatten)]
    pub game: GameRecord,
    pub rounds: Vec<RoundRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryResponse {
    pub items: Vec<HistoryItem>,
    pub total: usize,
}
