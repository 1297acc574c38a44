pub mod session_store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{GameSession, GameSetup, Guess};

pub use session_store::SessionStore;

/// Key under which the in-progress game is kept
pub const CURRENT_GAME_KEY: &str = "current_game";

/// Everything needed to pick a game back up after a restart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedGame {
    pub setup: GameSetup,
    pub session: GameSession,
    #[serde(default)]
    pub pending: Option<PendingAnswer>,
    pub saved_at: DateTime<Utc>,
}

/// An answer the backend accepted but whose result was not applied yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingAnswer {
    pub round: u32,
    pub question_session_id: String,
    pub guess: Guess,
    pub answer_time_seconds: i64,
}

impl SavedGame {
    pub fn new(setup: GameSetup, session: GameSession) -> Self {
        Self {
            setup,
            session,
            pending: None,
            saved_at: Utc::now(),
        }
    }

    pub fn touch(&mut self) {
        self.saved_at = Utc::now();
    }
}
