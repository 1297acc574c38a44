use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scoring::{self, GeoPoint, Points, RoundAttempt, ScoreBreakdown, Year};

pub const DEFAULT_GOOD_ROUND_THRESHOLD: Points = 800;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("game session is already completed")]
    AlreadyCompleted,
    #[error("round {got} cannot be submitted, session expects round {expected}")]
    RoundMismatch { expected: u32, got: u32 },
    #[error("a game needs at least one round, got {0}")]
    InvalidRoundCount(u32),
    #[error("session snapshot is inconsistent: {0}")]
    Corrupted(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    InProgress,
    Completed,
}

/// Round-by-round state of one game. Scores are append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSession {
    total_rounds: u32,
    current_round: u32,
    scores: Vec<ScoreBreakdown>,
    streak_count: u32,
    good_round_threshold: Points,
}

impl GameSession {
    pub fn new(total_rounds: u32) -> Result<Self, SessionError> {
        if total_rounds == 0 {
            return Err(SessionError::InvalidRoundCount(total_rounds));
        }

        Ok(Self {
            total_rounds,
            current_round: 1,
            scores: Vec::with_capacity(total_rounds as usize),
            streak_count: 0,
            good_round_threshold: DEFAULT_GOOD_ROUND_THRESHOLD,
        })
    }

    /// Accuracy score (bonuses excluded) a round needs to extend the streak
    pub fn with_good_round_threshold(mut self, threshold: Points) -> Self {
        self.good_round_threshold = threshold;
        self
    }

    pub fn state(&self) -> SessionState {
        if self.scores.len() == self.total_rounds as usize {
            SessionState::Completed
        } else {
            SessionState::InProgress
        }
    }

    pub fn is_completed(&self) -> bool {
        self.state() == SessionState::Completed
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn total_rounds(&self) -> u32 {
        self.total_rounds
    }

    pub fn scores(&self) -> &[ScoreBreakdown] {
        &self.scores
    }

    pub fn streak_count(&self) -> u32 {
        self.streak_count
    }

    pub fn has_scored_round(&self, round: u32) -> bool {
        round >= 1 && round as usize <= self.scores.len()
    }

    /// Build an attempt for the current round carrying this session's streak
    pub fn attempt(
        &self,
        guessed_year: Year,
        actual_year: Year,
        guessed_location: GeoPoint,
        actual_location: GeoPoint,
        answer_time_seconds: i64,
    ) -> RoundAttempt {
        RoundAttempt {
            guessed_year,
            actual_year,
            guessed_location,
            actual_location,
            answer_time_seconds,
            streak_count: self.streak_count,
        }
    }

    /// Score the attempt for the current round and advance
    pub fn submit_answer(&mut self, attempt: &RoundAttempt) -> Result<&ScoreBreakdown, SessionError> {
        if self.is_completed() {
            return Err(SessionError::AlreadyCompleted);
        }

        let breakdown = scoring::score_attempt(attempt);
        self.update_streak(&breakdown);
        self.scores.push(breakdown);
        self.advance_round();

        Ok(&self.scores[self.scores.len() - 1])
    }

    /// Like `submit_answer`, but refuses a round that is already scored or not reached yet
    pub fn submit_round(
        &mut self,
        round: u32,
        attempt: &RoundAttempt,
    ) -> Result<&ScoreBreakdown, SessionError> {
        if self.is_completed() {
            return Err(SessionError::AlreadyCompleted);
        }
        if round != self.current_round {
            return Err(SessionError::RoundMismatch {
                expected: self.current_round,
                got: round,
            });
        }
        self.submit_answer(attempt)
    }

    pub fn total_score(&self) -> Points {
        self.scores.iter().map(|s| s.final_score).sum()
    }

    pub fn average_score(&self) -> f64 {
        self.total_score() as f64 / self.total_rounds as f64
    }

    /// Highest-scoring round as (round number, breakdown)
    pub fn best_round(&self) -> Option<(u32, &ScoreBreakdown)> {
        self.scores
            .iter()
            .enumerate()
            .max_by_key(|(_, s)| s.final_score)
            .map(|(idx, s)| (idx as u32 + 1, s))
    }

    /// Check the round invariants, e.g. after restoring a snapshot
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.total_rounds == 0 {
            return Err(SessionError::InvalidRoundCount(0));
        }

        let scored = self.scores.len();
        let expected_round = if scored == self.total_rounds as usize {
            self.total_rounds
        } else {
            scored as u32 + 1
        };

        if scored > self.total_rounds as usize {
            return Err(SessionError::Corrupted(format!(
                "{} scores recorded for {} rounds",
                scored, self.total_rounds
            )));
        }
        if self.current_round != expected_round {
            return Err(SessionError::Corrupted(format!(
                "current round {} with {} scores recorded",
                self.current_round, scored
            )));
        }
        Ok(())
    }

    // --- Helper Methods ---

    fn update_streak(&mut self, breakdown: &ScoreBreakdown) {
        if breakdown.accuracy_score() >= self.good_round_threshold {
            self.streak_count += 1;
        } else {
            self.streak_count = 0;
        }
    }

    fn advance_round(&mut self) {
        if !self.is_completed() {
            self.current_round += 1;
        }
    }
}
