use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use std::sync::Arc;

use super::AppState;
use crate::api::models::SessionSummaryResponse;
use crate::domain::GameSession;
use crate::scoring::{self, RoundAttempt};

pub async fn score_round(Json(attempt): Json<RoundAttempt>) -> impl IntoResponse {
    if !has_valid_coordinates(&attempt) {
        return (StatusCode::UNPROCESSABLE_ENTITY, "Coordinates out of range").into_response();
    }

    Json(scoring::score_attempt(&attempt)).into_response()
}

/// Replay the attempts in order through a fresh session; each attempt's own
/// streak is replaced by the one the session has built up
pub async fn summarize_session(
    State(state): State<Arc<AppState>>,
    Json(attempts): Json<Vec<RoundAttempt>>,
) -> impl IntoResponse {
    let mut session = match GameSession::new(attempts.len() as u32) {
        Ok(session) => session.with_good_round_threshold(state.config.game.good_round_threshold),
        Err(e) => return (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()).into_response(),
    };

    for (idx, submitted) in attempts.iter().enumerate() {
        if !has_valid_coordinates(submitted) {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("Coordinates out of range in round {}", idx + 1),
            )
                .into_response();
        }
        let attempt = session.attempt(
            submitted.guessed_year,
            submitted.actual_year,
            submitted.guessed_location,
            submitted.actual_location,
            submitted.answer_time_seconds,
        );
        if let Err(e) = session.submit_round(idx as u32 + 1, &attempt) {
            return (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()).into_response();
        }
    }

    Json(SessionSummaryResponse::from(&session)).into_response()
}

fn has_valid_coordinates(attempt: &RoundAttempt) -> bool {
    attempt.guessed_location.is_valid() && attempt.actual_location.is_valid()
}
