use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use std::sync::Arc;

use super::{AppState, HistoryParams};
use crate::api::models::{HistoryItem, HistoryResponse};
use crate::database::games;

pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HistoryParams>,
) -> impl IntoResponse {
    let limit = params.limit.unwrap_or(20).clamp(1, 100);

    let mut conn = match state.pool.get() {
        Ok(conn) => conn,
        Err(_) => return (StatusCode::INTERNAL_SERVER_ERROR, "DB Connection Error").into_response(),
    };

    let games = match games::list_recent_games(&mut conn, limit) {
        Ok(games) => games,
        Err(e) => return (StatusCode::INTERNAL_SERVER_ERROR, format!("Query Error: {}", e)).into_response(),
    };

    let mut items = Vec::with_capacity(games.len());
    for game in games {
        let rounds = match games::list_rounds(&mut conn, game.id) {
            Ok(rounds) => rounds,
            Err(e) => return (StatusCode::INTERNAL_SERVER_ERROR, format!("Query Error: {}", e)).into_response(),
        };
        items.push(HistoryItem { game, rounds });
    }

    Json(HistoryResponse {
        total: items.len(),
        items,
    })
    .into_response()
}
