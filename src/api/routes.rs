use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::api::handlers::{
    history::get_history,
    score::{score_round, summarize_session},
    AppState,
};

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/score", post(score_round))
        .route("/api/session/summary", post(summarize_session))
        .route("/api/history", get(get_history))
        .with_state(state)
}
