use anyhow::{Context, Result};
use log::{debug, info, warn};
use reqwest::StatusCode;
use serde_json::Value;
use urlencoding::encode;

use crate::api::models::{
    AnswerConflict, StartGameRequest, SubmissionStatus, SubmitAnswerRequest, SubmitAnswerResponse,
};
use crate::api::parsers;
use crate::config::BackendSettings;
use crate::domain::{GameSetup, GameSummary, HistoricalEvent, QuestionOutcome};
use crate::errors::{fetch_context, ApiError};
use crate::http::RateLimitedClient;
use crate::retry::RetryPolicy;

/// Client for the remote game backend
pub struct GameApiClient {
    client: RateLimitedClient,
    base_url: String,
    retry: RetryPolicy,
}

impl GameApiClient {
    pub fn new(settings: &BackendSettings, retry: RetryPolicy) -> Result<Self> {
        let client = RateLimitedClient::new(
            settings.user_agent,
            settings.timeout_secs,
            settings.rate_limit_ms,
        )?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            retry,
        })
    }

    /// Start a new game session
    pub async fn start_game(&self, request: &StartGameRequest) -> Result<GameSetup> {
        request.validate()?;
        info!(
            "Starting {} game with {} questions",
            request.game_mode, request.question_count
        );

        let url = self.build_url("game/start");
        let response: crate::api::models::StartGameResponse = self
            .retry
            .run("start game", || self.client.post_json(&url, request))
            .await
            .with_context(|| fetch_context("new game session"))?;

        response.into_setup()
    }

    /// Fetch the event shown in a round
    pub async fn fetch_event(&self, event_id: &str) -> Result<HistoricalEvent> {
        let url = self.build_url(&format!("events/{}", encode(event_id)));
        debug!("Fetching event {} from {}", event_id, url);

        let value: Value = self
            .retry
            .run("fetch event", || self.client.get_json(&url))
            .await
            .with_context(|| fetch_context(&format!("event {}", event_id)))?;

        parsers::parse_event(value)
    }

    /// Submit the player's answer for one event.
    ///
    /// A retried submission can land after the backend already stored the
    /// first one; the resulting conflict carries the existing question id and
    /// is treated as an accepted answer.
    pub async fn submit_answer(&self, request: &SubmitAnswerRequest) -> Result<SubmitAnswerResponse> {
        let url = self.build_url("game/submit");
        debug!(
            "Submitting answer for event {} in game {}",
            request.event_id, request.game_session_id
        );

        let result = self
            .retry
            .run("submit answer", || self.client.post_json(&url, request))
            .await;

        match result {
            Ok(response) => Ok(response),
            Err(e) => match already_accepted(&e, request) {
                Some(response) => {
                    warn!(
                        "Answer for event {} was already accepted as {}",
                        request.event_id, response.question_session_id
                    );
                    Ok(response)
                }
                None => Err(e)
                    .with_context(|| format!("Failed to submit answer for event {}", request.event_id)),
            },
        }
    }

    /// Fetch the backend's verdict for a submitted answer
    pub async fn fetch_question_result(&self, question_session_id: &str) -> Result<QuestionOutcome> {
        let url = self.build_url(&format!(
            "game/question-result/{}",
            encode(question_session_id)
        ));

        let value: Value = self
            .retry
            .run("fetch question result", || self.client.get_json(&url))
            .await
            .with_context(|| fetch_context(&format!("question result {}", question_session_id)))?;

        parsers::parse_question_result(value)
    }

    /// Fetch the aggregate result of a game session
    pub async fn fetch_game_result(&self, game_session_id: &str) -> Result<GameSummary> {
        let url = self.build_url(&format!("game/result/{}", encode(game_session_id)));

        let value: Value = self
            .retry
            .run("fetch game result", || self.client.get_json(&url))
            .await
            .with_context(|| fetch_context(&format!("game result {}", game_session_id)))?;

        parsers::parse_game_result(value, game_session_id)
    }

    // --- Helper Methods ---

    fn build_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

fn already_accepted(error: &anyhow::Error, request: &SubmitAnswerRequest) -> Option<SubmitAnswerResponse> {
    let body = error.chain().find_map(|cause| match cause.downcast_ref::<ApiError>() {
        Some(ApiError::Status { status, body, .. }) if *status == StatusCode::CONFLICT => Some(body),
        _ => None,
    })?;
    let conflict: AnswerConflict = serde_json::from_str(body).ok()?;

    Some(SubmitAnswerResponse {
        question_session_id: conflict.question_session_id,
        game_session_id: request.game_session_id.clone(),
        status: conflict.status.unwrap_or(SubmissionStatus::Submitted),
    })
}
