use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

use super::{RawId, RawScoringDetails};
use crate::domain::{GameSummary, QuestionSummary};
use crate::errors::parse_context;
use crate::scoring::Points;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawGameResultResponse {
    Enveloped { data: RawGameResult },
    Flat(RawGameResult),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGameResult {
    #[serde(default, alias = "id")]
    game_session_id: Option<RawId>,
    total_score: Points,
    #[serde(default)]
    average_score: Option<f64>,
    #[serde(default, alias = "results", alias = "questionResults")]
    questions: Vec<RawQuestionSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuestionSummary {
    #[serde(default)]
    event_id: Option<RawId>,
    #[serde(default)]
    final_score: Option<Points>,
    #[serde(default)]
    scoring_details: Option<RawScoringDetails>,
}

impl RawQuestionSummary {
    fn final_score(&self) -> Points {
        self.final_score
            .or_else(|| self.scoring_details.as_ref().and_then(|d| d.final_score))
            .unwrap_or(0)
    }
}

/// Normalize a `GET /game/result/{id}` payload; `requested_id` fills in a missing session id
pub fn parse_game_result(value: Value, requested_id: &str) -> Result<GameSummary> {
    let response: RawGameResultResponse =
        serde_json::from_value(value).with_context(|| parse_context("game result"))?;

    let raw = match response {
        RawGameResultResponse::Enveloped { data } => data,
        RawGameResultResponse::Flat(raw) => raw,
    };

    let questions: Vec<QuestionSummary> = raw
        .questions
        .iter()
        .map(|q| QuestionSummary {
            event_id: q.event_id.clone().map(RawId::into_string),
            final_score: q.final_score(),
        })
        .collect();

    let average_score = raw
        .average_score
        .unwrap_or_else(|| average(raw.total_score, questions.len()));

    Ok(GameSummary {
        game_session_id: raw
            .game_session_id
            .map(RawId::into_string)
            .unwrap_or_else(|| requested_id.to_string()),
        total_score: raw.total_score,
        average_score,
        questions,
    })
}

fn average(total: Points, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    }
}
