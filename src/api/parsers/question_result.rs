use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

use super::{RawId, RawLocation, RawScoringDetails};
use crate::domain::{QuestionOutcome, ReportedScore};
use crate::errors::parse_context;
use crate::scoring::Year;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawQuestionResult {
    Enveloped { data: Box<RawQuestionResult> },
    Flat(FlatResult),
    Nested(NestedResult),
}

/// Answer given next to the guess as `actualYear` / `actualLocation`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FlatResult {
    #[serde(alias = "id")]
    question_session_id: RawId,
    #[serde(default)]
    event_id: Option<RawId>,
    actual_year: Year,
    actual_location: RawLocation,
    #[serde(default)]
    scoring_details: Option<RawScoringDetails>,
}

/// Answer carried by an embedded `event` object
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NestedResult {
    #[serde(alias = "id")]
    question_session_id: RawId,
    event: AnswerEvent,
    #[serde(default)]
    scoring_details: Option<RawScoringDetails>,
}

#[derive(Debug, Deserialize)]
struct AnswerEvent {
    #[serde(default)]
    id: Option<RawId>,
    #[serde(alias = "actualYear")]
    year: Year,
    #[serde(alias = "coordinates", alias = "actualLocation")]
    location: RawLocation,
}

/// Normalize any known `GET /game/question-result/{id}` payload
pub fn parse_question_result(value: Value) -> Result<QuestionOutcome> {
    let raw: RawQuestionResult =
        serde_json::from_value(value).with_context(|| parse_context("question result"))?;
    Ok(normalize(raw))
}

fn normalize(raw: RawQuestionResult) -> QuestionOutcome {
    match raw {
        RawQuestionResult::Enveloped { data } => normalize(*data),
        RawQuestionResult::Flat(flat) => QuestionOutcome {
            question_session_id: flat.question_session_id.into_string(),
            event_id: flat.event_id.map(RawId::into_string),
            actual_year: flat.actual_year,
            actual_location: flat.actual_location.into(),
            reported: reported_score(flat.scoring_details),
        },
        RawQuestionResult::Nested(nested) => QuestionOutcome {
            question_session_id: nested.question_session_id.into_string(),
            event_id: nested.event.id.map(RawId::into_string),
            actual_year: nested.event.year,
            actual_location: nested.event.location.into(),
            reported: reported_score(nested.scoring_details),
        },
    }
}

fn reported_score(details: Option<RawScoringDetails>) -> Option<ReportedScore> {
    let details = details?;
    Some(ReportedScore {
        time_score: details.time_score,
        location_score: details.location_score,
        bonus_score: details.bonus_score,
        final_score: details.final_score?,
    })
}
