use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

use super::RawId;
use crate::domain::{Difficulty, HistoricalEvent};
use crate::errors::parse_context;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawEventResponse {
    Nested { event: RawEvent },
    Enveloped { data: RawEvent },
    Flat(RawEvent),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEvent {
    #[serde(alias = "eventId")]
    id: RawId,
    #[serde(alias = "title")]
    description: String,
    #[serde(default)]
    detail: Option<String>,
    #[serde(default, alias = "image")]
    image_url: Option<String>,
    #[serde(default)]
    difficulty: Option<Difficulty>,
}

impl From<RawEvent> for HistoricalEvent {
    fn from(raw: RawEvent) -> Self {
        HistoricalEvent {
            id: raw.id.into_string(),
            description: raw.description,
            detail: raw.detail.filter(|d| !d.trim().is_empty()),
            image_url: raw.image_url.filter(|u| !u.trim().is_empty()),
            difficulty: raw.difficulty,
        }
    }
}

/// Normalize any known `GET /events/{id}` payload
pub fn parse_event(value: Value) -> Result<HistoricalEvent> {
    let response: RawEventResponse =
        serde_json::from_value(value).with_context(|| parse_context("event response"))?;

    let raw = match response {
        RawEventResponse::Nested { event } => event,
        RawEventResponse::Enveloped { data } => data,
        RawEventResponse::Flat(event) => event,
    };
    Ok(raw.into())
}
