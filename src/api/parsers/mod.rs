//! Normalization of the backend's response shapes.
//!
//! Different backend versions nest the same data under different field
//! names. Every known shape is an untagged variant here and gets folded into
//! the canonical domain types before anything downstream sees it.

pub mod event;
pub mod game_result;
pub mod question_result;

use serde::{Deserialize, Serialize};

use crate::scoring::{GeoPoint, Points};

pub use event::parse_event;
pub use game_result::parse_game_result;
pub use question_result::parse_question_result;

/// Identifier sent either as a string or as a number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Text(String),
    Number(i64),
}

impl RawId {
    pub fn into_string(self) -> String {
        match self {
            RawId::Text(text) => text,
            RawId::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawLocation {
    LatLng { lat: f64, lng: f64 },
    LatitudeLongitude { latitude: f64, longitude: f64 },
}

impl From<RawLocation> for GeoPoint {
    fn from(raw: RawLocation) -> Self {
        match raw {
            RawLocation::LatLng { lat, lng } => GeoPoint::new(lat, lng),
            RawLocation::LatitudeLongitude {
                latitude,
                longitude,
            } => GeoPoint::new(latitude, longitude),
        }
    }
}

/// `scoringDetails` block; every field is optional across versions
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawScoringDetails {
    pub time_score: Option<Points>,
    pub location_score: Option<Points>,
    pub bonus_score: Option<Points>,
    #[serde(alias = "totalScore")]
    pub final_score: Option<Points>,
}
