use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub type Year = i32;
/// Absolute distance between two years
pub type YearGap = u32;
pub type Points = i64;

/// Latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.lat, self.lng)
    }
}

/// One submitted guess together with the answer it is judged against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundAttempt {
    pub guessed_year: Year,
    pub actual_year: Year,
    pub guessed_location: GeoPoint,
    pub actual_location: GeoPoint,
    #[serde(alias = "answerTime")]
    pub answer_time_seconds: i64,
    #[serde(default)]
    pub streak_count: u32,
}

/// Qualitative accuracy label, best first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rank {
    Perfect,
    Excellent,
    Good,
    Average,
    Poor,
    VeryPoor,
}

impl Rank {
    pub fn as_str(&self) -> &str {
        match self {
            Rank::Perfect => "perfect",
            Rank::Excellent => "excellent",
            Rank::Good => "good",
            Rank::Average => "average",
            Rank::Poor => "poor",
            Rank::VeryPoor => "very_poor",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display tag earned during a round
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Achievement {
    Speed,
    SpeedBonus,
    Perfectionist,
    SinglePerfect,
    Streak(u32),
}

impl fmt::Display for Achievement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Achievement::Speed => f.write_str("speed"),
            Achievement::SpeedBonus => f.write_str("speed-bonus"),
            Achievement::Perfectionist => f.write_str("perfectionist"),
            Achievement::SinglePerfect => f.write_str("single-perfect"),
            Achievement::Streak(count) => write!(f, "streak-{}", count),
        }
    }
}

impl FromStr for Achievement {
    type Err = String;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "speed" => Ok(Achievement::Speed),
            "speed-bonus" => Ok(Achievement::SpeedBonus),
            "perfectionist" => Ok(Achievement::Perfectionist),
            "single-perfect" => Ok(Achievement::SinglePerfect),
            other => other
                .strip_prefix("streak-")
                .and_then(|count| count.parse().ok())
                .map(Achievement::Streak)
                .ok_or_else(|| format!("Unknown achievement tag: {}", other)),
        }
    }
}

impl From<Achievement> for String {
    fn from(achievement: Achievement) -> Self {
        achievement.to_string()
    }
}

impl TryFrom<String> for Achievement {
    type Error = String;

    fn try_from(tag: String) -> Result<Self, Self::Error> {
        tag.parse()
    }
}

pub type Achievements = BTreeSet<Achievement>;

/// Sub-components of the bonus score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusBreakdown {
    pub speed: Points,
    pub perfect: Points,
    pub streak: Points,
}

impl BonusBreakdown {
    pub fn total(&self) -> Points {
        self.speed + self.perfect + self.streak
    }
}

/// Fully decomposed result of scoring one round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub time_score: Points,
    pub location_score: Points,
    pub bonus_score: Points,
    pub bonus: BonusBreakdown,
    pub final_score: Points,
    pub time_rank: Rank,
    pub location_rank: Rank,
    pub achievements: Achievements,
    pub year_difference: YearGap,
    pub distance_km: f64,
}

impl ScoreBreakdown {
    /// Weighted accuracy part of the final score, bonuses excluded
    pub fn accuracy_score(&self) -> Points {
        self.final_score - self.bonus_score
    }
}
