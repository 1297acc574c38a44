pub mod engine;
pub mod evaluator;
pub mod ranks;
pub mod types;

pub use engine::{compute_bonus, compute_location_score, compute_score, compute_time_score};
pub use evaluator::{distance_km, year_difference};
pub use types::{
    Achievement, Achievements, BonusBreakdown, GeoPoint, Points, Rank, RoundAttempt,
    ScoreBreakdown, Year, YearGap,
};

/// Evaluate a full attempt: distance and year difference, then the score breakdown
pub fn score_attempt(attempt: &RoundAttempt) -> ScoreBreakdown {
    let distance = distance_km(attempt.guessed_location, attempt.actual_location);
    let year_diff = year_difference(attempt.guessed_year, attempt.actual_year);
    compute_score(
        distance,
        year_diff,
        attempt.answer_time_seconds,
        attempt.streak_count,
    )
}
