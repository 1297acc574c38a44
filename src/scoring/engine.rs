use super::ranks::{location_rank, time_rank};
use super::types::{Achievement, Achievements, BonusBreakdown, Points, ScoreBreakdown, YearGap};

pub const MAX_COMPONENT_SCORE: Points = 1000;

const TIME_WEIGHT: f64 = 0.6;
const LOCATION_WEIGHT: f64 = 0.4;

const SPEED_BASELINE_SECS: i64 = 120;
const SPEED_POINTS_PER_SEC: i64 = 5;
const SPEED_ACHIEVEMENT_MIN: Points = 450;

const PERFECT_DISTANCE_KM: f64 = 0.1;
const PERFECT_BOTH_BONUS: Points = 500;
const PERFECT_ONE_BONUS: Points = 200;

const STREAK_POINTS_PER_ROUND: Points = 50;
const STREAK_BONUS_CAP: Points = 500;

/// Year accuracy score. The band formula is applied to the whole difference.
pub fn compute_time_score(year_diff: YearGap) -> Points {
    let diff = Points::from(year_diff);
    let raw = match diff {
        0 => MAX_COMPONENT_SCORE,
        1 => MAX_COMPONENT_SCORE - diff * 10,
        2..=5 => MAX_COMPONENT_SCORE - diff * 15,
        6..=10 => MAX_COMPONENT_SCORE - diff * 20,
        _ => MAX_COMPONENT_SCORE - diff.saturating_mul(25),
    };
    raw.clamp(0, MAX_COMPONENT_SCORE)
}

/// Location accuracy score, rounded to whole points
pub fn compute_location_score(distance_km: f64) -> Points {
    let per_km = location_penalty_per_km(distance_km);
    let raw = (MAX_COMPONENT_SCORE as f64 - distance_km * per_km).round();
    // NaN falls through to 0 on the cast
    raw.clamp(0.0, MAX_COMPONENT_SCORE as f64) as Points
}

/// Speed, perfect-accuracy and streak bonuses plus the tags they earn
pub fn compute_bonus(
    answer_time_seconds: i64,
    year_diff: YearGap,
    distance_km: f64,
    streak_count: u32,
) -> (BonusBreakdown, Achievements) {
    let mut achievements = Achievements::new();

    let speed = speed_bonus(answer_time_seconds);
    if speed >= SPEED_ACHIEVEMENT_MIN {
        achievements.insert(Achievement::Speed);
    }
    if speed > 0 {
        achievements.insert(Achievement::SpeedBonus);
    }

    let exact_year = year_diff == 0;
    let exact_location = distance_km <= PERFECT_DISTANCE_KM;
    let perfect = match (exact_year, exact_location) {
        (true, true) => {
            achievements.insert(Achievement::Perfectionist);
            PERFECT_BOTH_BONUS
        }
        (true, false) | (false, true) => {
            achievements.insert(Achievement::SinglePerfect);
            PERFECT_ONE_BONUS
        }
        (false, false) => 0,
    };

    let streak = streak_bonus(streak_count);
    if streak > 0 {
        achievements.insert(Achievement::Streak(streak_count));
    }

    (BonusBreakdown { speed, perfect, streak }, achievements)
}

pub fn compute_score(
    distance_km: f64,
    year_diff: YearGap,
    answer_time_seconds: i64,
    streak_count: u32,
) -> ScoreBreakdown {
    let time_score = compute_time_score(year_diff);
    let location_score = compute_location_score(distance_km);
    let (bonus, achievements) =
        compute_bonus(answer_time_seconds, year_diff, distance_km, streak_count);
    let bonus_score = bonus.total();

    ScoreBreakdown {
        time_score,
        location_score,
        bonus_score,
        bonus,
        final_score: weighted_accuracy(time_score, location_score) + bonus_score,
        time_rank: time_rank(year_diff),
        location_rank: location_rank(distance_km),
        achievements,
        year_difference: year_diff,
        distance_km,
    }
}

// --- Helper Functions ---

fn location_penalty_per_km(distance_km: f64) -> f64 {
    if distance_km <= 1.0 {
        5.0
    } else if distance_km <= 10.0 {
        10.0
    } else if distance_km <= 100.0 {
        15.0
    } else {
        20.0
    }
}

fn weighted_accuracy(time_score: Points, location_score: Points) -> Points {
    (time_score as f64 * TIME_WEIGHT + location_score as f64 * LOCATION_WEIGHT).round() as Points
}

fn speed_bonus(answer_time_seconds: i64) -> Points {
    SPEED_BASELINE_SECS
        .saturating_sub(answer_time_seconds)
        .saturating_mul(SPEED_POINTS_PER_SEC)
        .max(0)
}

fn streak_bonus(streak_count: u32) -> Points {
    (streak_count as Points * STREAK_POINTS_PER_ROUND).min(STREAK_BONUS_CAP)
}
