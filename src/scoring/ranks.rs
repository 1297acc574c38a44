use super::types::{Rank, YearGap};

// Rank thresholds are independent of the score bands in `engine`.
const YEAR_RANKS: [(YearGap, Rank); 5] = [
    (0, Rank::Perfect),
    (1, Rank::Excellent),
    (3, Rank::Good),
    (10, Rank::Average),
    (25, Rank::Poor),
];

const DISTANCE_RANKS: [(f64, Rank); 5] = [
    (0.1, Rank::Perfect),
    (1.0, Rank::Excellent),
    (10.0, Rank::Good),
    (50.0, Rank::Average),
    (200.0, Rank::Poor),
];

pub fn time_rank(year_diff: YearGap) -> Rank {
    YEAR_RANKS
        .iter()
        .find(|(limit, _)| year_diff <= *limit)
        .map(|(_, rank)| *rank)
        .unwrap_or(Rank::VeryPoor)
}

pub fn location_rank(distance_km: f64) -> Rank {
    DISTANCE_RANKS
        .iter()
        .find(|(limit, _)| distance_km <= *limit)
        .map(|(_, rank)| *rank)
        .unwrap_or(Rank::VeryPoor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_rank_thresholds() {
        assert_eq!(time_rank(0), Rank::Perfect);
        assert_eq!(time_rank(1), Rank::Excellent);
        assert_eq!(time_rank(2), Rank::Good);
        assert_eq!(time_rank(3), Rank::Good);
        assert_eq!(time_rank(4), Rank::Average);
        assert_eq!(time_rank(10), Rank::Average);
        assert_eq!(time_rank(25), Rank::Poor);
        assert_eq!(time_rank(26), Rank::VeryPoor);
        assert_eq!(time_rank(u32::MAX), Rank::VeryPoor);
    }

    #[test]
    fn location_rank_thresholds() {
        assert_eq!(location_rank(0.0), Rank::Perfect);
        assert_eq!(location_rank(0.1), Rank::Perfect);
        assert_eq!(location_rank(0.5), Rank::Excellent);
        assert_eq!(location_rank(9.9), Rank::Good);
        assert_eq!(location_rank(50.0), Rank::Average);
        assert_eq!(location_rank(150.0), Rank::Poor);
        assert_eq!(location_rank(5000.0), Rank::VeryPoor);
    }

    #[test]
    fn ranks_never_improve_as_error_grows() {
        let mut previous = Rank::Perfect;
        for diff in 0..60 {
            let rank = time_rank(diff);
            assert!(rank >= previous);
            previous = rank;
        }

        let mut previous = Rank::Perfect;
        for step in 0..500 {
            let rank = location_rank(step as f64 * 0.7);
            assert!(rank >= previous);
            previous = rank;
        }
    }

    #[test]
    fn nan_distance_is_very_poor() {
        assert_eq!(location_rank(f64::NAN), Rank::VeryPoor);
    }
}
