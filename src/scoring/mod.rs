//! Mark-score normalization between display units and stored units.
//!
//! Scores are entered as fractional values in 0..=100 and persisted as
//! integer hundredths (85.5 -> 8550). The round trip is exact for inputs
//! with at most two decimal digits and truncates anything finer.

/// Convert a display score to stored units for the write path.
pub fn to_stored_units(score: f64) -> i64 {
    (score * 100.0).round() as i64
}

/// Convert a stored score back to its display value for the read path.
pub fn to_display_score(stored: i64) -> f64 {
    stored as f64 / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fractional_score_round_trips_exactly() {
        assert_eq!(to_stored_units(85.5), 8550);
        assert_eq!(to_display_score(8550), 85.5);
    }

    #[test]
    fn integer_scores_are_unchanged() {
        assert_eq!(to_display_score(to_stored_units(0.0)), 0.0);
        assert_eq!(to_display_score(to_stored_units(100.0)), 100.0);
        assert_eq!(to_display_score(to_stored_units(42.0)), 42.0);
    }

    #[test]
    fn precision_beyond_hundredths_is_lost() {
        assert_eq!(to_stored_units(33.333), 3333);
        assert_eq!(to_display_score(3333), 33.33);
    }

    #[test]
    fn hundredths_are_preserved() {
        assert_eq!(to_stored_units(99.99), 9999);
        assert_eq!(to_display_score(9999), 99.99);
    }
}
