// Trending badge
//
// The score itself comes precomputed from ingestion (a z-score of recent
// download growth). We only apply the cutoff here.

/// Scores strictly above this are trending
pub const TRENDING_THRESHOLD: f64 = 10.0;

/// Is a plugin with this score trending right now?
///
/// No smoothing, no hysteresis. A missing score (or NaN) is not trending.
pub fn is_trending(score: Option<f64>) -> bool {
    score.is_some_and(|s| s > TRENDING_THRESHOLD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold() {
        assert!(!is_trending(Some(10.0)));
        assert!(is_trending(Some(10.0001)));
        assert!(is_trending(Some(42.0)));
        assert!(!is_trending(Some(9.99)));
        assert!(!is_trending(Some(-3.0)));
    }

    #[test]
    fn test_matches_plain_comparison() {
        for s in [-100.0, 0.0, 5.5, 9.999, 10.0, 10.5, 11.0, 1e9] {
            assert_eq!(is_trending(Some(s)), s > 10.0, "score {}", s);
        }
    }

    #[test]
    fn test_missing_or_nan_score() {
        assert!(!is_trending(None));
        assert!(!is_trending(Some(f64::NAN)));
        assert!(is_trending(Some(f64::INFINITY)));
    }
}
