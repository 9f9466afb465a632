//! Read-time aggregation over ratings and comment votes.
//!
//! Nothing here touches the database: callers fetch the raw values for one
//! recipe or comment and hand them over. Stats are recomputed on every read
//! and attached to response DTOs; persisted rows never carry derived fields.

use crate::models::VoteType;
use std::collections::BTreeMap;

/// Number of integer histogram buckets ("1" through "5").
const BUCKETS: i32 = 5;

/// Aggregate view of a recipe's ratings.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingSummary {
    /// Mean of all values rounded to 2 decimal places; `None` when the
    /// recipe has no ratings (never a division by zero).
    pub average: Option<f64>,
    pub count: i64,
    /// Histogram keyed "1".."5"; bucket i counts ratings with
    /// `i <= value < i + 1`.
    pub distribution: BTreeMap<String, i64>,
}

/// Up/down counts for one comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteTally {
    pub upvotes: i64,
    pub downvotes: i64,
}

/// Round to 2 decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Summarize all rating values for one recipe.
///
/// Each bucket is an independent half-open range filter `[i, i + 1)` over
/// the same scan, matching the reference behavior exactly: a rating of
/// exactly 5.0 contributes to the average and the count but to no bucket.
/// That boundary quirk is intentional (kept for compatibility) and pinned
/// by a test below.
pub fn summarize_ratings(values: &[f64]) -> RatingSummary {
    let count = values.len() as i64;

    let average = if values.is_empty() {
        None
    } else {
        let sum: f64 = values.iter().sum();
        Some(round2(sum / values.len() as f64))
    };

    let mut distribution = BTreeMap::new();
    for bucket in 1..=BUCKETS {
        let lower = f64::from(bucket);
        // The top bucket's exclusive upper bound collides with the rating
        // ceiling, so an exact 5.0 lands in no bucket. Kept for wire
        // compatibility with the reference API.
        let upper = f64::from(bucket + 1).min(5.0);
        let in_bucket = values.iter().filter(|v| **v >= lower && **v < upper).count();
        distribution.insert(bucket.to_string(), in_bucket as i64);
    }

    RatingSummary {
        average,
        count,
        distribution,
    }
}

/// Count up and down votes for one comment.
pub fn tally_votes(votes: &[VoteType]) -> VoteTally {
    let upvotes = votes.iter().filter(|v| **v == VoteType::Up).count() as i64;
    let downvotes = votes.iter().filter(|v| **v == VoteType::Down).count() as i64;

    VoteTally { upvotes, downvotes }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket(summary: &RatingSummary, key: &str) -> i64 {
        *summary.distribution.get(key).unwrap()
    }

    #[test]
    fn no_ratings_yields_null_average_and_empty_buckets() {
        let summary = summarize_ratings(&[]);
        assert_eq!(summary.average, None);
        assert_eq!(summary.count, 0);
        for key in ["1", "2", "3", "4", "5"] {
            assert_eq!(bucket(&summary, key), 0);
        }
    }

    #[test]
    fn average_is_rounded_to_two_decimals() {
        // 15.5 / 4 = 3.875 -> 3.88
        let summary = summarize_ratings(&[3.0, 3.0, 4.5, 5.0]);
        assert_eq!(summary.average, Some(3.88));
        assert_eq!(summary.count, 4);
    }

    #[test]
    fn buckets_are_half_open_ranges() {
        let summary = summarize_ratings(&[3.0, 3.0, 4.5, 5.0]);
        assert_eq!(bucket(&summary, "1"), 0);
        assert_eq!(bucket(&summary, "2"), 0);
        assert_eq!(bucket(&summary, "3"), 2);
        assert_eq!(bucket(&summary, "4"), 1);
        // The exact 5.0 is counted in the average but lands in no bucket.
        assert_eq!(bucket(&summary, "5"), 0);
    }

    #[test]
    fn perfect_score_falls_outside_buckets() {
        let summary = summarize_ratings(&[5.0, 5.0]);
        assert_eq!(summary.average, Some(5.0));
        assert_eq!(summary.count, 2);
        let total: i64 = summary.distribution.values().sum();
        assert_eq!(total, 0);
    }

    #[test]
    fn lower_bound_is_inclusive() {
        let summary = summarize_ratings(&[1.0, 1.99, 2.0]);
        assert_eq!(bucket(&summary, "1"), 2);
        assert_eq!(bucket(&summary, "2"), 1);
    }

    #[test]
    fn single_rating_average_is_exact() {
        let summary = summarize_ratings(&[4.5]);
        assert_eq!(summary.average, Some(4.5));
        assert_eq!(summary.count, 1);
        assert_eq!(bucket(&summary, "4"), 1);
    }

    #[test]
    fn tally_counts_each_direction() {
        let votes = [
            VoteType::Up,
            VoteType::Down,
            VoteType::Up,
            VoteType::Up,
        ];
        let tally = tally_votes(&votes);
        assert_eq!(tally.upvotes, 3);
        assert_eq!(tally.downvotes, 1);
    }

    #[test]
    fn tally_of_no_votes_is_zero() {
        let tally = tally_votes(&[]);
        assert_eq!(tally.upvotes, 0);
        assert_eq!(tally.downvotes, 0);
    }

    #[test]
    fn round2_half_rounds_away_from_zero() {
        assert_eq!(round2(3.875), 3.88);
        assert_eq!(round2(2.004), 2.0);
        assert_eq!(round2(4.666_666), 4.67);
    }
}
