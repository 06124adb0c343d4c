//! # Scoring Module
//!
//! The pure arithmetic of the engine: per-metric normalization, missing-data
//! renormalization at category and profile level, and viability gating. Nothing here
//! owns state; every function is a deterministic map over immutable inputs.

pub mod aggregate;
pub mod normalize;
pub mod viability;

pub use aggregate::{CategoryAggregator, CategoryScores, FinalScorer, MetricScores};
pub use normalize::{NormalizedRecord, Normalizer};
pub use viability::evaluate_gates;

/// Decimal places of reported per-metric scores.
pub const METRIC_DECIMALS: i32 = 2;

/// Decimal places of reported category scores.
pub const CATEGORY_DECIMALS: i32 = 2;

/// Decimal places of the reported final score.
pub const FINAL_DECIMALS: i32 = 1;

/// Rounds half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Weighted mean over the present scores only, so absent entries hand their weight to the
/// rest in proportion to nominal weights. `None` when nothing is present.
pub(crate) fn renormalized_mean(
    entries: impl IntoIterator<Item = (f64, Option<f64>)>,
) -> Option<f64> {
    let (weighted, total) = entries
        .into_iter()
        .filter_map(|(weight, score)| score.map(|s| (weight, s)))
        .fold((0.0, 0.0), |(acc, w_acc), (weight, score)| {
            (acc + weight * score, w_acc + weight)
        });
    (total > 0.0).then(|| weighted / total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_to_reporting_precision() {
        assert_eq!(round_to(84.285714, 2), 84.29);
        assert_eq!(round_to(71.142857, 1), 71.1);
        assert_eq!(round_to(69.0, 1), 69.0);
        assert_eq!(round_to(0.125, 2), 0.13);
    }

    #[test]
    fn renormalized_mean_skips_absent_entries() {
        let mean = renormalized_mean([(40.0, Some(80.0)), (30.0, Some(90.0)), (30.0, None)]);
        assert!((mean.unwrap() - 5900.0 / 70.0).abs() < 1e-12);
    }

    #[test]
    fn renormalized_mean_of_nothing_is_absent() {
        assert_eq!(renormalized_mean([(50.0, None), (50.0, None)]), None);
        assert_eq!(renormalized_mean(std::iter::empty()), None);
    }

    #[test]
    fn zero_scores_are_present_not_absent() {
        assert_eq!(renormalized_mean([(50.0, Some(0.0)), (50.0, None)]), Some(0.0));
    }
}
