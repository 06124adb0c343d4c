use super::{CATEGORY_DECIMALS, FINAL_DECIMALS, renormalized_mean, round_to};
use crate::core::models::ids::{CategoryId, MetricId};
use crate::core::profile::{CategoryDefinition, WeightProfile};
use std::collections::BTreeMap;

/// Per-metric scores of one record; a missing key is treated as absent.
pub type MetricScores = BTreeMap<MetricId, Option<f64>>;

/// Exact (unrounded) category scores of one record; a missing key is treated as absent.
pub type CategoryScores = BTreeMap<CategoryId, Option<f64>>;

/// Combines the metric scores of one category with missing-data renormalization.
pub struct CategoryAggregator;

impl CategoryAggregator {
    /// Category score at reporting precision.
    pub fn aggregate(category: &CategoryDefinition, scores: &MetricScores) -> Option<f64> {
        Self::aggregate_exact(category, scores).map(|s| round_to(s, CATEGORY_DECIMALS))
    }

    /// `Σ(wᵢ·sᵢ) / Σwᵢ` over the present metrics of the category.
    pub fn aggregate_exact(category: &CategoryDefinition, scores: &MetricScores) -> Option<f64> {
        renormalized_mean(category.metrics().iter().map(|metric| {
            let score = scores.get(metric.id()).copied().flatten();
            (metric.weight(), score)
        }))
    }
}

/// Combines category scores into the final score, one level above [`CategoryAggregator`].
pub struct FinalScorer;

impl FinalScorer {
    /// Final score rounded to one decimal; absent only when every category is absent.
    pub fn score(category_scores: &CategoryScores, profile: &WeightProfile) -> Option<f64> {
        Self::score_exact(category_scores, profile).map(|s| round_to(s, FINAL_DECIMALS))
    }

    pub fn score_exact(category_scores: &CategoryScores, profile: &WeightProfile) -> Option<f64> {
        renormalized_mean(profile.categories().iter().map(|category| {
            let score = category_scores.get(category.id()).copied().flatten();
            (category.weight(), score)
        }))
    }
}
