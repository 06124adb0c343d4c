use super::WEIGHT_TOTAL;
use super::definition::{CategoryDefinition, MetricDefinition, ViabilityGate, check_sum};
use super::error::ConfigError;
use crate::core::models::ids::{CategoryId, ChallengeId, MetricId};
use std::collections::HashSet;
use tracing::debug;

/// The categories, metrics, nominal weights, and viability gates of one challenge variant.
///
/// Built only through validating constructors, so a profile in hand always satisfies
/// weight conservation at both levels.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightProfile {
    challenge: ChallengeId,
    categories: Vec<CategoryDefinition>,
    gates: Vec<ViabilityGate>,
}

impl WeightProfile {
    pub fn new(
        challenge: impl Into<ChallengeId>,
        categories: Vec<CategoryDefinition>,
        gates: Vec<ViabilityGate>,
    ) -> Result<Self, ConfigError> {
        let challenge = challenge.into();
        if categories.is_empty() {
            return Err(ConfigError::EmptyProfile { challenge });
        }

        let mut category_ids = HashSet::new();
        let mut metric_ids = HashSet::new();
        for category in &categories {
            if !category_ids.insert(category.id()) {
                return Err(ConfigError::DuplicateCategory {
                    challenge,
                    category: category.id().clone(),
                });
            }
            for metric in category.metrics() {
                if !metric_ids.insert(metric.id()) {
                    return Err(ConfigError::DuplicateMetric {
                        challenge,
                        metric: metric.id().clone(),
                    });
                }
            }
        }

        check_sum(
            format!("Categories of profile '{}'", challenge),
            categories.iter().map(CategoryDefinition::weight),
        )?;

        if let Some(gate) = gates.iter().find(|g| !metric_ids.contains(g.metric())) {
            return Err(ConfigError::UnknownMetric {
                challenge,
                metric: gate.metric().clone(),
            });
        }

        Ok(Self {
            challenge,
            categories,
            gates,
        })
    }

    pub fn challenge(&self) -> &ChallengeId {
        &self.challenge
    }

    pub fn categories(&self) -> &[CategoryDefinition] {
        &self.categories
    }

    pub fn gates(&self) -> &[ViabilityGate] {
        &self.gates
    }

    pub fn category(&self, id: &CategoryId) -> Option<&CategoryDefinition> {
        self.categories.iter().find(|c| c.id() == id)
    }

    /// Looks up a metric together with the category that owns it.
    pub fn metric(&self, id: &MetricId) -> Option<(&CategoryDefinition, &MetricDefinition)> {
        self.categories
            .iter()
            .find_map(|c| c.metric(id).map(|m| (c, m)))
    }

    pub fn contains_metric(&self, id: &MetricId) -> bool {
        self.metric(id).is_some()
    }

    /// All metrics in profile order.
    pub fn metrics(&self) -> impl Iterator<Item = (&CategoryDefinition, &MetricDefinition)> {
        self.categories
            .iter()
            .flat_map(|c| c.metrics().iter().map(move |m| (c, m)))
    }

    /// Derives a profile for a challenge variant where `excluded` metrics do not exist.
    ///
    /// Each excluded metric's nominal weight is handed to the remaining metrics of its
    /// category in proportion to their own nominal weights, so every category keeps its
    /// full weight total. Gates on excluded metrics are dropped.
    pub fn without_metrics(
        &self,
        challenge: impl Into<ChallengeId>,
        excluded: &[MetricId],
    ) -> Result<Self, ConfigError> {
        let challenge = challenge.into();
        if let Some(unknown) = excluded.iter().find(|id| !self.contains_metric(id)) {
            return Err(ConfigError::UnknownMetric {
                challenge: self.challenge.clone(),
                metric: unknown.clone(),
            });
        }

        let mut categories = Vec::with_capacity(self.categories.len());
        for category in &self.categories {
            let remaining: Vec<&MetricDefinition> = category
                .metrics()
                .iter()
                .filter(|m| !excluded.contains(m.id()))
                .collect();

            if remaining.len() == category.metrics().len() {
                categories.push(category.clone());
                continue;
            }
            if remaining.is_empty() {
                return Err(ConfigError::EmptiedCategory {
                    challenge,
                    category: category.id().clone(),
                });
            }

            let remaining_total: f64 = remaining.iter().map(|m| m.weight()).sum();
            let scale = WEIGHT_TOTAL / remaining_total;
            let metrics = remaining
                .iter()
                .map(|m| m.with_weight(m.weight() * scale))
                .collect();
            debug!(
                category = %category.id(),
                scale,
                "Redistributed excluded metric weight within category."
            );
            categories.push(CategoryDefinition::new(
                category.id().clone(),
                category.weight(),
                metrics,
            )?);
        }

        let gates = self
            .gates
            .iter()
            .filter(|g| !excluded.contains(g.metric()))
            .cloned()
            .collect();

        Self::new(challenge, categories, gates)
    }
}
