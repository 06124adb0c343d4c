use crate::core::models::ids::MetricId;
use crate::core::models::metric::MetricValue;
use crate::core::models::record::{MetricRecord, MetricScore};
use crate::core::profile::{ConfigError, WeightProfile};
use std::collections::BTreeMap;
use tracing::warn;

/// Per-metric outcome of normalizing one record against a profile.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedRecord {
    /// Profile metrics in profile order, with the raw value as reported.
    pub metrics: Vec<MetricScore>,
    /// Raw values that passed screening; out-of-range values are absent here.
    pub accepted: BTreeMap<MetricId, MetricValue>,
    /// Warnings raised during screening, in addition to the record's own.
    pub warnings: Vec<String>,
}

/// Maps raw metric values of one profile onto the 0-100 scale.
pub struct Normalizer<'a> {
    profile: &'a WeightProfile,
}

impl<'a> Normalizer<'a> {
    pub fn new(profile: &'a WeightProfile) -> Self {
        Self { profile }
    }

    /// Score in `[0, 100]`, or `None` for an absent value. Absence is never substituted.
    pub fn normalize(
        &self,
        metric: &MetricId,
        value: MetricValue,
    ) -> Result<Option<f64>, ConfigError> {
        let (_, definition) = self
            .profile
            .metric(metric)
            .ok_or_else(|| ConfigError::UnknownMetric {
                challenge: self.profile.challenge().clone(),
                metric: metric.clone(),
            })?;
        Ok(definition.normalize(value))
    }

    /// Screens and normalizes every profile metric of `record`.
    ///
    /// Values outside a metric's valid range are treated as absent. Metrics the profile
    /// does not define are ignored, with a warning when they carry a value. Out-of-range
    /// values and profile metrics that were never reported are warned about as well.
    pub fn normalize_record(&self, record: &MetricRecord) -> NormalizedRecord {
        let mut warnings = Vec::new();
        let mut warn_about = |text: String| {
            warn!(design = %record.key(), "{}", text);
            warnings.push(text);
        };

        for (id, value) in record.metrics() {
            if value.is_present() && !self.profile.contains_metric(id) {
                warn_about(format!(
                    "{}: not scored by profile '{}', ignored",
                    id,
                    self.profile.challenge()
                ));
            }
        }

        let mut metrics = Vec::new();
        let mut accepted = BTreeMap::new();
        for (category, metric) in self.profile.metrics() {
            let raw = record.raw(metric.id());
            let value = match raw {
                MetricValue::Present(v) if !metric.accepts(v) => {
                    warn_about(format!(
                        "{}: value {} outside valid range {}, treated as absent",
                        metric.id(),
                        v,
                        metric.valid_range()
                    ));
                    MetricValue::Absent
                }
                MetricValue::Absent if !record.has_metric(metric.id()) => {
                    warn_about(format!("{}: not reported", metric.id()));
                    MetricValue::Absent
                }
                other => other,
            };
            accepted.insert(metric.id().clone(), value);
            metrics.push(MetricScore {
                id: metric.id().clone(),
                category: category.id().clone(),
                raw,
                score: metric.normalize(value),
            });
        }

        NormalizedRecord {
            metrics,
            accepted,
            warnings,
        }
    }
}
