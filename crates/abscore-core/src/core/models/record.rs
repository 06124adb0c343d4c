use super::ids::{CategoryId, DesignKey, MetricId};
use super::metric::MetricValue;
use std::collections::BTreeMap;
use tracing::warn;

/// Raw scoring state of one design while its metrics are being collected.
///
/// A record is owned by the producer that creates it. External tool results (or
/// failures) are recorded incrementally; scoring freezes it into a [`ScoredRecord`].
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRecord {
    key: DesignKey,
    raw: BTreeMap<MetricId, MetricValue>,
    warnings: Vec<String>,
}

impl MetricRecord {
    pub fn new(key: DesignKey) -> Self {
        Self {
            key,
            raw: BTreeMap::new(),
            warnings: Vec::new(),
        }
    }

    pub fn key(&self) -> &DesignKey {
        &self.key
    }

    /// Records a numeric tool result. Non-finite numbers are stored as absent.
    pub fn record_value(&mut self, metric: impl Into<MetricId>, value: f64) {
        let metric = metric.into();
        if value.is_finite() {
            self.record(metric, MetricValue::Present(value), None);
        } else {
            let warning = format!("{}: non-finite value {} treated as absent", metric, value);
            self.record(metric, MetricValue::Absent, Some(warning));
        }
    }

    /// Records a failed tool call: the metric becomes absent and the warning is kept for audit.
    pub fn record_failure(&mut self, metric: impl Into<MetricId>, warning: impl Into<String>) {
        let metric = metric.into();
        let warning = warning.into();
        self.record(metric, MetricValue::Absent, Some(warning));
    }

    pub fn record(
        &mut self,
        metric: impl Into<MetricId>,
        value: MetricValue,
        warning: Option<String>,
    ) {
        let metric = metric.into();
        if let Some(text) = warning {
            self.add_warning(text);
        }
        if self.raw.insert(metric.clone(), value).is_some() {
            self.add_warning(format!(
                "{}: reported more than once, keeping the latest value",
                metric
            ));
        }
    }

    pub fn add_warning(&mut self, text: impl Into<String>) {
        let text = text.into();
        warn!(design = %self.key, "{}", text);
        self.warnings.push(text);
    }

    /// Raw value of a metric; metrics never attempted are absent.
    pub fn raw(&self, metric: &MetricId) -> MetricValue {
        self.raw.get(metric).copied().unwrap_or_default()
    }

    pub fn has_metric(&self, metric: &MetricId) -> bool {
        self.raw.contains_key(metric)
    }

    pub fn metrics(&self) -> impl Iterator<Item = (&MetricId, &MetricValue)> {
        self.raw.iter()
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

/// Raw value and derived score of one metric inside a [`ScoredRecord`].
#[derive(Debug, Clone, PartialEq)]
pub struct MetricScore {
    pub id: MetricId,
    pub category: CategoryId,
    pub raw: MetricValue,
    pub score: Option<f64>,
}

/// Category score at reporting precision; `None` when every member metric is absent.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryScore {
    pub id: CategoryId,
    pub score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Viability {
    pub fail_reason: Option<String>,
}

impl Viability {
    pub fn viable() -> Self {
        Self::default()
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            fail_reason: Some(reason.into()),
        }
    }

    pub fn is_viable(&self) -> bool {
        self.fail_reason.is_none()
    }
}

/// Fully resolved scoring state of one design. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecord {
    key: DesignKey,
    metrics: Vec<MetricScore>,
    categories: Vec<CategoryScore>,
    final_score: Option<f64>,
    viability: Viability,
    warnings: Vec<String>,
}

impl ScoredRecord {
    pub(crate) fn new(
        key: DesignKey,
        metrics: Vec<MetricScore>,
        categories: Vec<CategoryScore>,
        final_score: Option<f64>,
        viability: Viability,
        warnings: Vec<String>,
    ) -> Self {
        Self {
            key,
            metrics,
            categories,
            final_score,
            viability,
            warnings,
        }
    }

    pub fn key(&self) -> &DesignKey {
        &self.key
    }

    pub fn metrics(&self) -> &[MetricScore] {
        &self.metrics
    }

    pub fn categories(&self) -> &[CategoryScore] {
        &self.categories
    }

    pub fn metric(&self, id: &MetricId) -> Option<&MetricScore> {
        self.metrics.iter().find(|m| &m.id == id)
    }

    pub fn metric_score(&self, id: &MetricId) -> Option<f64> {
        self.metric(id).and_then(|m| m.score)
    }

    pub fn category_score(&self, id: &CategoryId) -> Option<f64> {
        self.categories
            .iter()
            .find(|c| &c.id == id)
            .and_then(|c| c.score)
    }

    pub fn final_score(&self) -> Option<f64> {
        self.final_score
    }

    pub fn viability(&self) -> &Viability {
        &self.viability
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}
