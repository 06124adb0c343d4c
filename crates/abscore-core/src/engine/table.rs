use super::error::DuplicateDesignError;
use crate::core::models::ids::{CategoryId, DesignKey, MetricId};
use crate::core::models::record::ScoredRecord;
use crate::core::profile::{ProfileRegistry, WeightProfile};
use crate::core::scoring::{METRIC_DECIMALS, round_to};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Single-writer accumulator for scored designs.
///
/// Appends are checked against every key already accepted; a duplicate is rejected and
/// leaves the existing entry untouched.
#[derive(Debug, Default)]
pub struct BatchAggregator {
    records: Vec<ScoredRecord>,
    keys: HashSet<DesignKey>,
}

impl BatchAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
            keys: HashSet::with_capacity(capacity),
        }
    }

    pub fn append(&mut self, record: ScoredRecord) -> Result<(), DuplicateDesignError> {
        if !self.keys.insert(record.key().clone()) {
            return Err(DuplicateDesignError {
                key: record.key().clone(),
            });
        }
        self.records.push(record);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn finalize(self) -> ScoreTable {
        debug!(designs = self.records.len(), "Finalizing score table");
        let index = self
            .records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.key().clone(), i))
            .collect();
        ScoreTable {
            records: self.records,
            index,
        }
    }
}

/// Immutable scored batch in insertion order.
#[derive(Debug, Clone, Default)]
pub struct ScoreTable {
    records: Vec<ScoredRecord>,
    index: HashMap<DesignKey, usize>,
}

impl ScoreTable {
    pub fn records(&self) -> &[ScoredRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScoredRecord> {
        self.records.iter()
    }

    pub fn get(&self, key: &DesignKey) -> Option<&ScoredRecord> {
        self.index.get(key).map(|&i| &self.records[i])
    }

    /// Stable view by final score, best first; designs without a final score go last.
    pub fn ranked(&self) -> Vec<&ScoredRecord> {
        let mut view: Vec<&ScoredRecord> = self.records.iter().collect();
        view.sort_by(|a, b| match (a.final_score(), b.final_score()) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        view
    }

    pub fn rows(&self, layout: &ReportLayout) -> Vec<ReportRow> {
        self.records
            .iter()
            .map(|r| ReportRow::from_record(r, layout))
            .collect()
    }
}

impl<'a> IntoIterator for &'a ScoreTable {
    type Item = &'a ScoredRecord;
    type IntoIter = std::slice::Iter<'a, ScoredRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Report columns: the union of metrics and categories over a set of profiles, in
/// profile order. A challenge-specific metric is a column even for rows that never have it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportLayout {
    metrics: Vec<MetricId>,
    categories: Vec<CategoryId>,
}

impl ReportLayout {
    pub fn from_profiles<'p>(profiles: impl IntoIterator<Item = &'p WeightProfile>) -> Self {
        let mut layout = Self::default();
        for profile in profiles {
            for category in profile.categories() {
                if !layout.categories.contains(category.id()) {
                    layout.categories.push(category.id().clone());
                }
                for metric in category.metrics() {
                    if !layout.metrics.contains(metric.id()) {
                        layout.metrics.push(metric.id().clone());
                    }
                }
            }
        }
        layout
    }

    /// Columns for the challenges that actually occur in `table`; every profile when the
    /// table is empty.
    pub fn for_table(table: &ScoreTable, registry: &ProfileRegistry) -> Self {
        let present: HashSet<_> = table.iter().map(|r| &r.key().challenge).collect();
        if present.is_empty() {
            return Self::from_profiles(registry.profiles());
        }
        Self::from_profiles(
            registry
                .profiles()
                .iter()
                .filter(|p| present.contains(p.challenge())),
        )
    }

    pub fn metrics(&self) -> &[MetricId] {
        &self.metrics
    }

    pub fn categories(&self) -> &[CategoryId] {
        &self.categories
    }
}

/// One flat output row. Every `None` renders as an empty cell, never as zero.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub key: DesignKey,
    pub raw: Vec<Option<f64>>,
    pub metric_scores: Vec<Option<f64>>,
    pub category_scores: Vec<Option<f64>>,
    pub final_score: Option<f64>,
    pub viable: bool,
    pub fail_reason: Option<String>,
    pub warnings: Vec<String>,
}

impl ReportRow {
    pub fn from_record(record: &ScoredRecord, layout: &ReportLayout) -> Self {
        Self {
            key: record.key().clone(),
            raw: layout
                .metrics
                .iter()
                .map(|m| record.metric(m).and_then(|s| s.raw.value()))
                .collect(),
            metric_scores: layout
                .metrics
                .iter()
                .map(|m| record.metric_score(m).map(|s| round_to(s, METRIC_DECIMALS)))
                .collect(),
            category_scores: layout
                .categories
                .iter()
                .map(|c| record.category_score(c))
                .collect(),
            final_score: record.final_score(),
            viable: record.viability().is_viable(),
            fail_reason: record.viability().fail_reason.clone(),
            warnings: record.warnings().to_vec(),
        }
    }
}
