use crate::core::models::ids::CategoryId;
use crate::core::models::record::{CategoryScore, MetricRecord, ScoredRecord};
use crate::core::profile::{ProfileRegistry, WeightProfile};
use crate::core::scoring::{
    CategoryAggregator, CategoryScores, FinalScorer, MetricScores, Normalizer, evaluate_gates,
};
use crate::engine::error::{DuplicateDesignError, EngineError};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::table::{BatchAggregator, ScoreTable};
use tracing::{debug, info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Result of scoring a batch: the table plus every append that was rejected.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub table: ScoreTable,
    pub rejected: Vec<DuplicateDesignError>,
}

/// Scores one design under `profile`.
///
/// Absent metrics are renormalized away at category level, absent categories at profile
/// level. The record is always scored; when nothing is present the final score is absent
/// and a warning says so.
#[instrument(skip_all, name = "score_record", fields(design = %record.key()))]
pub fn score_record(record: &MetricRecord, profile: &WeightProfile) -> ScoredRecord {
    let normalized = Normalizer::new(profile).normalize_record(record);

    let metric_scores: MetricScores = normalized
        .metrics
        .iter()
        .map(|m| (m.id.clone(), m.score))
        .collect();

    let mut exact = CategoryScores::new();
    let mut categories = Vec::with_capacity(profile.categories().len());
    for category in profile.categories() {
        exact.insert(
            category.id().clone(),
            CategoryAggregator::aggregate_exact(category, &metric_scores),
        );
        categories.push(CategoryScore {
            id: category.id().clone(),
            score: CategoryAggregator::aggregate(category, &metric_scores),
        });
    }
    let final_score = FinalScorer::score(&exact, profile);

    let mut warnings = record.warnings().to_vec();
    warnings.extend(normalized.warnings);
    for category in absent_categories(&categories) {
        let text = format!("{}: every metric is absent, category excluded", category);
        warn!(design = %record.key(), "{}", text);
        warnings.push(text);
    }
    if final_score.is_none() {
        let text = "no metric is present, final score is absent".to_string();
        warn!(design = %record.key(), "{}", text);
        warnings.push(text);
    }

    let viability = evaluate_gates(profile, |id| {
        normalized.accepted.get(id).copied().unwrap_or_default()
    });

    debug!(
        final_score = ?final_score,
        viable = viability.is_viable(),
        "Scored design."
    );
    ScoredRecord::new(
        record.key().clone(),
        normalized.metrics,
        categories,
        final_score,
        viability,
        warnings,
    )
}

/// Scores a batch of records and assembles the score table.
///
/// Every record's challenge is resolved before anything is scored, so an unknown
/// challenge aborts the run without partial output. Records are appended in input order;
/// duplicates are rejected individually and returned in [`BatchOutcome::rejected`].
#[instrument(skip_all, name = "scoring_workflow")]
pub fn run(
    records: &[MetricRecord],
    registry: &ProfileRegistry,
    reporter: &ProgressReporter,
) -> Result<BatchOutcome, EngineError> {
    // === Phase 1: Resolve profiles ===
    reporter.report(Progress::PhaseStart {
        name: "Resolving Profiles",
    });
    let jobs = records
        .iter()
        .map(|record| {
            registry
                .get(&record.key().challenge)
                .map(|profile| (record, profile))
                .ok_or_else(|| EngineError::UnknownChallenge {
                    key: record.key().clone(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    reporter.report(Progress::StatusUpdate {
        text: format!("{} designs", jobs.len()),
    });
    reporter.report(Progress::PhaseFinish);
    info!(designs = jobs.len(), "Resolved weight profiles for all designs.");

    // === Phase 2: Score designs ===
    reporter.report(Progress::PhaseStart {
        name: "Scoring Designs",
    });
    reporter.report(Progress::TaskStart {
        total: jobs.len() as u64,
    });

    #[cfg(not(feature = "parallel"))]
    let iterator = jobs.iter();

    #[cfg(feature = "parallel")]
    let iterator = jobs.par_iter();

    let scored: Vec<ScoredRecord> = iterator
        .map(|(record, profile)| {
            let scored = score_record(record, profile);
            reporter.report(Progress::TaskIncrement);
            scored
        })
        .collect();

    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);

    // === Phase 3: Assemble table ===
    reporter.report(Progress::PhaseStart {
        name: "Assembling Table",
    });
    let mut aggregator = BatchAggregator::with_capacity(scored.len());
    let mut rejected = Vec::new();
    for record in scored {
        if let Err(err) = aggregator.append(record) {
            warn!(design = %err.key, "Rejected duplicate design.");
            reporter.report(Progress::Message(err.to_string()));
            rejected.push(err);
        }
    }
    let table = aggregator.finalize();
    reporter.report(Progress::PhaseFinish);

    info!(
        designs = table.len(),
        rejected = rejected.len(),
        "Scoring workflow complete."
    );
    Ok(BatchOutcome { table, rejected })
}

fn absent_categories(categories: &[CategoryScore]) -> impl Iterator<Item = &CategoryId> {
    categories
        .iter()
        .filter(|c| c.score.is_none())
        .map(|c| &c.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::ids::{DesignKey, MetricId};
    use crate::core::models::metric::MetricValue;
    use std::sync::Mutex;

    const FULL: [(&str, f64); 6] = [
        ("prodigy_dg", -13.0),
        ("ipsae", 0.94),
        ("dockq", 0.7),
        ("netsolp", 0.6),
        ("cdr_sasa", 887.5),
        ("cdrh3_identity", 60.0),
    ];

    fn registry() -> ProfileRegistry {
        ProfileRegistry::builtin().unwrap()
    }

    fn record(challenge: &str, design: &str, values: &[(&str, f64)]) -> MetricRecord {
        let mut record = MetricRecord::new(DesignKey::new("team", challenge, design));
        for (id, value) in values {
            record.record_value(*id, *value);
        }
        record
    }

    fn without(id: &str) -> Vec<(&'static str, f64)> {
        FULL.iter().copied().filter(|(m, _)| *m != id).collect()
    }

    fn category(scored: &ScoredRecord, id: &str) -> Option<f64> {
        scored.category_score(&CategoryId::new(id))
    }

    fn close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "{actual} != {expected}");
    }

    #[test]
    fn scenario_a_all_metrics_present_is_the_plain_weighted_sum() {
        let registry = registry();
        let profile = registry.weights_for(&"challenge1".into()).unwrap();
        let scored = score_record(&record("challenge1", "a", &FULL), profile);

        let expected_scores = [80.0, 90.0, 70.0, 60.0, 85.0, 40.0];
        for (metric, expected) in scored.metrics().iter().zip(expected_scores) {
            close(metric.score.unwrap(), expected);
        }
        assert_eq!(category(&scored, "binding"), Some(80.0));
        assert_eq!(category(&scored, "developability"), Some(70.0));
        assert_eq!(category(&scored, "novelty"), Some(40.0));
        assert_eq!(scored.final_score(), Some(69.0));
        assert!(scored.viability().is_viable());
        assert!(scored.warnings().is_empty());
    }

    #[test]
    fn scenario_b_dockq_failure_renormalizes_binding_only() {
        let registry = registry();
        let profile = registry.weights_for(&"challenge1".into()).unwrap();
        let mut rec = record("challenge1", "b", &without("dockq"));
        rec.record_failure("dockq", "dockq: DockQ crashed");
        let scored = score_record(&rec, profile);

        assert_eq!(scored.metric_score(&MetricId::new("dockq")), None);
        assert_eq!(category(&scored, "binding"), Some(84.29));
        assert_eq!(category(&scored, "developability"), Some(70.0));
        assert_eq!(category(&scored, "novelty"), Some(40.0));
        assert_eq!(scored.final_score(), Some(71.1));
        assert_eq!(scored.warnings(), ["dockq: DockQ crashed"]);
    }

    #[test]
    fn scenario_c_structural_absence_matches_failure_path() {
        let registry = registry();
        let c1 = registry.weights_for(&"challenge1".into()).unwrap();
        let c2 = registry.weights_for(&"challenge2".into()).unwrap();

        let mut failed = record("challenge1", "b", &without("dockq"));
        failed.record_failure("dockq", "dockq: DockQ crashed");
        let structural = record("challenge2", "c", &without("dockq"));

        let normalized_b = Normalizer::new(c1).normalize_record(&failed);
        let normalized_c = Normalizer::new(c2).normalize_record(&structural);
        let scores = |n: &crate::core::scoring::NormalizedRecord| -> MetricScores {
            n.metrics.iter().map(|m| (m.id.clone(), m.score)).collect()
        };
        let binding = CategoryId::new("binding");
        let exact_b = CategoryAggregator::aggregate_exact(
            c1.category(&binding).unwrap(),
            &scores(&normalized_b),
        )
        .unwrap();
        let exact_c = CategoryAggregator::aggregate_exact(
            c2.category(&binding).unwrap(),
            &scores(&normalized_c),
        )
        .unwrap();
        close(exact_b, exact_c);
        close(exact_c, 5900.0 / 70.0);

        let scored = score_record(&structural, c2);
        assert_eq!(category(&scored, "binding"), Some(84.29));
        assert_eq!(scored.final_score(), Some(71.1));
        assert!(scored.metric(&MetricId::new("dockq")).is_none());
        assert!(scored.warnings().is_empty());
    }

    #[test]
    fn scenario_d_all_absent_design_is_kept_with_warnings() {
        let records = vec![record("challenge1", "empty", &[])];
        let outcome = run(&records, &registry(), &ProgressReporter::new()).unwrap();

        assert_eq!(outcome.table.len(), 1);
        let scored = &outcome.table.records()[0];
        assert_eq!(scored.final_score(), None);
        assert!(scored.categories().iter().all(|c| c.score.is_none()));
        assert!(scored.metrics().iter().all(|m| m.raw == MetricValue::Absent));
        assert!(
            scored
                .warnings()
                .iter()
                .any(|w| w == "no metric is present, final score is absent")
        );
    }

    #[test]
    fn scenario_e_duplicate_is_rejected_and_first_kept() {
        let first = record("challenge1", "dup", &FULL);
        let second = record("challenge1", "dup", &without("dockq"));
        let outcome = run(&[first, second], &registry(), &ProgressReporter::new()).unwrap();

        assert_eq!(outcome.table.len(), 1);
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(
            outcome.rejected[0].key,
            DesignKey::new("team", "challenge1", "dup")
        );
        let kept = outcome
            .table
            .get(&DesignKey::new("team", "challenge1", "dup"))
            .unwrap();
        assert_eq!(kept.final_score(), Some(69.0));
    }

    #[test]
    fn unknown_challenge_aborts_before_scoring() {
        let records = vec![
            record("challenge1", "ok", &FULL),
            record("challenge7", "bad", &FULL),
        ];
        let events = Mutex::new(Vec::new());
        let reporter =
            ProgressReporter::with_callback(Box::new(|e| events.lock().unwrap().push(e)));
        let err = run(&records, &registry(), &reporter).unwrap_err();
        drop(reporter);

        assert!(matches!(err, EngineError::UnknownChallenge { .. }));
        assert!(
            !events
                .into_inner()
                .unwrap()
                .contains(&Progress::TaskIncrement)
        );
    }

    #[test]
    fn run_preserves_input_order_and_reports_progress() {
        let records: Vec<MetricRecord> = (0..20)
            .map(|i| record("challenge1", &format!("d{i:02}"), &FULL))
            .collect();
        let increments = Mutex::new(0u64);
        let reporter = ProgressReporter::with_callback(Box::new(|e| {
            if e == Progress::TaskIncrement {
                *increments.lock().unwrap() += 1;
            }
        }));
        let outcome = run(&records, &registry(), &reporter).unwrap();
        drop(reporter);

        let designs: Vec<&str> = outcome
            .table
            .iter()
            .map(|r| r.key().design.as_str())
            .collect();
        let expected: Vec<String> = (0..20).map(|i| format!("d{i:02}")).collect();
        assert_eq!(designs, expected);
        assert_eq!(increments.into_inner().unwrap(), 20);
    }

    #[test]
    fn failing_gate_marks_design_without_changing_scores() {
        let registry = registry();
        let profile = registry.weights_for(&"challenge1".into()).unwrap();
        let mut values = without("netsolp");
        values.push(("netsolp", 0.4));
        let scored = score_record(&record("challenge1", "g", &values), profile);

        assert_eq!(
            scored.viability().fail_reason.as_deref(),
            Some("NetSolP < 0.50")
        );
        close(scored.metric_score(&"netsolp".into()).unwrap(), 40.0);
        assert_eq!(category(&scored, "developability"), Some(58.0));
    }

    #[test]
    fn out_of_range_value_does_not_fail_its_gate() {
        let registry = registry();
        let profile = registry.weights_for(&"challenge1".into()).unwrap();
        let mut values = without("ipsae");
        values.push(("ipsae", -3.0));
        let scored = score_record(&record("challenge1", "r", &values), profile);

        assert!(scored.viability().is_viable());
        assert_eq!(scored.metric_score(&"ipsae".into()), None);
        assert_eq!(category(&scored, "binding"), Some(75.71));
    }

    #[test]
    fn scoring_is_deterministic() {
        let registry = registry();
        let profile = registry.weights_for(&"challenge1".into()).unwrap();
        let rec = record("challenge1", "same", &without("cdr_sasa"));
        let first = score_record(&rec, profile);
        for _ in 0..10 {
            assert_eq!(score_record(&rec, profile), first);
        }
    }

    #[test]
    fn absent_category_is_excluded_from_final_score() {
        let registry = registry();
        let profile = registry.weights_for(&"challenge1".into()).unwrap();
        let scored = score_record(&record("challenge1", "n", &without("cdrh3_identity")), profile);

        assert_eq!(category(&scored, "novelty"), None);
        let expected = (80.0 * 50.0 + 70.0 * 30.0) / 80.0;
        assert!((scored.final_score().unwrap() - expected).abs() <= 0.05 + 1e-9);
        assert!(
            scored
                .warnings()
                .iter()
                .any(|w| w == "novelty: every metric is absent, category excluded")
        );
    }
}
