use super::error::ConfigError;
use super::{WEIGHT_TOLERANCE, WEIGHT_TOTAL};
use crate::core::models::ids::{CategoryId, MetricId};
use crate::core::models::metric::MetricValue;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
}

/// Maps a raw metric value onto the common 0-100 "higher is better" scale.
#[derive(Debug, Clone, PartialEq)]
pub enum Transform {
    /// Clamp to `[floor, ceiling]`, then rescale linearly; inverted for `LowerIsBetter`.
    Linear {
        floor: f64,
        ceiling: f64,
        direction: Direction,
    },
    /// Clamp to the first/last knot, then interpolate between neighbouring `(raw, score)` knots.
    Piecewise { knots: Vec<(f64, f64)> },
}

impl Transform {
    pub fn linear(floor: f64, ceiling: f64, direction: Direction) -> Self {
        Self::Linear {
            floor,
            ceiling,
            direction,
        }
    }

    pub fn piecewise(knots: Vec<(f64, f64)>) -> Self {
        Self::Piecewise { knots }
    }

    /// Applies the transform to a finite raw value. Assumes the transform was validated.
    pub fn apply(&self, raw: f64) -> f64 {
        match self {
            Self::Linear {
                floor,
                ceiling,
                direction,
            } => {
                let clamped = raw.clamp(*floor, *ceiling);
                let span = ceiling - floor;
                match direction {
                    Direction::HigherIsBetter => (clamped - floor) / span * 100.0,
                    Direction::LowerIsBetter => (ceiling - clamped) / span * 100.0,
                }
            }
            Self::Piecewise { knots } => interpolate(knots, raw),
        }
    }

    /// The raw interval outside of which the score saturates.
    pub fn bounds(&self) -> (f64, f64) {
        match self {
            Self::Linear { floor, ceiling, .. } => (*floor, *ceiling),
            Self::Piecewise { knots } => {
                let first = knots.first().map_or(f64::NAN, |k| k.0);
                let last = knots.last().map_or(f64::NAN, |k| k.0);
                (first, last)
            }
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            Self::Linear { direction, .. } => *direction,
            Self::Piecewise { knots } => match (knots.first(), knots.last()) {
                (Some(first), Some(last)) if last.1 < first.1 => Direction::LowerIsBetter,
                _ => Direction::HigherIsBetter,
            },
        }
    }

    fn validate(&self, metric: &MetricId) -> Result<(), ConfigError> {
        match self {
            Self::Linear { floor, ceiling, .. } => {
                if !floor.is_finite() {
                    return Err(ConfigError::NonFiniteParameter {
                        metric: metric.clone(),
                        field: "floor",
                    });
                }
                if !ceiling.is_finite() {
                    return Err(ConfigError::NonFiniteParameter {
                        metric: metric.clone(),
                        field: "ceiling",
                    });
                }
                if floor == ceiling {
                    return Err(ConfigError::DegenerateRange {
                        metric: metric.clone(),
                        value: *floor,
                    });
                }
                if floor > ceiling {
                    return Err(ConfigError::InvertedRange {
                        metric: metric.clone(),
                        floor: *floor,
                        ceiling: *ceiling,
                    });
                }
                Ok(())
            }
            Self::Piecewise { knots } => {
                let invalid = |reason: String| ConfigError::InvalidKnots {
                    metric: metric.clone(),
                    reason,
                };
                if knots.len() < 2 {
                    return Err(invalid(format!(
                        "at least two knots are required, got {}",
                        knots.len()
                    )));
                }
                for &(raw, score) in knots {
                    if !raw.is_finite() || !score.is_finite() {
                        return Err(invalid("knots must be finite numbers".to_string()));
                    }
                    if !(0.0..=100.0).contains(&score) {
                        return Err(invalid(format!("score {} is outside [0, 100]", score)));
                    }
                }
                if let Some(pair) = knots.windows(2).find(|pair| pair[1].0 <= pair[0].0) {
                    return Err(invalid(format!(
                        "raw values must be strictly increasing ({} then {})",
                        pair[0].0, pair[1].0
                    )));
                }
                Ok(())
            }
        }
    }
}

fn interpolate(knots: &[(f64, f64)], raw: f64) -> f64 {
    let (Some(&(first_x, first_y)), Some(&(last_x, last_y))) = (knots.first(), knots.last()) else {
        return f64::NAN;
    };
    if raw.is_nan() {
        return raw;
    }
    if raw <= first_x {
        return first_y;
    }
    if raw >= last_x {
        return last_y;
    }
    for pair in knots.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        if raw <= x1 {
            let t = (raw - x0) / (x1 - x0);
            return y0 + t * (y1 - y0);
        }
    }
    last_y
}

/// Physically meaningful input range of a metric; values outside it are tool faults.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ValidRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl ValidRange {
    pub const UNBOUNDED: Self = Self {
        min: None,
        max: None,
    };

    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

impl fmt::Display for ValidRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let min = self.min.map_or("-inf".to_string(), |v| v.to_string());
        let max = self.max.map_or("inf".to_string(), |v| v.to_string());
        write!(f, "[{}, {}]", min, max)
    }
}

/// Static description of one scorable metric. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricDefinition {
    id: MetricId,
    weight: f64,
    transform: Transform,
    valid_range: ValidRange,
}

impl MetricDefinition {
    pub fn new(
        id: impl Into<MetricId>,
        weight: f64,
        transform: Transform,
        valid_range: ValidRange,
    ) -> Result<Self, ConfigError> {
        let id = id.into();
        check_weight(format!("Metric '{}'", id), weight)?;
        transform.validate(&id)?;
        for (bound, field) in [(valid_range.min, "valid-min"), (valid_range.max, "valid-max")] {
            if bound.is_some_and(|v| !v.is_finite()) {
                return Err(ConfigError::NonFiniteParameter { metric: id, field });
            }
        }
        if let (Some(min), Some(max)) = (valid_range.min, valid_range.max) {
            if min > max {
                return Err(ConfigError::InvalidValidRange { metric: id, min, max });
            }
        }
        Ok(Self {
            id,
            weight,
            transform,
            valid_range,
        })
    }

    pub fn id(&self) -> &MetricId {
        &self.id
    }

    /// Nominal weight within the owning category.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn valid_range(&self) -> ValidRange {
        self.valid_range
    }

    pub fn accepts(&self, raw: f64) -> bool {
        raw.is_finite() && self.valid_range.contains(raw)
    }

    /// Per-metric score in `[0, 100]`, or `None` when the value is absent or not finite.
    pub fn normalize(&self, value: MetricValue) -> Option<f64> {
        value
            .value()
            .filter(|raw| raw.is_finite())
            .map(|raw| self.transform.apply(raw))
    }

    pub(crate) fn with_weight(&self, weight: f64) -> Self {
        Self {
            weight,
            ..self.clone()
        }
    }
}

/// A named group of metrics combined into one sub-score.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryDefinition {
    id: CategoryId,
    weight: f64,
    metrics: Vec<MetricDefinition>,
}

impl CategoryDefinition {
    pub fn new(
        id: impl Into<CategoryId>,
        weight: f64,
        metrics: Vec<MetricDefinition>,
    ) -> Result<Self, ConfigError> {
        let id = id.into();
        check_weight(format!("Category '{}'", id), weight)?;
        if metrics.is_empty() {
            return Err(ConfigError::EmptyCategory { category: id });
        }
        let mut seen = HashSet::new();
        for metric in &metrics {
            if !seen.insert(metric.id()) {
                return Err(ConfigError::DuplicateCategoryMetric {
                    category: id.clone(),
                    metric: metric.id().clone(),
                });
            }
        }
        check_sum(
            format!("Metrics of category '{}'", id),
            metrics.iter().map(MetricDefinition::weight),
        )?;
        Ok(Self {
            id,
            weight,
            metrics,
        })
    }

    pub fn id(&self) -> &CategoryId {
        &self.id
    }

    /// Nominal weight within the final score.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn metrics(&self) -> &[MetricDefinition] {
        &self.metrics
    }

    pub fn metric(&self, id: &MetricId) -> Option<&MetricDefinition> {
        self.metrics.iter().find(|m| m.id() == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    AtLeast(f64),
    AtMost(f64),
    Above(f64),
    Below(f64),
}

impl Bound {
    pub fn admits(&self, value: f64) -> bool {
        match *self {
            Self::AtLeast(t) => value >= t,
            Self::AtMost(t) => value <= t,
            Self::Above(t) => value > t,
            Self::Below(t) => value < t,
        }
    }

    pub fn threshold(&self) -> f64 {
        match *self {
            Self::AtLeast(t) | Self::AtMost(t) | Self::Above(t) | Self::Below(t) => t,
        }
    }

    fn describe_failure(&self, metric: &MetricId) -> String {
        match *self {
            Self::AtLeast(t) => format!("{} < {}", metric, t),
            Self::AtMost(t) => format!("{} > {}", metric, t),
            Self::Above(t) => format!("{} <= {}", metric, t),
            Self::Below(t) => format!("{} >= {}", metric, t),
        }
    }
}

/// A hard viability threshold on a raw metric value. Never changes numeric scores.
#[derive(Debug, Clone, PartialEq)]
pub struct ViabilityGate {
    metric: MetricId,
    bound: Bound,
    reason: String,
}

impl ViabilityGate {
    pub fn new(
        metric: impl Into<MetricId>,
        bound: Bound,
        reason: Option<String>,
    ) -> Result<Self, ConfigError> {
        let metric = metric.into();
        if !bound.threshold().is_finite() {
            return Err(ConfigError::InvalidGate {
                metric,
                reason: "threshold must be a finite number".to_string(),
            });
        }
        let reason = reason.unwrap_or_else(|| bound.describe_failure(&metric));
        Ok(Self {
            metric,
            bound,
            reason,
        })
    }

    pub fn metric(&self) -> &MetricId {
        &self.metric
    }

    pub fn bound(&self) -> Bound {
        self.bound
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Returns the failure reason when a present value violates the gate.
    pub fn check(&self, value: MetricValue) -> Option<&str> {
        match value {
            MetricValue::Present(v) if !self.bound.admits(v) => Some(&self.reason),
            _ => None,
        }
    }
}

pub(crate) fn check_weight(scope: String, weight: f64) -> Result<(), ConfigError> {
    if weight.is_finite() && weight > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositiveWeight { scope, weight })
    }
}

pub(crate) fn check_sum(
    scope: String,
    weights: impl IntoIterator<Item = f64>,
) -> Result<(), ConfigError> {
    let actual: f64 = weights.into_iter().sum();
    if (actual - WEIGHT_TOTAL).abs() <= WEIGHT_TOLERANCE {
        Ok(())
    } else {
        Err(ConfigError::WeightSum {
            scope,
            expected: WEIGHT_TOTAL,
            actual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear(floor: f64, ceiling: f64, direction: Direction) -> MetricDefinition {
        MetricDefinition::new(
            "m",
            100.0,
            Transform::linear(floor, ceiling, direction),
            ValidRange::UNBOUNDED,
        )
        .unwrap()
    }

    #[test]
    fn linear_higher_is_better_rescales_and_clamps() {
        let m = linear(0.0, 1.0, Direction::HigherIsBetter);
        assert_eq!(m.normalize(MetricValue::Present(0.0)), Some(0.0));
        assert_eq!(m.normalize(MetricValue::Present(0.5)), Some(50.0));
        assert_eq!(m.normalize(MetricValue::Present(1.0)), Some(100.0));
        assert_eq!(m.normalize(MetricValue::Present(-3.0)), Some(0.0));
        assert_eq!(m.normalize(MetricValue::Present(7.0)), Some(100.0));
    }

    #[test]
    fn linear_lower_is_better_is_inverted() {
        let m = linear(-15.0, -5.0, Direction::LowerIsBetter);
        assert_eq!(m.normalize(MetricValue::Present(-15.0)), Some(100.0));
        assert_eq!(m.normalize(MetricValue::Present(-5.0)), Some(0.0));
        assert_eq!(m.normalize(MetricValue::Present(-13.0)), Some(80.0));
        assert_eq!(m.normalize(MetricValue::Present(-40.0)), Some(100.0));
        assert_eq!(m.normalize(MetricValue::Present(2.0)), Some(0.0));
    }

    #[test]
    fn absent_value_normalizes_to_absent() {
        let m = linear(0.0, 1.0, Direction::HigherIsBetter);
        assert_eq!(m.normalize(MetricValue::Absent), None);
    }

    #[test]
    fn zero_width_range_fails_fast() {
        let result = MetricDefinition::new(
            "dockq",
            100.0,
            Transform::linear(0.5, 0.5, Direction::HigherIsBetter),
            ValidRange::UNBOUNDED,
        );
        assert!(matches!(result, Err(ConfigError::DegenerateRange { value, .. }) if value == 0.5));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let result = MetricDefinition::new(
            "m",
            100.0,
            Transform::linear(1.0, 0.0, Direction::HigherIsBetter),
            ValidRange::UNBOUNDED,
        );
        assert!(matches!(result, Err(ConfigError::InvertedRange { .. })));
    }

    #[test]
    fn non_finite_parameters_are_rejected() {
        let result = MetricDefinition::new(
            "m",
            100.0,
            Transform::linear(f64::NAN, 1.0, Direction::HigherIsBetter),
            ValidRange::UNBOUNDED,
        );
        assert!(matches!(
            result,
            Err(ConfigError::NonFiniteParameter { field: "floor", .. })
        ));
    }

    #[test]
    fn non_positive_weight_is_rejected() {
        let result = MetricDefinition::new(
            "m",
            0.0,
            Transform::linear(0.0, 1.0, Direction::HigherIsBetter),
            ValidRange::UNBOUNDED,
        );
        assert!(matches!(result, Err(ConfigError::NonPositiveWeight { .. })));
    }

    #[test]
    fn normalize_is_bounded_for_any_finite_input() {
        let defs = [
            linear(0.0, 1.0, Direction::HigherIsBetter),
            linear(-15.0, -5.0, Direction::LowerIsBetter),
            linear(250.0, 1000.0, Direction::HigherIsBetter),
        ];
        let inputs = [-1e9, -100.0, -12.3, -0.1, 0.0, 0.3, 1.0, 42.0, 999.9, 1e12];
        for def in &defs {
            for &x in &inputs {
                let score = def.normalize(MetricValue::Present(x)).unwrap();
                assert!((0.0..=100.0).contains(&score), "{} -> {}", x, score);
            }
        }
    }

    #[test]
    fn normalize_is_monotonic_in_the_better_direction() {
        let up = linear(0.0, 10.0, Direction::HigherIsBetter);
        let down = linear(0.0, 10.0, Direction::LowerIsBetter);
        let xs: Vec<f64> = (0..=40).map(|i| i as f64 * 0.25).collect();
        for pair in xs.windows(2) {
            let (b, a) = (pair[0], pair[1]);
            assert!(up.normalize(MetricValue::Present(a)) >= up.normalize(MetricValue::Present(b)));
            assert!(
                down.normalize(MetricValue::Present(a)) <= down.normalize(MetricValue::Present(b))
            );
        }
    }

    #[test]
    fn normalize_is_deterministic() {
        let m = linear(0.4, 1.0, Direction::HigherIsBetter);
        let first = m.normalize(MetricValue::Present(0.8123));
        for _ in 0..10 {
            assert_eq!(m.normalize(MetricValue::Present(0.8123)), first);
        }
    }

    #[test]
    fn piecewise_interpolates_between_knots_and_clamps() {
        let t = Transform::piecewise(vec![(0.0, 0.0), (0.23, 30.0), (0.49, 55.0), (1.0, 100.0)]);
        assert!(t.validate(&"dockq".into()).is_ok());
        assert_eq!(t.apply(-1.0), 0.0);
        assert_eq!(t.apply(0.23), 30.0);
        assert!((t.apply(0.36) - 42.5).abs() < 1e-9);
        assert_eq!(t.apply(2.0), 100.0);
        assert_eq!(t.bounds(), (0.0, 1.0));
        assert_eq!(t.direction(), Direction::HigherIsBetter);
    }

    #[test]
    fn non_finite_present_values_normalize_to_absent() {
        let piecewise = MetricDefinition::new(
            "dockq",
            100.0,
            Transform::piecewise(vec![(0.0, 0.0), (1.0, 100.0)]),
            ValidRange::UNBOUNDED,
        )
        .unwrap();
        for m in [linear(0.0, 1.0, Direction::HigherIsBetter), piecewise] {
            for raw in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
                assert_eq!(m.normalize(MetricValue::Present(raw)), None, "{raw}");
            }
        }
    }

    #[test]
    fn piecewise_does_not_turn_nan_into_a_score() {
        let transform = Transform::piecewise(vec![(0.0, 0.0), (1.0, 100.0)]);
        assert!(transform.apply(f64::NAN).is_nan());
    }

    #[test]
    fn piecewise_with_descending_scores_reports_lower_is_better() {
        let t = Transform::piecewise(vec![(70.0, 80.0), (90.0, 40.0), (95.0, 0.0)]);
        assert!(t.validate(&"cdrh3_identity".into()).is_ok());
        assert_eq!(t.direction(), Direction::LowerIsBetter);
        assert_eq!(t.apply(10.0), 80.0);
        assert!((t.apply(80.0) - 60.0).abs() < 1e-9);
    }

    #[test]
    fn piecewise_rejects_bad_knots() {
        let id: MetricId = "m".into();
        let single = Transform::piecewise(vec![(0.0, 0.0)]);
        let unsorted = Transform::piecewise(vec![(0.0, 0.0), (0.0, 50.0)]);
        let out_of_scale = Transform::piecewise(vec![(0.0, 0.0), (1.0, 120.0)]);
        for t in [single, unsorted, out_of_scale] {
            assert!(matches!(t.validate(&id), Err(ConfigError::InvalidKnots { .. })));
        }
    }

    #[test]
    fn valid_range_checks_both_ends() {
        let range = ValidRange::new(Some(0.0), Some(1.0));
        assert!(range.contains(0.0));
        assert!(range.contains(1.0));
        assert!(!range.contains(1.01));
        assert!(!range.contains(-0.01));
        assert!(ValidRange::UNBOUNDED.contains(-1e300));
        assert_eq!(range.to_string(), "[0, 1]");
        assert_eq!(ValidRange::new(Some(0.0), None).to_string(), "[0, inf]");
    }

    #[test]
    fn inverted_valid_range_is_rejected() {
        let result = MetricDefinition::new(
            "m",
            100.0,
            Transform::linear(0.0, 1.0, Direction::HigherIsBetter),
            ValidRange::new(Some(2.0), Some(1.0)),
        );
        assert!(matches!(result, Err(ConfigError::InvalidValidRange { .. })));
    }

    #[test]
    fn category_requires_metric_weights_summing_to_total() {
        let a = linear(0.0, 1.0, Direction::HigherIsBetter).with_weight(60.0);
        let b = MetricDefinition::new(
            "n",
            30.0,
            Transform::linear(0.0, 1.0, Direction::HigherIsBetter),
            ValidRange::UNBOUNDED,
        )
        .unwrap();
        let result = CategoryDefinition::new("developability", 30.0, vec![a, b]);
        assert!(matches!(
            result,
            Err(ConfigError::WeightSum { actual, .. }) if (actual - 90.0).abs() < 1e-9
        ));
    }

    #[test]
    fn category_rejects_empty_metric_list() {
        let result = CategoryDefinition::new("novelty", 20.0, vec![]);
        assert!(matches!(result, Err(ConfigError::EmptyCategory { .. })));
    }

    #[test]
    fn gates_fail_only_on_present_values_outside_bound() {
        let gate = ViabilityGate::new("ipsae", Bound::AtLeast(0.6), None).unwrap();
        assert_eq!(gate.check(MetricValue::Present(0.59)), Some("ipsae < 0.6"));
        assert_eq!(gate.check(MetricValue::Present(0.6)), None);
        assert_eq!(gate.check(MetricValue::Absent), None);

        let sasa = ViabilityGate::new(
            "cdr_sasa",
            Bound::Above(250.0),
            Some("CDR SASA too small".into()),
        )
        .unwrap();
        assert_eq!(sasa.check(MetricValue::Present(250.0)), Some("CDR SASA too small"));
        assert_eq!(sasa.check(MetricValue::Present(250.5)), None);
    }

    #[test]
    fn gate_with_non_finite_threshold_is_rejected() {
        let result = ViabilityGate::new("ipsae", Bound::Below(f64::NAN), None);
        assert!(matches!(result, Err(ConfigError::InvalidGate { .. })));
    }
}
