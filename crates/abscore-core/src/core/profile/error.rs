use crate::core::models::ids::{CategoryId, ChallengeId, MetricId};
use thiserror::Error;

/// A malformed metric definition or weight profile. Fatal at load time.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Metric '{metric}': floor and ceiling are both {value}; the normalization range has zero width")]
    DegenerateRange { metric: MetricId, value: f64 },

    #[error("Metric '{metric}': floor {floor} is greater than ceiling {ceiling}")]
    InvertedRange {
        metric: MetricId,
        floor: f64,
        ceiling: f64,
    },

    #[error("Metric '{metric}': parameter '{field}' must be a finite number")]
    NonFiniteParameter {
        metric: MetricId,
        field: &'static str,
    },

    #[error("Metric '{metric}': invalid piecewise knots: {reason}")]
    InvalidKnots { metric: MetricId, reason: String },

    #[error("Metric '{metric}': valid range minimum {min} exceeds maximum {max}")]
    InvalidValidRange { metric: MetricId, min: f64, max: f64 },

    #[error("{scope}: weight must be a positive finite number, got {weight}")]
    NonPositiveWeight { scope: String, weight: f64 },

    #[error("{scope}: weights sum to {actual}, expected {expected}")]
    WeightSum {
        scope: String,
        expected: f64,
        actual: f64,
    },

    #[error("Profile '{challenge}' defines no categories")]
    EmptyProfile { challenge: ChallengeId },

    #[error("Category '{category}' defines no metrics")]
    EmptyCategory { category: CategoryId },

    #[error("Profile '{challenge}' defines category '{category}' more than once")]
    DuplicateCategory {
        challenge: ChallengeId,
        category: CategoryId,
    },

    #[error("Profile '{challenge}' defines metric '{metric}' more than once")]
    DuplicateMetric {
        challenge: ChallengeId,
        metric: MetricId,
    },

    #[error("Category '{category}' lists metric '{metric}' more than once")]
    DuplicateCategoryMetric {
        category: CategoryId,
        metric: MetricId,
    },

    #[error("Challenge '{0}' is defined more than once")]
    DuplicateChallenge(ChallengeId),

    #[error("Profile '{challenge}' does not define metric '{metric}'")]
    UnknownMetric {
        challenge: ChallengeId,
        metric: MetricId,
    },

    #[error("Gate on metric '{metric}': {reason}")]
    InvalidGate { metric: MetricId, reason: String },

    #[error("Profile '{challenge}' derives from unknown or derived profile '{base}'")]
    InvalidBaseProfile {
        challenge: ChallengeId,
        base: ChallengeId,
    },

    #[error("Profile '{challenge}' would leave category '{category}' without metrics")]
    EmptiedCategory {
        challenge: ChallengeId,
        category: CategoryId,
    },

    #[error("Profile '{challenge}': {reason}")]
    InvalidProfile {
        challenge: ChallengeId,
        reason: String,
    },

    #[error("The profile set does not define any challenge profile")]
    NoProfiles,

    #[error("No weight profile is configured for challenge '{0}'")]
    UnknownChallenge(ChallengeId),
}

#[derive(Debug, Error)]
pub enum ProfileLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Invalid profile configuration: {0}")]
    Config(#[from] ConfigError),
}
