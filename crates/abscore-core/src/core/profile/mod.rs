//! # Profile Module
//!
//! Declarative description of what gets scored for each challenge variant: which metrics
//! exist, how each one is normalized, how metrics group into categories, and the nominal
//! weights at both levels. Profiles are data, loaded once per run and shared read-only.

pub mod definition;
pub mod error;
pub mod file;
pub mod registry;
pub mod weights;

pub use definition::{
    Bound, CategoryDefinition, Direction, MetricDefinition, Transform, ValidRange, ViabilityGate,
};
pub use error::{ConfigError, ProfileLoadError};
pub use registry::ProfileRegistry;
pub use weights::WeightProfile;

/// Every weight level (categories in a profile, metrics in a category) sums to this total.
pub const WEIGHT_TOTAL: f64 = 100.0;

/// Accepted numeric drift when checking weight sums.
pub const WEIGHT_TOLERANCE: f64 = 1e-6;
