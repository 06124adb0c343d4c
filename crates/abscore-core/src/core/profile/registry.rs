use super::definition::{
    Bound, CategoryDefinition, MetricDefinition, Transform, ValidRange, ViabilityGate,
};
use super::error::{ConfigError, ProfileLoadError};
use super::file::{CategoryFile, GateFile, MetricFile, ProfileFile, ProfileSetFile, TransformFile};
use super::weights::WeightProfile;
use crate::core::models::ids::ChallengeId;
use std::path::Path;
use tracing::{debug, info};

/// All weight profiles of a run, keyed by challenge, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct ProfileRegistry {
    profiles: Vec<WeightProfile>,
}

impl ProfileRegistry {
    pub fn load(path: &Path) -> Result<Self, ProfileLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| ProfileLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let file = ProfileSetFile::from_toml_str(&content).map_err(|e| ProfileLoadError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let registry = Self::from_file_config(&file)?;
        info!(
            path = %path.display(),
            profiles = registry.profiles.len(),
            "Loaded weight profiles"
        );
        Ok(registry)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ProfileLoadError> {
        let file = ProfileSetFile::from_toml_str(content).map_err(|e| ProfileLoadError::Toml {
            path: "<inline>".to_string(),
            source: e,
        })?;
        Ok(Self::from_file_config(&file)?)
    }

    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_file_config(&ProfileSetFile::builtin())
    }

    /// Validates every profile and resolves `derive-from` references.
    ///
    /// A derived profile may only name an explicitly defined base; chains of derivation are
    /// rejected.
    pub fn from_file_config(file: &ProfileSetFile) -> Result<Self, ConfigError> {
        if file.profiles.is_empty() {
            return Err(ConfigError::NoProfiles);
        }
        for (i, profile) in file.profiles.iter().enumerate() {
            if file.profiles[..i]
                .iter()
                .any(|p| p.challenge == profile.challenge)
            {
                return Err(ConfigError::DuplicateChallenge(profile.challenge.clone()));
            }
        }

        let mut explicit = Vec::new();
        for profile in file.profiles.iter().filter(|p| p.derive_from.is_none()) {
            explicit.push(build_explicit(profile)?);
        }

        let mut profiles = Vec::with_capacity(file.profiles.len());
        for profile in &file.profiles {
            match &profile.derive_from {
                None => {
                    let built = explicit
                        .iter()
                        .find(|p: &&WeightProfile| p.challenge() == &profile.challenge);
                    if let Some(built) = built {
                        profiles.push(built.clone());
                    }
                }
                Some(base) => {
                    if !profile.categories.is_empty() || !profile.gates.is_empty() {
                        return Err(ConfigError::InvalidProfile {
                            challenge: profile.challenge.clone(),
                            reason: "a derived profile cannot declare its own categories or gates"
                                .to_string(),
                        });
                    }
                    let base_profile = explicit
                        .iter()
                        .find(|p| p.challenge() == base)
                        .ok_or_else(|| ConfigError::InvalidBaseProfile {
                            challenge: profile.challenge.clone(),
                            base: base.clone(),
                        })?;
                    debug!(
                        challenge = %profile.challenge,
                        base = %base,
                        excluded = profile.exclude.len(),
                        "Deriving weight profile"
                    );
                    profiles.push(
                        base_profile.without_metrics(profile.challenge.clone(), &profile.exclude)?,
                    );
                }
            }
        }

        Ok(Self { profiles })
    }

    pub fn get(&self, challenge: &ChallengeId) -> Option<&WeightProfile> {
        self.profiles.iter().find(|p| p.challenge() == challenge)
    }

    /// The profile for `challenge`; unknown challenges are a configuration error.
    pub fn weights_for(&self, challenge: &ChallengeId) -> Result<&WeightProfile, ConfigError> {
        self.get(challenge)
            .ok_or_else(|| ConfigError::UnknownChallenge(challenge.clone()))
    }

    pub fn profiles(&self) -> &[WeightProfile] {
        &self.profiles
    }

    pub fn challenges(&self) -> impl Iterator<Item = &ChallengeId> {
        self.profiles.iter().map(WeightProfile::challenge)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

fn build_explicit(profile: &ProfileFile) -> Result<WeightProfile, ConfigError> {
    if !profile.exclude.is_empty() {
        return Err(ConfigError::InvalidProfile {
            challenge: profile.challenge.clone(),
            reason: "'exclude' is only valid together with 'derive-from'".to_string(),
        });
    }
    let categories = profile
        .categories
        .iter()
        .map(build_category)
        .collect::<Result<Vec<_>, _>>()?;
    let gates = profile
        .gates
        .iter()
        .map(build_gate)
        .collect::<Result<Vec<_>, _>>()?;
    WeightProfile::new(profile.challenge.clone(), categories, gates)
}

fn build_category(category: &CategoryFile) -> Result<CategoryDefinition, ConfigError> {
    let metrics = category
        .metrics
        .iter()
        .map(build_metric)
        .collect::<Result<Vec<_>, _>>()?;
    CategoryDefinition::new(category.id.clone(), category.weight, metrics)
}

fn build_metric(metric: &MetricFile) -> Result<MetricDefinition, ConfigError> {
    let transform = match &metric.transform {
        TransformFile::Linear {
            floor,
            ceiling,
            direction,
        } => Transform::linear(*floor, *ceiling, *direction),
        TransformFile::Piecewise { knots } => {
            Transform::piecewise(knots.iter().map(|[x, y]| (*x, *y)).collect())
        }
    };
    MetricDefinition::new(
        metric.id.clone(),
        metric.weight,
        transform,
        ValidRange::new(metric.valid_min, metric.valid_max),
    )
}

fn build_gate(gate: &GateFile) -> Result<ViabilityGate, ConfigError> {
    let bounds: Vec<Bound> = [
        gate.at_least.map(Bound::AtLeast),
        gate.at_most.map(Bound::AtMost),
        gate.above.map(Bound::Above),
        gate.below.map(Bound::Below),
    ]
    .into_iter()
    .flatten()
    .collect();

    match bounds.as_slice() {
        [bound] => ViabilityGate::new(gate.metric.clone(), *bound, gate.reason.clone()),
        [] => Err(ConfigError::InvalidGate {
            metric: gate.metric.clone(),
            reason: "one of at-least, at-most, above, or below is required".to_string(),
        }),
        _ => Err(ConfigError::InvalidGate {
            metric: gate.metric.clone(),
            reason: "only one bound may be given per gate".to_string(),
        }),
    }
}
