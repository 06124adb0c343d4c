use super::defaults::DefaultsConfig;
use super::models::AppConfig;
use crate::cli::ScoreArgs;
use crate::error::{CliError, Result};
use abscore::core::models::ids::{CategoryId, ChallengeId, MetricId};
use abscore::core::profile::ProfileRegistry;
use abscore::core::profile::file::{ProfileSetFile, TransformFile};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

pub fn build_config(args: &ScoreArgs) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = match &args.profiles {
        Some(path) => load_profile_file(path)?,
        None => ProfileSetFile::builtin(),
    };
    let file_config = apply_set_values(file_config, &args.set_values)?;
    let registry = ProfileRegistry::from_file_config(&file_config)?;

    let default_challenge = ChallengeId::new(
        args.challenge
            .as_deref()
            .unwrap_or(defaults.challenge.as_str()),
    );
    if registry.get(&default_challenge).is_none() {
        return Err(CliError::Argument(format!(
            "Challenge '{}' is not defined by the active profiles (available: {})",
            default_challenge,
            registry
                .challenges()
                .map(|c| c.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )));
    }

    Ok(AppConfig {
        input_path: args.input.clone(),
        output_path: args.output.clone(),
        format: args.format.unwrap_or(defaults.format),
        default_challenge,
        ranked: args.rank || defaults.ranked,
        registry,
    })
}

/// Reads a profile file without validating it, so `-S` overrides can still be applied.
pub fn load_profile_file(path: &Path) -> Result<ProfileSetFile> {
    let content = fs::read_to_string(path)?;
    let file = ProfileSetFile::from_toml_str(&content).map_err(|e| {
        CliError::Config(format!("Failed to parse '{}': {}", path.display(), e))
    })?;
    info!(path = %path.display(), profiles = file.profiles.len(), "Loaded profile file");
    Ok(file)
}

pub fn apply_set_values(
    mut config: ProfileSetFile,
    set_values: &[String],
) -> Result<ProfileSetFile> {
    if set_values.is_empty() {
        return Ok(config);
    }
    for kv_pair in set_values {
        let parts: Vec<_> = kv_pair.splitn(2, '=').collect();
        if parts.len() != 2 {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        }
        let key = parts[0].trim();
        let value_str = parts[1].trim();

        let path: Vec<_> = key.split('.').collect();
        let [challenge, target, field] = path.as_slice() else {
            return Err(CliError::Config(format!(
                "Unsupported configuration key for --set: '{}'. Expected CHALLENGE.ID.FIELD.",
                key
            )));
        };
        let value: f64 = value_str.parse().map_err(|_| {
            CliError::Config(format!("Invalid float value for {}: {}", key, value_str))
        })?;

        let challenge = ChallengeId::new(challenge);
        let profile = config.profile_mut(&challenge).ok_or_else(|| {
            CliError::Config(format!(
                "No profile for challenge '{}' in --set key '{}'",
                challenge, key
            ))
        })?;
        if let Some(base) = &profile.derive_from {
            return Err(CliError::Config(format!(
                "Profile '{}' is derived from '{}'; override the base profile instead",
                challenge, base
            )));
        }

        let metric_id = MetricId::new(target);
        let category_id = CategoryId::new(target);
        if let Some(metric) = profile
            .categories
            .iter_mut()
            .flat_map(|c| c.metrics.iter_mut())
            .find(|m| m.id == metric_id)
        {
            match (*field, &mut metric.transform) {
                ("weight", _) => metric.weight = value,
                ("valid-min", _) => metric.valid_min = Some(value),
                ("valid-max", _) => metric.valid_max = Some(value),
                ("floor", TransformFile::Linear { floor, .. }) => *floor = value,
                ("ceiling", TransformFile::Linear { ceiling, .. }) => *ceiling = value,
                ("floor" | "ceiling", TransformFile::Piecewise { .. }) => {
                    return Err(CliError::Config(format!(
                        "Metric '{}' uses a piecewise transform; '{}' cannot be overridden",
                        metric_id, field
                    )));
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported metric field for --set: '{}'",
                        key
                    )));
                }
            }
        } else if let Some(category) = profile.categories.iter_mut().find(|c| c.id == category_id) {
            match *field {
                "weight" => category.weight = value,
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported category field for --set: '{}'",
                        key
                    )));
                }
            }
        } else {
            return Err(CliError::Config(format!(
                "Profile '{}' has no metric or category named '{}'",
                challenge, target
            )));
        }
        debug!(key, value, "Applied profile override");
    }
    Ok(config)
}
