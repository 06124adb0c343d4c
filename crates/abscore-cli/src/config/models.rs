use crate::cli::InputFormat;
use abscore::core::models::ids::ChallengeId;
use abscore::core::profile::ProfileRegistry;
use std::path::PathBuf;

pub struct AppConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub format: InputFormat,
    pub default_challenge: ChallengeId,
    pub ranked: bool,
    pub registry: ProfileRegistry,
}
