use abscore::core::io::{MetricsCsvError, ReportError};
use abscore::core::profile::{ConfigError, ProfileLoadError};
use abscore::engine::error::EngineError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    ProfileLoad(#[from] ProfileLoadError),

    #[error("Invalid profile configuration: {0}")]
    Profile(#[from] ConfigError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read metrics from '{path}': {source}", path = path.display())]
    MetricsInput {
        path: PathBuf,
        #[source]
        source: MetricsCsvError,
    },

    #[error("Failed to write report to '{path}': {source}", path = path.display())]
    ReportOutput {
        path: PathBuf,
        #[source]
        source: ReportError,
    },

    #[error("{count} duplicate design(s) were rejected: {keys}")]
    DuplicateDesigns { count: usize, keys: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
