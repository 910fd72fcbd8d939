use std::path::PathBuf;

use thiserror::Error;

use crate::aspr_interface::Color;

pub type Result<T> = std::result::Result<T, SimError>;

/// Errors raised while configuring or persisting a simulation.
///
/// The tick loop itself never fails; everything here surfaces at construction
/// time or at the I/O boundary.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("color set is empty")]
    EmptyColorSet,

    #[error("invalid spawn times: {reason}")]
    InvalidSpawnTimes { reason: String },

    #[error("spawn times file not found: {0}")]
    SpawnTimesNotFound(PathBuf),

    #[error("unknown decision strategy: {0}")]
    UnknownStrategy(String),

    #[error("invalid argument for strategy {strategy}: {reason}")]
    InvalidStrategyArgument { strategy: String, reason: String },

    #[error("unknown interference model: {0}")]
    UnknownInterferenceModel(String),

    #[error("no predictor for color {0}")]
    MissingPredictor(Color),

    #[error("feature width mismatch: expected {expected}, found {found}")]
    FeatureMismatch { expected: usize, found: usize },

    #[error("seed range overflows: base seed {base_seed} plus {n_runs} runs")]
    SeedRangeOverflow { base_seed: u64, n_runs: usize },

    #[error("output location already exists: {0}")]
    OutputExists(PathBuf),

    #[error("invalid record: {reason}")]
    InvalidRecord { reason: String },

    #[error("training failed: {reason}")]
    Training { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}
