use thiserror::Error;

use crate::patients::PatientId;

/// Configuration could not be loaded or does not describe a valid run.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Cannot build a selection model from an empty patient dataset")]
    EmptyDataset,
    #[error("Invalid patient {0}: {1}")]
    InvalidPatient(PatientId, String),
    #[error("Selection has {actual} entries but the model has {expected} variables")]
    SelectionLength { expected: usize, actual: usize },
}

#[derive(Debug, Error)]
pub enum SolveError {
    #[error("Solver failed: {0}")]
    Backend(String),
    #[error("Solver returned an assignment that violates the model: {0}")]
    InvalidSolution(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Solve(#[from] SolveError),
}
