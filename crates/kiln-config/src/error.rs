//! Error types for loading and resolving configuration.

use std::path::PathBuf;

use thiserror::Error;

use crate::merge::MergeConflictError;
use crate::validation::ValidationErrors;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no kiln config found in {}", root.display())]
    NotFound { root: PathBuf },

    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("invalid config value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    MergeConflict(#[from] MergeConflictError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// Issues carried by a validation failure, if this is one.
    pub fn validation_issues(&self) -> Option<&[crate::ValidationIssue]> {
        match self {
            ConfigError::Validation(errors) => Some(errors.issues()),
            _ => None,
        }
    }
}
