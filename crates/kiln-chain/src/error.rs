//! Error types for chain mutation and finalization.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChainError>;

#[derive(Debug, Error)]
pub enum ChainError {
    /// A mutation was attempted after the registry was finalized
    #[error("cannot {operation} `{path}`: the chain has already been finalized")]
    Finalized { operation: &'static str, path: String },

    #[error("invalid chain path `{path}`: {reason}")]
    InvalidPath { path: String, reason: String },

    /// An intermediate node on the path holds a non-object value
    #[error("cannot descend into `{path}`: node is not an object")]
    NotAnObject { path: String },

    #[error("engine plugin `{id}` is not registered")]
    PluginNotFound { id: String },

    #[error("deferred mutation `{id}` failed: {source}")]
    DeferredFailed {
        id: String,
        #[source]
        source: anyhow::Error,
    },
}

impl ChainError {
    pub fn is_finalized(&self) -> bool {
        matches!(self, ChainError::Finalized { .. })
    }
}
