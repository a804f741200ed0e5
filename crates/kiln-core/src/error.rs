//! Top-level error type for build sessions.

use kiln_chain::ChainError;
use kiln_config::ConfigError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, KilnError>;

#[derive(Debug, Error)]
pub enum KilnError {
    /// Loading, validating or merging the configuration failed
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("plugin name `{name}` is already registered")]
    DuplicatePluginName { name: String },

    #[error("plugin `{name}` failed during setup: {source}")]
    PluginSetup {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("plugin `{name}` failed during teardown: {source}")]
    PluginTeardown {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Chain(#[from] ChainError),

    /// A `tools.rspack` function failed
    #[error("engine config hook #{index} failed: {source}")]
    EngineHook {
        index: usize,
        #[source]
        source: anyhow::Error,
    },
}

impl KilnError {
    /// Name of the plugin that caused the error, if any.
    pub fn plugin_name(&self) -> Option<&str> {
        match self {
            KilnError::DuplicatePluginName { name }
            | KilnError::PluginSetup { name, .. }
            | KilnError::PluginTeardown { name, .. } => Some(name),
            _ => None,
        }
    }
}
