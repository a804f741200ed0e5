//! Error handling for the Kiln CLI.
//!
//! Commands return [`CliError`]; `main` converts it into a miette report
//! with [`cli_error_to_miette`].

use std::path::PathBuf;

use kiln_config::ConfigError;
use kiln_core::KilnError;
use miette::Report;
use thiserror::Error;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Loading or validating the configuration failed
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A plugin or engine hook failed
    #[error(transparent)]
    Session(KilnError),

    /// I/O errors from file system operations
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<KilnError> for CliError {
    fn from(err: KilnError) -> Self {
        match err {
            KilnError::Config(err) => CliError::Config(err),
            other => CliError::Session(other),
        }
    }
}

pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Convert a CLI error into a report with a hint where one helps.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Config(ConfigError::NotFound { root }) => miette::miette!(
            help = "create kiln.toml or kiln.config.json, or add a `kiln` field to package.json",
            "no kiln configuration found in {}",
            root.display()
        ),
        CliError::Config(ConfigError::Validation(errors)) => miette::miette!(
            help = "fix the fields listed above; `kiln check` reports every problem at once",
            "{errors}"
        ),
        CliError::Config(ConfigError::MergeConflict(conflict)) => miette::miette!(
            help = "`source.preEntry` expects a list of module paths",
            "{conflict}"
        ),
        CliError::Session(err) => match err.plugin_name() {
            Some(name) => miette::miette!(
                help = format!("the `{name}` plugin rejected the configuration"),
                "{err}"
            ),
            None => miette::miette!("{err}"),
        },
        other => miette::miette!("{other}"),
    }
}
