use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::cli::enums::{ModeArg, TargetArg};

/// Available Kiln subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate the configuration
    ///
    /// Loads kiln.toml, kiln.config.json or the `kiln` field of package.json
    /// (plus KILN_ environment overrides) and reports every problem found.
    Check(CheckArgs),

    /// Print the engine configuration
    ///
    /// Runs the full session (validate, merge defaults, run plugins,
    /// finalize) and prints the result as JSON.
    Inspect(InspectArgs),
}

/// Where the configuration comes from
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Project root searched for a config file
    #[arg(long, default_value = ".", value_name = "DIR")]
    pub root: PathBuf,

    /// Use this config file instead of searching the root
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Ignore KILN_ environment overrides
    #[arg(long)]
    pub no_env: bool,

    /// Reject unknown keys instead of dropping them
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Arguments for the inspect command
#[derive(Args, Debug)]
pub struct InspectArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Build target
    #[arg(short, long, value_enum, default_value = "web")]
    pub target: TargetArg,

    /// Build mode
    #[arg(short, long, value_enum, default_value = "production")]
    pub mode: ModeArg,

    /// Write the JSON here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}
