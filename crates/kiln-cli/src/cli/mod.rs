//! Command-line interface definition for Kiln.
//!
//! - `kiln check` - Validate the configuration
//! - `kiln inspect` - Print the engine configuration a build would use

mod commands;
pub mod enums;

use clap::Parser;

pub use commands::{CheckArgs, Command, ConfigArgs, InspectArgs};
pub use enums::{ModeArg, TargetArg};

/// Kiln - bundler configuration, validated and composed
#[derive(Parser, Debug)]
#[command(
    name = "kiln",
    version,
    about = "Validate and inspect bundler configuration",
    long_about = "Kiln validates a project's build configuration, layers it onto the defaults\n\
                  and runs the configuration plugins to produce the engine configuration."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}
