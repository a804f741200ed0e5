//! Inspect command implementation.
//!
//! Runs a full build session and prints the engine configuration.

use std::fs;

use kiln_core::BuildSession;
use tracing::info;

use crate::cli::InspectArgs;
use crate::commands::utils;
use crate::error::{CliError, Result};
use crate::ui;

/// Execute the inspect command.
pub async fn execute(args: InspectArgs) -> Result<()> {
    let raw = utils::load_raw(&args.config)?;

    let session = BuildSession::new(args.target.into(), args.mode.into()).strict(args.config.strict);
    let output = session.run(&raw).await?;
    info!(plugins = output.summary.executed.len(), "session complete");

    let json = output.engine.to_json_string();
    match &args.output {
        Some(path) => {
            fs::write(path, format!("{json}\n")).map_err(|source| CliError::Write {
                path: path.clone(),
                source,
            })?;
            ui::success(&format!("Engine configuration written to {}", path.display()));
        }
        None => println!("{json}"),
    }
    Ok(())
}
