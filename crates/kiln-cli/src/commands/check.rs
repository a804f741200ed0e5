//! Check command implementation.
//!
//! Validates the configuration without running any plugin.

use kiln_config::{ConfigError, Validator, builder_schema};
use tracing::info;

use crate::cli::CheckArgs;
use crate::commands::utils;
use crate::error::Result;
use crate::ui;

/// Execute the check command.
///
/// Every validation issue is printed before the error is returned.
pub async fn execute(args: CheckArgs) -> Result<()> {
    ui::info("Checking configuration...");

    let raw = utils::load_raw(&args.config)?;
    let validator = if args.config.strict {
        Validator::new(builder_schema()).strict()
    } else {
        Validator::new(builder_schema())
    };

    match validator.validate(&raw) {
        Ok(_) => {
            info!("configuration valid");
            ui::success("Configuration is valid!");
            Ok(())
        }
        Err(errors) => {
            for issue in errors.issues() {
                ui::error(&issue.message());
            }
            Err(ConfigError::Validation(errors).into())
        }
    }
}
