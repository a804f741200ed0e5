//! Configuration loading shared by the commands.

use std::path::Path;

use kiln_config::{ConfigDiscovery, ConfigError, ConfigSource, ConfigValue, env_overrides};
use tracing::debug;

use crate::cli::ConfigArgs;
use crate::error::Result;
use crate::ui;

/// Classify an explicitly named config file by its name.
pub fn config_source(path: &Path) -> ConfigSource {
    let path = path.to_path_buf();
    match path.file_name().and_then(|name| name.to_str()) {
        Some("package.json") => ConfigSource::PackageJson(path),
        _ if path.extension().is_some_and(|ext| ext == "toml") => ConfigSource::Toml(path),
        _ => ConfigSource::Json(path),
    }
}

/// Load the raw configuration the arguments point at.
///
/// Without a config file the defaults are used, with environment overrides
/// still applied.
pub fn load_raw(args: &ConfigArgs) -> Result<ConfigValue> {
    let discovery = if args.no_env {
        ConfigDiscovery::new(&args.root).without_env()
    } else {
        ConfigDiscovery::new(&args.root)
    };

    if let Some(path) = &args.config {
        let path = if path.is_absolute() {
            path.clone()
        } else {
            args.root.join(path)
        };
        if !path.is_file() {
            return Err(ConfigError::NotFound { root: path }.into());
        }
        return discovery.load_from(&config_source(&path)).map_err(Into::into);
    }

    match discovery.load() {
        Ok(raw) => Ok(raw),
        Err(ConfigError::NotFound { root }) => {
            debug!(root = %root.display(), "no config file found");
            ui::warning("No kiln config found, using defaults");
            if args.no_env {
                Ok(ConfigValue::from(serde_json::json!({})))
            } else {
                Ok(ConfigValue::from(env_overrides()?))
            }
        }
        Err(err) => Err(err.into()),
    }
}
