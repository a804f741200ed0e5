//! File-based config discovery for CLI use
//!
//! Handles finding Kiln configuration files and layering `KILN_` environment
//! overrides on top of them.

use std::fs;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml};
use serde_json::Value;
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::schema::{Schema, SchemaKind, builder_schema};
use crate::value::ConfigValue;

/// Prefix for environment overrides, e.g. `KILN_OUTPUT__POLYFILL=entry`.
pub const ENV_PREFIX: &str = "KILN_";

/// Where a configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Toml(PathBuf),
    Json(PathBuf),
    /// The `kiln` field of a package.json
    PackageJson(PathBuf),
}

impl ConfigSource {
    pub fn path(&self) -> &Path {
        match self {
            ConfigSource::Toml(path) | ConfigSource::Json(path) | ConfigSource::PackageJson(path) => {
                path
            }
        }
    }
}

/// File-based configuration discovery
///
/// # Example
///
/// ```no_run
/// use kiln_config::ConfigDiscovery;
///
/// let raw = ConfigDiscovery::new(".").load().unwrap();
/// ```
pub struct ConfigDiscovery {
    root: PathBuf,
    env: bool,
}

impl ConfigDiscovery {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            env: true,
        }
    }

    /// Skip `KILN_` environment overrides.
    pub fn without_env(mut self) -> Self {
        self.env = false;
        self
    }

    /// Find a config file in the root directory
    ///
    /// Searches in this order:
    /// 1. kiln.toml
    /// 2. kiln.config.json
    /// 3. package.json (kiln field)
    pub fn find(&self) -> Option<ConfigSource> {
        let toml_path = self.root.join("kiln.toml");
        if toml_path.is_file() {
            return Some(ConfigSource::Toml(toml_path));
        }

        let json_path = self.root.join("kiln.config.json");
        if json_path.is_file() {
            return Some(ConfigSource::Json(json_path));
        }

        let pkg_path = self.root.join("package.json");
        if let Ok(content) = fs::read_to_string(&pkg_path) {
            if let Ok(parsed) = serde_json::from_str::<Value>(&content) {
                if parsed.get("kiln").is_some_and(|kiln| !kiln.is_null()) {
                    return Some(ConfigSource::PackageJson(pkg_path));
                }
            }
        }

        None
    }

    /// Load the raw (unvalidated) configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if no config file is found.
    pub fn load(&self) -> Result<ConfigValue> {
        let source = self.find().ok_or_else(|| ConfigError::NotFound {
            root: self.root.clone(),
        })?;
        self.load_from(&source)
    }

    /// Load from a known source, applying environment overrides.
    pub fn load_from(&self, source: &ConfigSource) -> Result<ConfigValue> {
        debug!(path = %source.path().display(), "loading kiln config");

        let figment = match source {
            ConfigSource::Toml(path) => Figment::from(Toml::file_exact(path)),
            ConfigSource::Json(path) => Figment::from(Json::file_exact(path)),
            ConfigSource::PackageJson(path) => {
                Figment::from(Serialized::defaults(read_package_field(path)?))
            }
        };

        let figment = if self.env {
            figment.merge(Serialized::defaults(env_overrides()?))
        } else {
            figment
        };

        let value: Value = figment.extract().map_err(|e| ConfigError::Parse {
            path: source.path().to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(ConfigValue::from(value))
    }
}

fn read_package_field(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)?;
    let mut parsed: Value = serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    match parsed.get_mut("kiln").map(Value::take) {
        Some(value @ Value::Object(_)) => Ok(value),
        _ => Err(ConfigError::InvalidValue {
            field: "kiln".to_string(),
            message: "the package.json `kiln` field must be an object".to_string(),
        }),
    }
}

/// `KILN_` variables as a nested object with schema-cased keys.
///
/// `__` separates levels and keys match case-insensitively, ignoring
/// underscores: `KILN_OUTPUT__FILENAME_HASH` sets `output.filenameHash`.
pub fn env_overrides() -> Result<Value> {
    let value: Value = Figment::from(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(|e| ConfigError::Parse {
            path: PathBuf::from("<env>"),
            message: e.to_string(),
        })?;
    Ok(canonicalize_keys(value, Some(builder_schema())))
}

fn canonicalize_keys(value: Value, schema: Option<&Schema>) -> Value {
    let Value::Object(map) = value else {
        return value;
    };

    let fold = |key: &str| key.replace('_', "").to_ascii_lowercase();
    map.into_iter()
        .map(|(key, value)| {
            let declared = schema.and_then(|schema| match &schema.kind {
                SchemaKind::Object(object) => object
                    .fields
                    .iter()
                    .find(|(name, _)| fold(name) == fold(&key)),
                _ => None,
            });
            match declared {
                Some((name, field)) => (name.clone(), canonicalize_keys(value, Some(field))),
                None => (key, canonicalize_keys(value, None)),
            }
        })
        .collect::<serde_json::Map<_, _>>()
        .into()
}

/// Discover and load config from the current directory.
pub fn discover() -> Result<ConfigValue> {
    let root = std::env::current_dir()?;
    ConfigDiscovery::new(&root).load()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canonicalizes_env_keys_against_schema() {
        let value = canonicalize_keys(
            json!({ "output": { "filename_hash": false, "distpath": { "root": "out" } } }),
            Some(builder_schema()),
        );
        assert_eq!(
            value,
            json!({ "output": { "filenameHash": false, "distPath": { "root": "out" } } })
        );
    }

    #[test]
    fn unknown_env_keys_pass_through_untouched() {
        let value = canonicalize_keys(json!({ "mystery": { "x_y": 1 } }), Some(builder_schema()));
        assert_eq!(value, json!({ "mystery": { "x_y": 1 } }));
    }
}
