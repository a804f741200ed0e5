//! Typed Kiln configuration.
//!
//! These structs are deserialized from the merged configuration after
//! validation. Functions in `tools` are not data and live in
//! [`ToolHooks`](crate::ToolHooks) instead.

mod helpers;
mod html;
mod output;
mod performance;
mod source;
mod types;

use indexmap::IndexMap;
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ConfigError, Result};

pub use html::HtmlOptions;
pub use output::{DistPath, OutputOptions, SourceMap};
pub use performance::{ChunkSplit, PerformanceOptions};
pub use source::{EntryValue, SourceOptions};
pub use types::{ChunkSplitStrategy, Charset, HookUtils, HtmlInject, Mode, Polyfill, Target};

use helpers::{default_asset_prefix, default_html_plugin, default_true};

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KilnConfig {
    #[serde(default)]
    pub output: OutputOptions,

    #[serde(default)]
    pub source: SourceOptions,

    #[serde(default)]
    pub dev: DevOptions,

    #[serde(default)]
    pub html: HtmlOptions,

    #[serde(default)]
    pub performance: PerformanceOptions,

    #[serde(default)]
    pub tools: ToolsOptions,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_federation: Option<ModuleFederationConfig>,
}

impl KilnConfig {
    /// Deserialize from plain data, as produced by
    /// [`ConfigValue::to_data`](crate::ConfigValue::to_data).
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| ConfigError::InvalidValue {
            field: "config".to_string(),
            message: e.to_string(),
        })
    }

    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(|e| ConfigError::InvalidValue {
            field: "config".to_string(),
            message: e.to_string(),
        })
    }

    /// Public path for the given mode.
    pub fn asset_prefix(&self, mode: Mode) -> &str {
        match mode {
            Mode::Development => &self.dev.asset_prefix,
            _ => &self.output.asset_prefix,
        }
    }
}

/// Development server options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevOptions {
    #[serde(default = "default_true")]
    pub hmr: bool,

    /// Public path in development builds
    #[serde(default = "default_asset_prefix")]
    pub asset_prefix: String,

    #[serde(default)]
    pub progress_bar: bool,

    #[serde(default)]
    pub write_to_disk: bool,
}

impl Default for DevOptions {
    fn default() -> Self {
        Self {
            hmr: true,
            asset_prefix: default_asset_prefix(),
            progress_bar: false,
            write_to_disk: false,
        }
    }
}

/// Data half of `tools`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsOptions {
    /// Options forwarded to the HTML plugin; `false` disables it
    #[serde(default = "default_html_plugin")]
    pub html_plugin: Toggle<IndexMap<String, Value>>,
}

impl Default for ToolsOptions {
    fn default() -> Self {
        Self {
            html_plugin: default_html_plugin(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleFederationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<ModuleFederationOptions>,
}

/// Options handed to the container plugin as-is
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleFederationOptions {
    /// Container name; also the chunk excluded from splitting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    #[serde(flatten)]
    pub rest: IndexMap<String, Value>,
}

/// A setting that is either disabled with `false` or holds a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toggle<T> {
    Off,
    On(T),
}

impl<T> Toggle<T> {
    pub fn is_on(&self) -> bool {
        matches!(self, Toggle::On(_))
    }

    pub fn as_option(&self) -> Option<&T> {
        match self {
            Toggle::On(value) => Some(value),
            Toggle::Off => None,
        }
    }
}

impl<T: Default> Default for Toggle<T> {
    fn default() -> Self {
        Toggle::On(T::default())
    }
}

impl<T: Serialize> Serialize for Toggle<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Toggle::Off => serializer.serialize_bool(false),
            Toggle::On(value) => value.serialize(serializer),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Toggle<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr<T> {
            Flag(bool),
            Value(T),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Flag(false) => Ok(Toggle::Off),
            Repr::Flag(true) => Err(de::Error::custom(
                "`true` is not a value here, pass options or `false`",
            )),
            Repr::Value(value) => Ok(Toggle::On(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_value_uses_defaults() {
        let config = KilnConfig::from_value(json!({})).unwrap();
        assert_eq!(config, KilnConfig::default());
        assert_eq!(config.output.asset_prefix, "/");
        assert_eq!(config.output.dist_path.root, "dist");
        assert!(config.tools.html_plugin.is_on());
    }

    #[test]
    fn toggle_reads_false_as_off() {
        let config = KilnConfig::from_value(json!({ "tools": { "htmlPlugin": false } })).unwrap();
        assert_eq!(config.tools.html_plugin, Toggle::Off);
        assert_eq!(config.to_value().unwrap()["tools"]["htmlPlugin"], json!(false));
    }

    #[test]
    fn toggle_rejects_true() {
        let err = KilnConfig::from_value(json!({ "tools": { "htmlPlugin": true } })).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn module_federation_keeps_unknown_options() {
        let config = KilnConfig::from_value(json!({
            "moduleFederation": { "options": { "name": "host", "remotes": { "app": "app@/remote.js" } } }
        }))
        .unwrap();
        let options = config.module_federation.unwrap().options.unwrap();
        assert_eq!(options.name.as_deref(), Some("host"));
        assert!(options.rest.contains_key("remotes"));
    }

    #[test]
    fn asset_prefix_follows_mode() {
        let mut config = KilnConfig::default();
        config.dev.asset_prefix = "http://localhost:3000/".to_string();
        assert_eq!(config.asset_prefix(Mode::Development), "http://localhost:3000/");
        assert_eq!(config.asset_prefix(Mode::Production), "/");
    }
}
