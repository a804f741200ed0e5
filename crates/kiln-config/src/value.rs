//! Raw configuration values.
//!
//! User configuration arrives as a JSON-like tree that may also carry opaque
//! callables (`tools.bundlerChain`, `tools.rspack`). [`ConfigValue`] models
//! both; the validator treats functions as pass-through leaves.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use kiln_chain::{BundlerChain, EngineConfig};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::{Number, Value};

use crate::options::HookUtils;

pub type ConfigMap = IndexMap<String, ConfigValue>;

pub type ChainHookFn = dyn Fn(&mut BundlerChain, &HookUtils) -> anyhow::Result<()> + Send + Sync;
pub type EngineHookFn = dyn Fn(&mut EngineConfig, &HookUtils) -> anyhow::Result<()> + Send + Sync;

/// Which stage a user function hooks into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FnKind {
    /// Runs against the mutable chain, after the builtin plugins
    BundlerChain,
    /// Runs against the finalized engine configuration
    Engine,
}

impl FnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FnKind::BundlerChain => "bundlerChain",
            FnKind::Engine => "engine",
        }
    }
}

/// An opaque user-supplied function. Equality is identity.
#[derive(Clone)]
pub enum ConfigFn {
    BundlerChain(Arc<ChainHookFn>),
    Engine(Arc<EngineHookFn>),
}

impl ConfigFn {
    pub fn bundler_chain(
        f: impl Fn(&mut BundlerChain, &HookUtils) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> Self {
        ConfigFn::BundlerChain(Arc::new(f))
    }

    pub fn engine(
        f: impl Fn(&mut EngineConfig, &HookUtils) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> Self {
        ConfigFn::Engine(Arc::new(f))
    }

    pub fn kind(&self) -> FnKind {
        match self {
            ConfigFn::BundlerChain(_) => FnKind::BundlerChain,
            ConfigFn::Engine(_) => FnKind::Engine,
        }
    }

    fn data_ptr(&self) -> *const () {
        match self {
            ConfigFn::BundlerChain(f) => Arc::as_ptr(f) as *const (),
            ConfigFn::Engine(f) => Arc::as_ptr(f) as *const (),
        }
    }
}

impl fmt::Debug for ConfigFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Function {}]", self.kind().as_str())
    }
}

impl PartialEq for ConfigFn {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind() && self.data_ptr() == other.data_ptr()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum ConfigValue {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<ConfigValue>),
    Object(ConfigMap),
    Function(ConfigFn),
}

impl ConfigValue {
    pub fn object() -> Self {
        ConfigValue::Object(ConfigMap::new())
    }

    /// Shape name used in diagnostics (`received array`).
    pub fn shape(&self) -> &'static str {
        match self {
            ConfigValue::Null => "null",
            ConfigValue::Bool(_) => "boolean",
            ConfigValue::Number(_) => "number",
            ConfigValue::String(_) => "string",
            ConfigValue::Array(_) => "array",
            ConfigValue::Object(_) => "object",
            ConfigValue::Function(_) => "function",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ConfigValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<ConfigValue>> {
        match self {
            ConfigValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ConfigMap> {
        match self {
            ConfigValue::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut ConfigMap> {
        match self {
            ConfigValue::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&ConfigFn> {
        match self {
            ConfigValue::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Look up a dotted path such as `output.polyfill`.
    pub fn get(&self, path: &str) -> Option<&ConfigValue> {
        if path.is_empty() {
            return Some(self);
        }
        path.split('.')
            .try_fold(self, |current, segment| current.as_object()?.get(segment))
    }

    /// JSON projection with every function removed.
    ///
    /// Typed option structs are deserialized from this projection; functions
    /// are collected separately.
    pub fn to_data(&self) -> Value {
        match self {
            ConfigValue::Null | ConfigValue::Function(_) => Value::Null,
            ConfigValue::Bool(b) => Value::Bool(*b),
            ConfigValue::Number(n) => Value::Number(n.clone()),
            ConfigValue::String(s) => Value::String(s.clone()),
            ConfigValue::Array(items) => Value::Array(
                items
                    .iter()
                    .filter(|item| !matches!(item, ConfigValue::Function(_)))
                    .map(Self::to_data)
                    .collect(),
            ),
            ConfigValue::Object(map) => Value::Object(
                map.iter()
                    .filter(|(_, value)| !matches!(value, ConfigValue::Function(_)))
                    .map(|(key, value)| (key.clone(), value.to_data()))
                    .collect(),
            ),
        }
    }
}

impl Serialize for ConfigValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ConfigValue::Null => serializer.serialize_unit(),
            ConfigValue::Bool(b) => serializer.serialize_bool(*b),
            ConfigValue::Number(n) => n.serialize(serializer),
            ConfigValue::String(s) => serializer.serialize_str(s),
            ConfigValue::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            ConfigValue::Object(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (key, value) in fields {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            ConfigValue::Function(f) => serializer.serialize_str(&format!("{f:?}")),
        }
    }
}

impl From<Value> for ConfigValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ConfigValue::Null,
            Value::Bool(b) => ConfigValue::Bool(b),
            Value::Number(n) => ConfigValue::Number(n),
            Value::String(s) => ConfigValue::String(s),
            Value::Array(items) => ConfigValue::Array(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => {
                ConfigValue::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Bool(value)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::String(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::String(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Number(value.into())
    }
}

impl From<ConfigFn> for ConfigValue {
    fn from(value: ConfigFn) -> Self {
        ConfigValue::Function(value)
    }
}

impl From<ConfigMap> for ConfigValue {
    fn from(value: ConfigMap) -> Self {
        ConfigValue::Object(value)
    }
}

impl<T: Into<ConfigValue>> From<Vec<T>> for ConfigValue {
    fn from(value: Vec<T>) -> Self {
        ConfigValue::Array(value.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn get_walks_dotted_paths() {
        let value = ConfigValue::from(json!({ "output": { "polyfill": "entry" } }));
        assert_eq!(value.get("output.polyfill").and_then(ConfigValue::as_str), Some("entry"));
        assert!(value.get("output.missing").is_none());
        assert!(value.get("output.polyfill.deeper").is_none());
    }

    #[test]
    fn functions_compare_by_identity() {
        let f = ConfigFn::bundler_chain(|_, _| Ok(()));
        let g = ConfigFn::bundler_chain(|_, _| Ok(()));
        assert_eq!(f, f.clone());
        assert_ne!(f, g);
    }

    #[test]
    fn data_projection_drops_functions() {
        let mut tools = ConfigMap::new();
        tools.insert("htmlPlugin".into(), false.into());
        tools.insert(
            "bundlerChain".into(),
            ConfigFn::bundler_chain(|_, _| Ok(())).into(),
        );
        let value = ConfigValue::Object(tools);
        assert_eq!(value.to_data(), json!({ "htmlPlugin": false }));
    }
}
