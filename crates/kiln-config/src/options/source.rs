use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::helpers::default_true;

/// One entry: a module path or an ordered list of them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryValue {
    Single(String),
    Multiple(Vec<String>),
}

impl EntryValue {
    pub fn paths(&self) -> Vec<String> {
        match self {
            EntryValue::Single(path) => vec![path.clone()],
            EntryValue::Multiple(paths) => paths.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceOptions {
    /// Named entries; empty means `index: ./src/index`
    #[serde(default)]
    pub entry: IndexMap<String, EntryValue>,

    /// Modules prepended to every entry
    #[serde(default)]
    pub pre_entry: Vec<String>,

    #[serde(default)]
    pub include: Vec<String>,

    #[serde(default)]
    pub exclude: Vec<String>,

    /// Compile-time constants
    #[serde(default)]
    pub define: IndexMap<String, Value>,

    #[serde(default)]
    pub alias: IndexMap<String, EntryValue>,

    #[serde(default = "default_true", rename = "compileJsDataURI")]
    pub compile_js_data_uri: bool,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            entry: IndexMap::new(),
            pre_entry: Vec::new(),
            include: Vec::new(),
            exclude: Vec::new(),
            define: IndexMap::new(),
            alias: IndexMap::new(),
            compile_js_data_uri: true,
        }
    }
}
