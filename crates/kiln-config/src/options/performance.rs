use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::helpers::default_true;
use super::types::ChunkSplitStrategy;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceOptions {
    #[serde(default)]
    pub chunk_split: ChunkSplit,

    /// Strip `console.*` calls from production output
    #[serde(default)]
    pub remove_console: bool,

    #[serde(default = "default_true")]
    pub build_cache: bool,
}

impl Default for PerformanceOptions {
    fn default() -> Self {
        Self {
            chunk_split: ChunkSplit::default(),
            remove_console: false,
            build_cache: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkSplit {
    #[serde(default)]
    pub strategy: ChunkSplitStrategy,

    /// Cache group name to module test, always split out
    #[serde(default)]
    pub force_splitting: IndexMap<String, String>,

    /// Raw engine `splitChunks` merged over the strategy's
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split_chunks: Option<IndexMap<String, Value>>,
}
