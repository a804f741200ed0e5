use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Toggle;
use super::helpers::{
    default_asset_prefix, default_dist_css, default_dist_html, default_dist_js, default_dist_root,
    default_true,
};
use super::types::{Charset, Polyfill};

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputOptions {
    #[serde(default)]
    pub dist_path: DistPath,

    /// Public path in production builds
    #[serde(default = "default_asset_prefix")]
    pub asset_prefix: String,

    /// Add a content hash to emitted filenames
    #[serde(default = "default_true")]
    pub filename_hash: bool,

    #[serde(default)]
    pub polyfill: Polyfill,

    #[serde(default)]
    pub charset: Charset,

    #[serde(default)]
    pub source_map: SourceMap,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_browserslist: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub externals: Option<IndexMap<String, Value>>,

    #[serde(default = "default_true")]
    pub minify: bool,

    #[serde(default = "default_true")]
    pub clean_dist_path: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            dist_path: DistPath::default(),
            asset_prefix: default_asset_prefix(),
            filename_hash: true,
            polyfill: Polyfill::default(),
            charset: Charset::default(),
            source_map: SourceMap::default(),
            override_browserslist: None,
            externals: None,
            minify: true,
            clean_dist_path: true,
        }
    }
}

/// Output directories, relative to `root`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistPath {
    #[serde(default = "default_dist_root")]
    pub root: String,
    #[serde(default = "default_dist_js")]
    pub js: String,
    #[serde(default = "default_dist_css")]
    pub css: String,
    #[serde(default = "default_dist_html")]
    pub html: String,
}

impl Default for DistPath {
    fn default() -> Self {
        Self {
            root: default_dist_root(),
            js: default_dist_js(),
            css: default_dist_css(),
            html: default_dist_html(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMap {
    /// Devtool for scripts; unset picks one from the build mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub js: Option<Toggle<String>>,

    #[serde(default)]
    pub css: bool,
}
