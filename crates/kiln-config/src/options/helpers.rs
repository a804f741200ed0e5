use indexmap::IndexMap;
use serde_json::Value;

// Helper defaults
pub(crate) fn default_true() -> bool {
    true
}

pub(crate) fn default_asset_prefix() -> String {
    crate::DEFAULT_ASSET_PREFIX.to_string()
}

pub(crate) fn default_dist_root() -> String {
    "dist".to_string()
}

pub(crate) fn default_dist_js() -> String {
    "static/js".to_string()
}

pub(crate) fn default_dist_css() -> String {
    "static/css".to_string()
}

pub(crate) fn default_dist_html() -> String {
    "./".to_string()
}

pub(crate) fn default_mount_id() -> String {
    "root".to_string()
}

pub(crate) fn default_title() -> String {
    "Kiln App".to_string()
}

pub(crate) fn default_html_plugin() -> super::Toggle<IndexMap<String, Value>> {
    super::Toggle::On(IndexMap::new())
}
