use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::helpers::{default_mount_id, default_title};
use super::types::HtmlInject;

/// HTML page options consumed by the HTML plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HtmlOptions {
    #[serde(default = "default_title")]
    pub title: String,

    /// Custom template path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    #[serde(default)]
    pub inject: HtmlInject,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,

    /// Per-entry favicon overrides
    #[serde(default)]
    pub favicon_by_entries: IndexMap<String, String>,

    /// Id of the element the app mounts into
    #[serde(default = "default_mount_id")]
    pub mount_id: String,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            title: default_title(),
            template: None,
            inject: HtmlInject::default(),
            favicon: None,
            favicon_by_entries: IndexMap::new(),
            mount_id: default_mount_id(),
        }
    }
}
