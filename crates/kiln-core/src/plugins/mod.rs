//! Builtin plugins.
//!
//! They run before any user plugin, in the order listed by
//! [`builtin_plugins`], and translate typed configuration into chain
//! mutations.

mod define;
mod devtool;
mod entry;
mod html;
mod module_federation;
mod output;
mod progress;
mod split_chunks;
mod tools;

pub use define::DefinePlugin;
pub use devtool::DevtoolPlugin;
pub use entry::EntryPlugin;
pub use html::HtmlPlugin;
pub use module_federation::{
    ModuleFederationPlugin, container_name, patch_engine_split_chunks, patch_split_chunks,
};
pub use output::OutputPlugin;
pub use progress::ProgressPlugin;
pub use split_chunks::SplitChunksPlugin;
pub use tools::ToolsPlugin;

use crate::plugin::PluginDescriptor;

/// Builtin plugin names, in run order.
pub mod names {
    pub const ENTRY: &str = "kiln:entry";
    pub const OUTPUT: &str = "kiln:output";
    pub const DEVTOOL: &str = "kiln:devtool";
    pub const DEFINE: &str = "kiln:define";
    pub const HTML: &str = "kiln:html";
    pub const PROGRESS: &str = "kiln:progress";
    pub const SPLIT_CHUNKS: &str = "kiln:split-chunks";
    pub const MODULE_FEDERATION: &str = "kiln:module-federation";
    pub const TOOLS: &str = "kiln:tools";
}

pub fn builtin_plugins() -> Vec<PluginDescriptor> {
    vec![
        PluginDescriptor::setup_only(names::ENTRY, EntryPlugin),
        PluginDescriptor::setup_only(names::OUTPUT, OutputPlugin),
        PluginDescriptor::setup_only(names::DEVTOOL, DevtoolPlugin),
        PluginDescriptor::setup_only(names::DEFINE, DefinePlugin),
        PluginDescriptor::setup_only(names::HTML, HtmlPlugin),
        PluginDescriptor::setup_only(names::PROGRESS, ProgressPlugin),
        PluginDescriptor::setup_only(names::SPLIT_CHUNKS, SplitChunksPlugin),
        PluginDescriptor::setup_only(names::MODULE_FEDERATION, ModuleFederationPlugin),
        PluginDescriptor::setup_only(names::TOOLS, ToolsPlugin),
    ]
}
