//! Stable identifiers for well-known chain mutation sites.
//!
//! Plugins that need to adjust what another plugin registered look it up by
//! these ids instead of scanning the plugin list.

/// Engine plugin registrations (`chain.plugin(id)`).
pub mod plugin {
    pub const DEFINE: &str = "define";
    pub const MODULE_FEDERATION: &str = "module-federation";
    pub const HTML: &str = "html";
    pub const PROGRESS: &str = "progress";
}

/// Deferred mutations (`chain.defer(id, ..)`).
pub mod deferred {
    pub const MF_PATCH_SPLIT_CHUNKS: &str = "mf-patch-split-chunks";
}

/// Node paths.
pub mod path {
    pub const ENTRY: &str = "entry";
    pub const DEVTOOL: &str = "devtool";
    pub const TARGET: &str = "target";
    pub const MODE: &str = "mode";
    pub const OUTPUT_PATH: &str = "output.path";
    pub const OUTPUT_FILENAME: &str = "output.filename";
    pub const OUTPUT_CHUNK_FILENAME: &str = "output.chunkFilename";
    pub const OUTPUT_PUBLIC_PATH: &str = "output.publicPath";
    pub const SPLIT_CHUNKS: &str = "optimization.splitChunks";
    pub const CACHE_GROUPS: &str = "optimization.splitChunks.cacheGroups";
}
