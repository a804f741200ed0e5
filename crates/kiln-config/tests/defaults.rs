//! Tests for default values.

use kiln_config::{
    Charset, ChunkSplitStrategy, HtmlInject, KilnConfig, Polyfill, create_default_config,
};
use serde_json::json;

#[test]
fn kiln_config_defaults() {
    let config = KilnConfig::default();
    assert_eq!(config.output.dist_path.root, "dist");
    assert_eq!(config.output.dist_path.js, "static/js");
    assert_eq!(config.output.dist_path.css, "static/css");
    assert_eq!(config.output.asset_prefix, "/");
    assert_eq!(config.output.polyfill, Polyfill::Off);
    assert_eq!(config.output.charset, Charset::Ascii);
    assert!(config.output.filename_hash);
    assert!(config.output.minify);
    assert!(config.output.source_map.js.is_none());
    assert!(config.source.entry.is_empty());
    assert!(config.source.pre_entry.is_empty());
    assert!(config.dev.hmr);
    assert_eq!(config.html.inject, HtmlInject::Head);
    assert_eq!(config.html.mount_id, "root");
    assert_eq!(
        config.performance.chunk_split.strategy,
        ChunkSplitStrategy::SplitByExperience
    );
    assert!(config.module_federation.is_none());
}

#[test]
fn default_config_tree_matches_typed_defaults() {
    let tree = create_default_config().unwrap();
    let typed = KilnConfig::from_value(tree.to_data()).unwrap();
    assert_eq!(typed, KilnConfig::default());
}

#[test]
fn default_config_uses_wire_names() {
    let tree = create_default_config().unwrap().to_data();
    assert_eq!(tree["output"]["distPath"]["root"], json!("dist"));
    assert_eq!(tree["source"]["compileJsDataURI"], json!(true));
    assert_eq!(tree["performance"]["chunkSplit"]["strategy"], json!("split-by-experience"));
    assert_eq!(tree["tools"]["htmlPlugin"], json!({}));
}
