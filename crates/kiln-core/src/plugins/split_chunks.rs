use async_trait::async_trait;
use kiln_chain::{BundlerChain, ChainMap, ChainValue, ChunkPolicy, chain_id};
use kiln_config::{ChunkSplit, ChunkSplitStrategy, Target};
use serde_json::json;
use tracing::debug;

use crate::context::PluginContext;
use crate::plugin::Setup;

const NODE_MODULES: &str = "[\\\\/]node_modules[\\\\/]";

/// `performance.chunkSplit` → `optimization.splitChunks`, web targets only.
pub struct SplitChunksPlugin;

#[async_trait]
impl Setup for SplitChunksPlugin {
    async fn setup(&self, chain: &mut BundlerChain, ctx: &PluginContext) -> anyhow::Result<()> {
        if ctx.target() != Target::Web {
            return Ok(());
        }

        let chunk_split = &ctx.config().performance.chunk_split;
        debug!(strategy = ?chunk_split.strategy, "configuring chunk splitting");
        chain.set(chain_id::path::SPLIT_CHUNKS, split_chunks(chunk_split))?;
        Ok(())
    }
}

fn split_chunks(chunk_split: &ChunkSplit) -> ChainValue {
    if chunk_split.strategy == ChunkSplitStrategy::AllInOne {
        return ChainValue::Bool(false);
    }

    let mut groups = ChainMap::new();
    for (name, test) in &chunk_split.force_splitting {
        groups.insert(name.clone(), forced_group(name, test));
    }

    let mut split = ChainMap::new();
    split.insert("chunks".into(), ChunkPolicy::All.into());

    match chunk_split.strategy {
        ChunkSplitStrategy::SplitByExperience => {
            for (name, packages) in [
                ("lib-polyfill", "core-js|@swc[\\\\/]helpers|tslib"),
                ("lib-react", "react|react-dom|scheduler"),
                ("lib-router", "react-router|react-router-dom|history|@remix-run[\\\\/]router"),
            ] {
                groups.insert(
                    name.into(),
                    ChainValue::from(json!({
                        "test": format!("[\\\\/]node_modules[\\\\/](?:{packages})[\\\\/]"),
                        "name": name,
                        "priority": 0,
                        "enforce": true,
                    })),
                );
            }
        }
        ChunkSplitStrategy::SplitByModule => {
            split.insert("minSize".into(), 0_i64.into());
            split.insert("maxInitialRequests".into(), i64::from(u16::MAX).into());
            groups.insert(
                "vendors".into(),
                ChainValue::from(json!({
                    "test": NODE_MODULES,
                    "priority": -9,
                    "reuseExistingChunk": true,
                })),
            );
        }
        ChunkSplitStrategy::SingleVendor => {
            let mut vendor = ChainMap::new();
            vendor.insert("test".into(), NODE_MODULES.into());
            vendor.insert("name".into(), "vendor".into());
            vendor.insert("chunks".into(), ChunkPolicy::All.into());
            vendor.insert("enforce".into(), true.into());
            groups.insert("vendors".into(), ChainValue::Object(vendor));
        }
        ChunkSplitStrategy::Custom | ChunkSplitStrategy::AllInOne => {}
    }

    split.insert("cacheGroups".into(), ChainValue::Object(groups));

    let mut split = ChainValue::Object(split);
    if let Some(user) = &chunk_split.split_chunks {
        let user: ChainMap = user
            .iter()
            .map(|(key, value)| (key.clone(), ChainValue::from(value.clone())))
            .collect();
        split.deep_merge(ChainValue::Object(user));
    }
    split
}

fn forced_group(name: &str, test: &str) -> ChainValue {
    let mut group = ChainMap::new();
    group.insert("test".into(), test.into());
    group.insert("name".into(), name.into());
    group.insert("chunks".into(), ChunkPolicy::All.into());
    group.insert("priority".into(), 0_i64.into());
    group.insert("enforce".into(), true.into());
    ChainValue::Object(group)
}
