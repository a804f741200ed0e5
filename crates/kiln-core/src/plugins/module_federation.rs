use async_trait::async_trait;
use kiln_chain::{BundlerChain, ChainValue, EngineConfig, chain_id, exclude_chunk};
use kiln_config::{DEFAULT_ASSET_PREFIX, Target};
use tracing::debug;

use crate::context::PluginContext;
use crate::plugin::Setup;

/// Registers the container plugin and keeps its entry chunk out of every
/// split-chunks group.
///
/// The patch is deferred so it sees `optimization.splitChunks` after every
/// plugin (and `tools.bundlerChain`) has had its say.
pub struct ModuleFederationPlugin;

#[async_trait]
impl Setup for ModuleFederationPlugin {
    async fn setup(&self, chain: &mut BundlerChain, ctx: &PluginContext) -> anyhow::Result<()> {
        let Some(options) = ctx
            .config()
            .module_federation
            .as_ref()
            .and_then(|mf| mf.options.as_ref())
        else {
            return Ok(());
        };
        if ctx.target() != Target::Web {
            return Ok(());
        }

        let args = ChainValue::from(serde_json::to_value(options)?);
        chain
            .plugin(chain_id::plugin::MODULE_FEDERATION)
            .use_plugin("ModuleFederationPlugin", [args])?;

        if chain.get(chain_id::path::OUTPUT_PUBLIC_PATH).and_then(ChainValue::as_str)
            == Some(DEFAULT_ASSET_PREFIX)
        {
            chain.set(chain_id::path::OUTPUT_PUBLIC_PATH, "auto")?;
        }

        if let Some(name) = container_name(ctx) {
            chain.defer(chain_id::deferred::MF_PATCH_SPLIT_CHUNKS, move |chain| {
                patch_split_chunks(chain, &name)?;
                Ok(())
            })?;
        }
        Ok(())
    }
}

/// The container's chunk name when it introduces one on a web build.
///
/// An empty name produces no named chunk, so there is nothing to exclude.
pub fn container_name(ctx: &PluginContext) -> Option<String> {
    if ctx.target() != Target::Web {
        return None;
    }
    ctx.config()
        .module_federation
        .as_ref()?
        .options
        .as_ref()?
        .name
        .clone()
        .filter(|name| !name.is_empty())
}

/// Exclude the chunk `name` from the top-level `chunks` slot and from every
/// cache group that declares its own.
///
/// Whatever selection was there before is kept as the fallback, so a
/// `"initial"` policy or a user predicate still answers for every other
/// chunk. Returns the number of slots patched; a disabled or missing
/// `splitChunks` patches nothing.
pub fn patch_split_chunks(chain: &mut BundlerChain, name: &str) -> kiln_chain::Result<usize> {
    let patched = patch_split(chain.get_mut(chain_id::path::SPLIT_CHUNKS)?, name);
    debug!(name, patched, "excluded container chunk from split chunks");
    Ok(patched)
}

/// Same exclusion over a finished engine configuration.
///
/// Slots that already exclude `name` are left as they are, so running this
/// after [`patch_split_chunks`] only touches slots replaced in between.
pub fn patch_engine_split_chunks(engine: &mut EngineConfig, name: &str) -> usize {
    let split = engine
        .as_map_mut()
        .get_mut("optimization")
        .and_then(ChainValue::as_object_mut)
        .and_then(|optimization| optimization.get_mut("splitChunks"));
    let patched = patch_split(split, name);
    if patched > 0 {
        debug!(name, patched, "re-excluded container chunk after engine hooks");
    }
    patched
}

fn patch_split(split: Option<&mut ChainValue>, name: &str) -> usize {
    let Some(split) = split.and_then(ChainValue::as_object_mut) else {
        return 0;
    };

    let mut patched = usize::from(patch_slot(split.get_mut("chunks"), name));

    if let Some(groups) = split
        .get_mut("cacheGroups")
        .and_then(ChainValue::as_object_mut)
    {
        for group in groups.values_mut().filter_map(ChainValue::as_object_mut) {
            if patch_slot(group.get_mut("chunks"), name) {
                patched += 1;
            }
        }
    }
    patched
}

fn patch_slot(slot: Option<&mut ChainValue>, name: &str) -> bool {
    let Some(slot) = slot else {
        return false;
    };
    // "async" slots are patched too; the layer cannot change their answer
    // for an initial container chunk, it only makes the exclusion visible.
    let Some(prev) = slot.as_chunk_filter() else {
        return false;
    };
    if prev.excludes_chunk_name(name) {
        return false;
    }
    *slot = exclude_chunk(Some(&prev), name).into();
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_chain::{ChunkFilter, ChunkPolicy, ChunkUnit};
    use serde_json::json;

    fn filter_at(chain: &BundlerChain, path: &str) -> ChunkFilter {
        chain
            .get(path)
            .and_then(ChainValue::as_chunk_filter)
            .unwrap_or_else(|| panic!("no chunk filter at {path}"))
    }

    #[test]
    fn patches_top_level_and_explicit_group_slots() {
        let mut chain = BundlerChain::new();
        chain
            .set(
                chain_id::path::SPLIT_CHUNKS,
                json!({
                    "chunks": "initial",
                    "cacheGroups": {
                        "vendors": { "test": "node_modules", "chunks": "all" },
                        "styles": { "test": "\\.css$" }
                    }
                }),
            )
            .unwrap();

        assert_eq!(patch_split_chunks(&mut chain, "remote").unwrap(), 2);

        let top = filter_at(&chain, "optimization.splitChunks.chunks");
        assert!(!top.test(&ChunkUnit::initial("remote")));
        assert!(top.test(&ChunkUnit::initial("main")));
        assert!(!top.test(&ChunkUnit::named("lazy")));
        assert_eq!(top.base(), Some(&ChunkFilter::Policy(ChunkPolicy::Initial)));

        let vendors = filter_at(&chain, "optimization.splitChunks.cacheGroups.vendors.chunks");
        assert!(!vendors.test(&ChunkUnit::named("remote")));
        assert!(vendors.test(&ChunkUnit::named("lazy")));

        assert!(!chain.has("optimization.splitChunks.cacheGroups.styles.chunks"));
    }

    #[test]
    fn disabled_split_chunks_is_left_alone() {
        let mut chain = BundlerChain::new();
        chain.set(chain_id::path::SPLIT_CHUNKS, false).unwrap();

        assert_eq!(patch_split_chunks(&mut chain, "remote").unwrap(), 0);
        assert_eq!(chain.get(chain_id::path::SPLIT_CHUNKS), Some(&ChainValue::Bool(false)));
    }

    #[test]
    fn custom_predicates_keep_answering_for_other_chunks() {
        let mut chain = BundlerChain::new();
        chain
            .set(
                "optimization.splitChunks.chunks",
                ChunkFilter::custom("not-admin", |unit| unit.name() != Some("admin")),
            )
            .unwrap();

        patch_split_chunks(&mut chain, "remote").unwrap();
        let top = filter_at(&chain, "optimization.splitChunks.chunks");
        assert!(!top.test(&ChunkUnit::named("remote")));
        assert!(!top.test(&ChunkUnit::named("admin")));
        assert!(top.test(&ChunkUnit::named("main")));
    }

    #[test]
    fn engine_patch_only_touches_replaced_slots() {
        let mut chain = BundlerChain::new();
        chain
            .set(
                chain_id::path::SPLIT_CHUNKS,
                json!({
                    "chunks": "all",
                    "cacheGroups": { "vendors": { "test": "node_modules", "chunks": "all" } }
                }),
            )
            .unwrap();
        patch_split_chunks(&mut chain, "remote").unwrap();
        let mut engine = chain.finalize().unwrap();

        assert_eq!(patch_engine_split_chunks(&mut engine, "remote"), 0);

        engine.merge(ChainValue::from(json!({
            "optimization": { "splitChunks": { "cacheGroups": { "vendors": { "chunks": "async" } } } }
        })));
        assert_eq!(patch_engine_split_chunks(&mut engine, "remote"), 1);

        let vendors = engine
            .get("optimization.splitChunks.cacheGroups.vendors.chunks")
            .and_then(ChainValue::as_chunk_filter)
            .unwrap();
        assert_eq!(vendors.depth(), 1);
        assert_eq!(vendors.base(), Some(&ChunkFilter::Policy(ChunkPolicy::Async)));
    }
}
