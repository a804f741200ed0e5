use async_trait::async_trait;
use kiln_chain::{BundlerChain, ChainMap, ChainValue, chain_id};
use kiln_config::{Polyfill, Target};
use tracing::debug;

use crate::context::PluginContext;
use crate::plugin::Setup;

const DEFAULT_ENTRY: (&str, &str) = ("index", "./src/index");
const POLYFILL_ENTRY: &str = "core-js";

/// `source.entry` → `entry`, with `source.preEntry` (and the polyfill) in
/// front of every entry.
pub struct EntryPlugin;

#[async_trait]
impl Setup for EntryPlugin {
    async fn setup(&self, chain: &mut BundlerChain, ctx: &PluginContext) -> anyhow::Result<()> {
        let config = ctx.config();

        let mut prepend = Vec::new();
        if config.output.polyfill == Polyfill::Entry && ctx.target() == Target::Web {
            prepend.push(POLYFILL_ENTRY.to_string());
        }
        prepend.extend(config.source.pre_entry.iter().cloned());

        let mut entries: Vec<(String, Vec<String>)> = config
            .source
            .entry
            .iter()
            .map(|(name, value)| (name.clone(), value.paths()))
            .collect();
        if entries.is_empty() {
            entries.push((DEFAULT_ENTRY.0.to_string(), vec![DEFAULT_ENTRY.1.to_string()]));
        }

        let mut entry = ChainMap::new();
        for (name, paths) in entries {
            let modules: Vec<ChainValue> = prepend
                .iter()
                .chain(paths.iter())
                .map(|path| ChainValue::from(path.as_str()))
                .collect();
            entry.insert(name, ChainValue::Array(modules));
        }

        debug!(entries = entry.len(), prepended = prepend.len(), "entries resolved");
        chain.set(chain_id::path::ENTRY, entry)?;
        Ok(())
    }
}
