use async_trait::async_trait;
use kiln_chain::{BundlerChain, ChainMap, ChainValue, chain_id};

use crate::context::PluginContext;
use crate::plugin::Setup;

/// Registers `DefinePlugin` with `source.define` plus `process.env.NODE_ENV`.
pub struct DefinePlugin;

#[async_trait]
impl Setup for DefinePlugin {
    async fn setup(&self, chain: &mut BundlerChain, ctx: &PluginContext) -> anyhow::Result<()> {
        let mut definitions = ChainMap::new();
        definitions.insert(
            "process.env.NODE_ENV".to_string(),
            ChainValue::from(serde_json::to_string(ctx.mode().as_str())?),
        );
        for (key, value) in &ctx.config().source.define {
            definitions.insert(key.clone(), ChainValue::from(value.clone()));
        }

        chain
            .plugin(chain_id::plugin::DEFINE)
            .use_plugin("DefinePlugin", [ChainValue::Object(definitions)])?;
        Ok(())
    }
}
