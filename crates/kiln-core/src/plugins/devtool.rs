use async_trait::async_trait;
use kiln_chain::{BundlerChain, ChainValue, chain_id};
use kiln_config::Toggle;

use crate::context::PluginContext;
use crate::plugin::Setup;

const DEV_DEVTOOL: &str = "cheap-module-source-map";

/// `output.sourceMap.js` → `devtool`; `false` disables source maps.
pub struct DevtoolPlugin;

#[async_trait]
impl Setup for DevtoolPlugin {
    async fn setup(&self, chain: &mut BundlerChain, ctx: &PluginContext) -> anyhow::Result<()> {
        let devtool = match &ctx.config().output.source_map.js {
            Some(Toggle::On(devtool)) => ChainValue::from(devtool.as_str()),
            Some(Toggle::Off) => ChainValue::Bool(false),
            None if ctx.is_prod() => ChainValue::Bool(false),
            None => ChainValue::from(DEV_DEVTOOL),
        };
        chain.set(chain_id::path::DEVTOOL, devtool)?;
        Ok(())
    }
}
