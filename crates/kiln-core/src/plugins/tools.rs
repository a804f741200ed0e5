use async_trait::async_trait;
use kiln_chain::BundlerChain;
use tracing::debug;

use crate::context::PluginContext;
use crate::plugin::Setup;

/// Runs the user's `tools.bundlerChain` functions in declaration order.
pub struct ToolsPlugin;

#[async_trait]
impl Setup for ToolsPlugin {
    async fn setup(&self, chain: &mut BundlerChain, ctx: &PluginContext) -> anyhow::Result<()> {
        let utils = ctx.utils();
        for (index, hook) in ctx.resolved().hooks().bundler_chain.iter().enumerate() {
            debug!(index, "running tools.bundlerChain function");
            hook(chain, &utils)?;
        }
        Ok(())
    }
}
