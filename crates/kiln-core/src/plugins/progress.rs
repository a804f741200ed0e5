use async_trait::async_trait;
use kiln_chain::{BundlerChain, chain_id};

use crate::context::PluginContext;
use crate::plugin::Setup;

/// Registers the engine progress plugin when `dev.progressBar` is on.
pub struct ProgressPlugin;

#[async_trait]
impl Setup for ProgressPlugin {
    async fn setup(&self, chain: &mut BundlerChain, ctx: &PluginContext) -> anyhow::Result<()> {
        if !ctx.config().dev.progress_bar {
            return Ok(());
        }
        chain
            .plugin(chain_id::plugin::PROGRESS)
            .use_plugin("ProgressPlugin", [])?;
        Ok(())
    }
}
