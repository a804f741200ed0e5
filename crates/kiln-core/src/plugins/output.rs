use async_trait::async_trait;
use kiln_chain::{BundlerChain, chain_id};
use kiln_config::Target;

use crate::context::PluginContext;
use crate::plugin::Setup;

/// Output location, filenames, public path and engine target.
pub struct OutputPlugin;

#[async_trait]
impl Setup for OutputPlugin {
    async fn setup(&self, chain: &mut BundlerChain, ctx: &PluginContext) -> anyhow::Result<()> {
        let config = ctx.config();
        let output = &config.output;
        let hash = output.filename_hash && ctx.is_prod();

        let (filename, chunk_filename) = match ctx.target() {
            Target::Node => ("[name].js".to_string(), "[name].js".to_string()),
            _ if hash => (
                format!("{}/[name].[contenthash:8].js", output.dist_path.js),
                format!("{}/async/[name].[contenthash:8].js", output.dist_path.js),
            ),
            _ => (
                format!("{}/[name].js", output.dist_path.js),
                format!("{}/async/[name].js", output.dist_path.js),
            ),
        };

        chain
            .set(chain_id::path::OUTPUT_PATH, output.dist_path.root.as_str())?
            .set(chain_id::path::OUTPUT_FILENAME, filename)?
            .set(chain_id::path::OUTPUT_CHUNK_FILENAME, chunk_filename)?
            .set(
                chain_id::path::OUTPUT_PUBLIC_PATH,
                config.asset_prefix(ctx.mode()),
            )?
            .set(chain_id::path::TARGET, ctx.target().engine_target())?
            .set("output.clean", output.clean_dist_path)?
            .set("optimization.minimize", output.minify && ctx.is_prod())?;

        Ok(())
    }
}
