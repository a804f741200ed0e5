//! One validate → merge → run plugins → finalize cycle.

use std::sync::Arc;

use kiln_chain::{BundlerChain, ChainValue, EngineConfig, chain_id};
use kiln_config::{ConfigValue, EngineTool, Mode, ResolvedConfig, Target, Validator, builder_schema};
use tracing::{Instrument, debug, info, info_span, warn};

use crate::context::PluginContext;
use crate::error::{KilnError, Result};
use crate::plugin::PluginDescriptor;
use crate::plugins::{container_name, patch_engine_split_chunks};
use crate::runner::{HookRunner, PluginRegistry, RunSummary};

/// The product of a successful session.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub engine: EngineConfig,
    pub summary: RunSummary,
}

/// Drives one build configuration from raw input to engine configuration.
///
/// The chain is owned by the session and never escapes it unless every
/// step succeeds; a failing plugin discards it.
///
/// # Example
///
/// ```no_run
/// use kiln_config::{ConfigValue, Mode, Target};
/// use kiln_core::BuildSession;
/// use serde_json::json;
///
/// # async fn run() -> kiln_core::Result<()> {
/// let session = BuildSession::new(Target::Web, Mode::Production);
/// let output = session
///     .run(&ConfigValue::from(json!({ "output": { "polyfill": "entry" } })))
///     .await?;
/// println!("{}", output.engine.to_json_string());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct BuildSession {
    registry: PluginRegistry,
    runner: HookRunner,
    target: Target,
    mode: Mode,
    strict: bool,
}

impl BuildSession {
    /// A session with the builtin plugins registered.
    pub fn new(target: Target, mode: Mode) -> Self {
        Self::with_registry(PluginRegistry::with_builtins(), target, mode)
    }

    /// A session running exactly the plugins in `registry`.
    pub fn with_registry(registry: PluginRegistry, target: Target, mode: Mode) -> Self {
        Self {
            registry,
            runner: HookRunner::new(),
            target,
            mode,
            strict: false,
        }
    }

    /// Reject unknown configuration keys instead of dropping them.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn register(&mut self, plugin: PluginDescriptor) -> Result<&mut Self> {
        self.registry.register(plugin)?;
        Ok(self)
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Validate and merge `raw`, then run the session.
    ///
    /// Validation and merge errors surface before any plugin runs.
    pub async fn run(&self, raw: &ConfigValue) -> Result<BuildOutput> {
        let validator = if self.strict {
            Validator::new(builder_schema()).strict()
        } else {
            Validator::new(builder_schema())
        };
        let resolved = kiln_config::load_config_with(raw, validator)?;
        self.run_resolved(Arc::new(resolved)).await
    }

    pub async fn run_resolved(&self, config: Arc<ResolvedConfig>) -> Result<BuildOutput> {
        let span = info_span!("session", target = %self.target, mode = %self.mode);
        self.execute(config).instrument(span).await
    }

    async fn execute(&self, config: Arc<ResolvedConfig>) -> Result<BuildOutput> {
        let ctx = PluginContext::new(config, self.target, self.mode);

        let mut chain = BundlerChain::new();
        chain.set(chain_id::path::MODE, self.mode.as_str())?;

        let summary = self.runner.run(&self.registry, &mut chain, &ctx).await?;

        let finished = finish(chain, &ctx);
        let teardown = self.runner.teardown(&self.registry, &summary, &ctx).await;

        let engine = finished?;
        teardown?;

        info!(plugins = summary.executed.len(), "engine configuration ready");
        Ok(BuildOutput { engine, summary })
    }
}

/// Finalize the chain and apply `tools.rspack`.
///
/// A container exclusion queued by module federation is applied again once
/// the engine hooks ran, so they cannot put the container chunk back into a
/// split-chunks group.
fn finish(mut chain: BundlerChain, ctx: &PluginContext) -> Result<EngineConfig> {
    let container = chain
        .has_deferred(chain_id::deferred::MF_PATCH_SPLIT_CHUNKS)
        .then(|| container_name(ctx))
        .flatten();
    let mut engine = chain.finalize()?;
    let utils = ctx.utils();

    for (index, tool) in ctx.resolved().hooks().engine.iter().enumerate() {
        match tool {
            EngineTool::Merge(value) => {
                debug!(index, "merging tools.rspack object");
                engine.merge(ChainValue::from(value.clone()));
            }
            EngineTool::Modify(f) => {
                debug!(index, "running tools.rspack function");
                f(&mut engine, &utils).map_err(|source| {
                    warn!(index, error = %source, "engine config hook failed");
                    KilnError::EngineHook { index, source }
                })?;
            }
        }
    }

    if let Some(name) = container {
        patch_engine_split_chunks(&mut engine, &name);
    }

    Ok(engine)
}
