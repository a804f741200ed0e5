//! Configuration ready for a build session.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::defaults::create_default_config;
use crate::error::Result;
use crate::merge::Merger;
use crate::options::KilnConfig;
use crate::schema::builder_schema;
use crate::validation::Validator;
use crate::value::{ChainHookFn, ConfigFn, ConfigValue, EngineHookFn};

/// One `tools.rspack` entry.
#[derive(Clone)]
pub enum EngineTool {
    /// Deep-merged into the engine configuration
    Merge(Value),
    /// Called with the engine configuration
    Modify(Arc<EngineHookFn>),
}

impl fmt::Debug for EngineTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineTool::Merge(value) => f.debug_tuple("Merge").field(value).finish(),
            EngineTool::Modify(_) => f.write_str("Modify([Function engine])"),
        }
    }
}

/// User functions from `tools`, in declaration order.
#[derive(Clone, Default)]
pub struct ToolHooks {
    pub bundler_chain: Vec<Arc<ChainHookFn>>,
    pub engine: Vec<EngineTool>,
}

impl ToolHooks {
    pub fn collect(config: &ConfigValue) -> Self {
        let mut hooks = ToolHooks::default();

        for value in flatten(config.get("tools.bundlerChain")) {
            if let ConfigValue::Function(ConfigFn::BundlerChain(f)) = value {
                hooks.bundler_chain.push(Arc::clone(f));
            }
        }

        for value in flatten(config.get("tools.rspack")) {
            match value {
                ConfigValue::Function(ConfigFn::Engine(f)) => {
                    hooks.engine.push(EngineTool::Modify(Arc::clone(f)));
                }
                ConfigValue::Object(_) => hooks.engine.push(EngineTool::Merge(value.to_data())),
                _ => {}
            }
        }

        hooks
    }

    pub fn is_empty(&self) -> bool {
        self.bundler_chain.is_empty() && self.engine.is_empty()
    }
}

impl fmt::Debug for ToolHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolHooks")
            .field("bundler_chain", &self.bundler_chain.len())
            .field("engine", &self.engine)
            .finish()
    }
}

fn flatten(value: Option<&ConfigValue>) -> Vec<&ConfigValue> {
    match value {
        Some(ConfigValue::Array(items)) => items.iter().collect(),
        Some(ConfigValue::Null) | None => Vec::new(),
        Some(other) => vec![other],
    }
}

/// Validated, merged and typed configuration.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    raw: ConfigValue,
    config: KilnConfig,
    hooks: ToolHooks,
}

impl ResolvedConfig {
    /// Build from an already merged configuration tree.
    pub fn from_merged(merged: ConfigValue) -> Result<Self> {
        let config = KilnConfig::from_value(merged.to_data())?;
        let hooks = ToolHooks::collect(&merged);
        Ok(Self {
            raw: merged,
            config,
            hooks,
        })
    }

    /// The merged tree, functions included.
    pub fn raw(&self) -> &ConfigValue {
        &self.raw
    }

    pub fn config(&self) -> &KilnConfig {
        &self.config
    }

    pub fn hooks(&self) -> &ToolHooks {
        &self.hooks
    }
}

/// Validate `raw`, merge it onto the defaults and type the result.
///
/// Fails before anything else happens when validation or merging fails.
pub fn load_config(raw: &ConfigValue) -> Result<ResolvedConfig> {
    load_config_with(raw, Validator::new(builder_schema()))
}

pub fn load_config_with(raw: &ConfigValue, validator: Validator<'_>) -> Result<ResolvedConfig> {
    let validated = validator.validate(raw)?;
    let defaults = create_default_config()?;
    let merged = Merger::builtin().merge(&defaults, &validated)?;
    let resolved = ResolvedConfig::from_merged(merged)?;
    debug!(
        chain_hooks = resolved.hooks.bundler_chain.len(),
        engine_hooks = resolved.hooks.engine.len(),
        "config resolved"
    );
    Ok(resolved)
}
