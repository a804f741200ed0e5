//! Plugin registry and sequential hook runner.

use std::collections::HashSet;

use kiln_chain::BundlerChain;
use tracing::{Instrument, debug, error, info_span, warn};

use crate::context::PluginContext;
use crate::error::{KilnError, Result};
use crate::plugin::PluginDescriptor;

/// Plugins in registration order, names unique.
#[derive(Debug, Default, Clone)]
pub struct PluginRegistry {
    plugins: Vec<PluginDescriptor>,
    names: HashSet<String>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry preloaded with the builtin plugins.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for plugin in crate::plugins::builtin_plugins() {
            let registered = registry.register(plugin);
            debug_assert!(registered.is_ok(), "builtin plugin names collide: {registered:?}");
        }
        registry
    }

    /// Append a plugin.
    ///
    /// # Errors
    ///
    /// Returns `KilnError::DuplicatePluginName` if the name is taken; the
    /// registry is left unchanged.
    pub fn register(&mut self, mut plugin: PluginDescriptor) -> Result<usize> {
        if !self.names.insert(plugin.name().to_string()) {
            return Err(KilnError::DuplicatePluginName {
                name: plugin.name().to_string(),
            });
        }
        let position = self.plugins.len();
        plugin.set_position(position);
        debug!(name = plugin.name(), position, "plugin registered");
        self.plugins.push(plugin);
        Ok(position)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.plugins.iter().map(PluginDescriptor::name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PluginDescriptor> {
        self.plugins.iter()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    fn get(&self, name: &str) -> Option<&PluginDescriptor> {
        self.plugins.iter().find(|plugin| plugin.name() == name)
    }
}

/// Plugins whose setup completed, in the order they ran.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub executed: Vec<String>,
}

/// Runs plugin hooks one at a time.
///
/// Each setup is awaited before the next starts, so every plugin observes
/// the mutations of the plugins registered before it.
#[derive(Debug, Default, Clone, Copy)]
pub struct HookRunner;

impl HookRunner {
    pub fn new() -> Self {
        Self
    }

    /// Run every setup hook in registration order.
    ///
    /// Stops at the first failure. Teardown hooks of the plugins that already
    /// completed run before the error is returned.
    pub async fn run(
        &self,
        registry: &PluginRegistry,
        chain: &mut BundlerChain,
        ctx: &PluginContext,
    ) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        for plugin in registry.iter() {
            let span = info_span!("plugin", name = plugin.name());
            let outcome = plugin
                .hooks()
                .setup()
                .setup(chain, ctx)
                .instrument(span)
                .await;

            match outcome {
                Ok(()) => summary.executed.push(plugin.name().to_string()),
                Err(source) => {
                    error!(name = plugin.name(), error = %source, "plugin setup failed");
                    if let Err(teardown_err) = self.teardown(registry, &summary, ctx).await {
                        warn!(error = %teardown_err, "teardown after failed setup also failed");
                    }
                    return Err(KilnError::PluginSetup {
                        name: plugin.name().to_string(),
                        source,
                    });
                }
            }
        }

        debug!(count = summary.executed.len(), "plugin setup complete");
        Ok(summary)
    }

    /// Run teardown hooks of the executed plugins in reverse order.
    ///
    /// Every teardown runs even if an earlier one fails; the first failure
    /// is returned.
    pub async fn teardown(
        &self,
        registry: &PluginRegistry,
        summary: &RunSummary,
        ctx: &PluginContext,
    ) -> Result<()> {
        let mut first_error = None;

        for name in summary.executed.iter().rev() {
            let Some(teardown) = registry.get(name).and_then(|plugin| plugin.hooks().teardown())
            else {
                continue;
            };

            let span = info_span!("plugin teardown", name = name.as_str());
            if let Err(source) = teardown.teardown(ctx).instrument(span).await {
                warn!(name = name.as_str(), error = %source, "plugin teardown failed");
                first_error.get_or_insert(KilnError::PluginTeardown {
                    name: name.clone(),
                    source,
                });
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
