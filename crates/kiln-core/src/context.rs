use std::sync::Arc;

use kiln_config::{HookUtils, KilnConfig, Mode, ResolvedConfig, Target};

/// What every plugin hook can see besides the chain.
#[derive(Debug, Clone)]
pub struct PluginContext {
    config: Arc<ResolvedConfig>,
    target: Target,
    mode: Mode,
}

impl PluginContext {
    pub fn new(config: Arc<ResolvedConfig>, target: Target, mode: Mode) -> Self {
        Self {
            config,
            target,
            mode,
        }
    }

    pub fn resolved(&self) -> &ResolvedConfig {
        &self.config
    }

    /// Shorthand for the typed configuration.
    pub fn config(&self) -> &KilnConfig {
        self.config.config()
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_prod(&self) -> bool {
        self.mode == Mode::Production
    }

    pub fn utils(&self) -> HookUtils {
        HookUtils::new(self.target, self.mode)
    }
}
