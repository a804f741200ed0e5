//! Plugin descriptors.
//!
//! A plugin is a unique name plus a closed set of hooks: every plugin has a
//! setup hook, and may have a teardown hook. The runner dispatches on
//! [`HookCapabilities`] rather than probing the plugin.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use kiln_chain::BundlerChain;

use crate::context::PluginContext;

/// Mutates the chain. Runs once per session, in registration order.
#[async_trait]
pub trait Setup: Send + Sync {
    async fn setup(&self, chain: &mut BundlerChain, ctx: &PluginContext) -> anyhow::Result<()>;
}

/// Releases whatever setup acquired. Runs in reverse registration order.
#[async_trait]
pub trait Teardown: Send + Sync {
    async fn teardown(&self, ctx: &PluginContext) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub enum PluginHooks {
    SetupOnly(Arc<dyn Setup>),
    SetupWithTeardown {
        setup: Arc<dyn Setup>,
        teardown: Arc<dyn Teardown>,
    },
}

/// Hooks a plugin declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookCapabilities {
    pub setup: bool,
    pub teardown: bool,
}

impl PluginHooks {
    pub fn capabilities(&self) -> HookCapabilities {
        HookCapabilities {
            setup: true,
            teardown: matches!(self, PluginHooks::SetupWithTeardown { .. }),
        }
    }

    pub fn setup(&self) -> &dyn Setup {
        match self {
            PluginHooks::SetupOnly(setup) | PluginHooks::SetupWithTeardown { setup, .. } => {
                setup.as_ref()
            }
        }
    }

    pub fn teardown(&self) -> Option<&dyn Teardown> {
        match self {
            PluginHooks::SetupOnly(_) => None,
            PluginHooks::SetupWithTeardown { teardown, .. } => Some(teardown.as_ref()),
        }
    }
}

impl fmt::Debug for PluginHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let caps = self.capabilities();
        f.debug_struct("PluginHooks")
            .field("setup", &caps.setup)
            .field("teardown", &caps.teardown)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct PluginDescriptor {
    name: String,
    position: Option<usize>,
    hooks: PluginHooks,
}

impl PluginDescriptor {
    pub fn new(name: impl Into<String>, hooks: PluginHooks) -> Self {
        Self {
            name: name.into(),
            position: None,
            hooks,
        }
    }

    pub fn setup_only(name: impl Into<String>, setup: impl Setup + 'static) -> Self {
        Self::new(name, PluginHooks::SetupOnly(Arc::new(setup)))
    }

    pub fn with_teardown(
        name: impl Into<String>,
        setup: impl Setup + 'static,
        teardown: impl Teardown + 'static,
    ) -> Self {
        Self::new(
            name,
            PluginHooks::SetupWithTeardown {
                setup: Arc::new(setup),
                teardown: Arc::new(teardown),
            },
        )
    }

    /// A setup-only plugin from a synchronous closure.
    ///
    /// ```
    /// use kiln_core::PluginDescriptor;
    ///
    /// let plugin = PluginDescriptor::from_fn("app:alias", |chain, _ctx| {
    ///     chain.set("resolve.alias.@", "./src")?;
    ///     Ok(())
    /// });
    /// assert_eq!(plugin.name(), "app:alias");
    /// ```
    pub fn from_fn<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut BundlerChain, &PluginContext) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self::setup_only(name, FnSetup(f))
    }

    /// A setup-only plugin whose hook suspends, e.g. to load something first.
    pub fn from_async_fn<F>(name: impl Into<String>, f: F) -> Self
    where
        F: for<'a> Fn(&'a mut BundlerChain, &'a PluginContext) -> BoxFuture<'a, anyhow::Result<()>>
            + Send
            + Sync
            + 'static,
    {
        Self::setup_only(name, AsyncFnSetup(f))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position assigned by the registry; `None` until registered.
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: usize) {
        self.position = Some(position);
    }

    pub fn hooks(&self) -> &PluginHooks {
        &self.hooks
    }

    pub fn capabilities(&self) -> HookCapabilities {
        self.hooks.capabilities()
    }
}

struct FnSetup<F>(F);

#[async_trait]
impl<F> Setup for FnSetup<F>
where
    F: Fn(&mut BundlerChain, &PluginContext) -> anyhow::Result<()> + Send + Sync + 'static,
{
    async fn setup(&self, chain: &mut BundlerChain, ctx: &PluginContext) -> anyhow::Result<()> {
        (self.0)(chain, ctx)
    }
}

struct AsyncFnSetup<F>(F);

#[async_trait]
impl<F> Setup for AsyncFnSetup<F>
where
    F: for<'a> Fn(&'a mut BundlerChain, &'a PluginContext) -> BoxFuture<'a, anyhow::Result<()>>
        + Send
        + Sync
        + 'static,
{
    async fn setup(&self, chain: &mut BundlerChain, ctx: &PluginContext) -> anyhow::Result<()> {
        (self.0)(chain, ctx).await
    }
}
