//! # kiln-core
//!
//! Plugin hook runner and build sessions.
//!
//! A [`BuildSession`] validates raw configuration, merges it onto the
//! defaults, runs every registered plugin's setup hook against a fresh
//! [`BundlerChain`](kiln_chain::BundlerChain) and finalizes the chain into
//! the engine configuration.
//!
//! ## Quick Start
//!
//! ```no_run
//! use kiln_config::{ConfigValue, Mode, Target};
//! use kiln_core::{BuildSession, PluginDescriptor};
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = BuildSession::new(Target::Web, Mode::Production);
//! session.register(PluginDescriptor::from_fn("resolve-ts", |chain, _ctx| {
//!     chain.set("resolve.extensions", vec![".ts", ".tsx", ".js"])?;
//!     Ok(())
//! }))?;
//!
//! let raw = ConfigValue::from(json!({
//!     "moduleFederation": { "options": { "name": "remote" } }
//! }));
//! let output = session.run(&raw).await?;
//! println!("{}", output.engine.to_json_string());
//! # Ok(()) }
//! ```

pub mod context;
pub mod error;
pub mod plugin;
pub mod plugins;
pub mod runner;
pub mod session;

pub use context::PluginContext;
pub use error::{KilnError, Result};
pub use plugin::{HookCapabilities, PluginDescriptor, PluginHooks, Setup, Teardown};
pub use runner::{HookRunner, PluginRegistry, RunSummary};
pub use session::{BuildOutput, BuildSession};
