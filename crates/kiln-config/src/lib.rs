//! Configuration schema, validation and loading for Kiln.
//!
//! The pipeline is `validate` → `merge` onto [`create_default_config`] →
//! [`ResolvedConfig`]. [`load_config`] runs all three.

pub mod defaults;
pub mod discovery;
pub mod error;
pub mod merge;
pub mod options;
pub mod resolved;
pub mod schema;
pub mod validation;
pub mod value;

/// Public path used when none is configured.
pub const DEFAULT_ASSET_PREFIX: &str = "/";

pub use defaults::create_default_config;
pub use discovery::{ConfigDiscovery, ConfigSource, ENV_PREFIX, discover, env_overrides};
pub use error::{ConfigError, Result};
pub use merge::{MergeConflictError, Merger, merge};
pub use options::*;
pub use resolved::{EngineTool, ResolvedConfig, ToolHooks, load_config, load_config_with};
pub use schema::{Schema, SchemaKind, UnknownKeys, builder_schema};
pub use validation::{
    IssueKind, ValidatedConfig, ValidationErrors, ValidationIssue, Validator, validate,
    validate_strict,
};
pub use value::{ChainHookFn, ConfigFn, ConfigMap, ConfigValue, EngineHookFn, FnKind};
