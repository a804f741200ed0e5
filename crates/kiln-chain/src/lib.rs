//! Addressable build-configuration chain.
//!
//! The chain is the shared, mutable representation of a bundler engine's
//! configuration. Plugins mutate it in registration order; the final state is
//! frozen into an [`EngineConfig`] by [`BundlerChain::finalize`].

pub mod chain;
pub mod chain_id;
pub mod error;
pub mod path;
pub mod predicate;
pub mod value;

pub use chain::{BundlerChain, ChainScope, DeferredMutation, EngineConfig, PluginRegistration, PluginSlot};
pub use error::{ChainError, Result};
pub use path::{ChainPath, IntoChainPath};
pub use predicate::{
    compose, exclude_chunk, ChunkFilter, ChunkPolicy, ChunkUnit, CustomPredicate, ExclusionRule,
    PredicateLayer,
};
pub use value::{ChainMap, ChainValue};
