//! The mutable build-configuration chain shared by plugins.
//!
//! A [`BundlerChain`] is created per build session. Plugins address nodes by
//! [`ChainPath`], register engine plugins under stable ids, and may defer
//! mutations that must observe every other plugin's changes. Once
//! [`BundlerChain::finalize`] runs, every mutating call fails with
//! [`ChainError::Finalized`].

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{ChainError, Result};
use crate::path::{ChainPath, IntoChainPath};
use crate::value::{ChainMap, ChainValue};

/// A mutation run at finalization, after every plugin hook completed.
pub type DeferredMutation = Box<dyn FnOnce(&mut BundlerChain) -> anyhow::Result<()> + Send>;

/// An engine plugin registered on the chain.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginRegistration {
    pub constructor: String,
    pub args: Vec<ChainValue>,
}

#[derive(Default)]
pub struct BundlerChain {
    root: ChainMap,
    plugins: IndexMap<String, PluginRegistration>,
    deferred: IndexMap<String, DeferredMutation>,
    finalized: bool,
}

impl BundlerChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn get(&self, path: impl IntoChainPath) -> Option<&ChainValue> {
        let path = path.into_chain_path().ok()?;
        lookup(&self.root, path.segments())
    }

    pub fn has(&self, path: impl IntoChainPath) -> bool {
        self.get(path).is_some()
    }

    /// Mutable access to an existing node.
    pub fn get_mut(&mut self, path: impl IntoChainPath) -> Result<Option<&mut ChainValue>> {
        let path = path.into_chain_path()?;
        self.ensure_open("modify", &path)?;
        Ok(lookup_mut(&mut self.root, path.segments()))
    }

    /// Set the node at `path`, creating intermediate objects.
    pub fn set(&mut self, path: impl IntoChainPath, value: impl Into<ChainValue>) -> Result<&mut Self> {
        let path = path.into_chain_path()?;
        self.ensure_open("set", &path)?;
        let value = value.into();

        if path.is_root() {
            return match value {
                ChainValue::Object(map) => {
                    self.root = map;
                    Ok(self)
                }
                _ => Err(ChainError::NotAnObject {
                    path: String::new(),
                }),
            };
        }

        trace!(path = %path, "chain set");
        let slot = entry_mut(&mut self.root, &path)?;
        *slot = value;
        Ok(self)
    }

    /// Deep-merge `value` into the node at `path`, creating it if absent.
    pub fn merge(&mut self, path: impl IntoChainPath, value: impl Into<ChainValue>) -> Result<&mut Self> {
        let path = path.into_chain_path()?;
        self.ensure_open("merge", &path)?;
        let value = value.into();

        if path.is_root() {
            let mut root = ChainValue::Object(std::mem::take(&mut self.root));
            root.deep_merge(value);
            return match root {
                ChainValue::Object(map) => {
                    self.root = map;
                    Ok(self)
                }
                _ => Err(ChainError::NotAnObject {
                    path: String::new(),
                }),
            };
        }

        trace!(path = %path, "chain merge");
        let slot = entry_mut(&mut self.root, &path)?;
        if slot.is_null() {
            *slot = value;
        } else {
            slot.deep_merge(value);
        }
        Ok(self)
    }

    pub fn delete(&mut self, path: impl IntoChainPath) -> Result<Option<ChainValue>> {
        let path = path.into_chain_path()?;
        self.ensure_open("delete", &path)?;

        let Some((parent, key)) = path.split_last() else {
            return Ok(Some(ChainValue::Object(std::mem::take(&mut self.root))));
        };

        let map = if parent.is_empty() {
            Some(&mut self.root)
        } else {
            lookup_mut(&mut self.root, parent).and_then(ChainValue::as_object_mut)
        };
        Ok(map.and_then(|map| map.shift_remove(key)))
    }

    /// A view whose paths are relative to `path`.
    pub fn scope(&mut self, path: impl IntoChainPath) -> Result<ChainScope<'_>> {
        let base = path.into_chain_path()?;
        Ok(ChainScope { chain: self, base })
    }

    pub fn output(&mut self) -> ChainScope<'_> {
        ChainScope {
            chain: self,
            base: ChainPath::parse("output").unwrap_or_default(),
        }
    }

    pub fn optimization(&mut self) -> ChainScope<'_> {
        ChainScope {
            chain: self,
            base: ChainPath::parse("optimization").unwrap_or_default(),
        }
    }

    /// The engine-plugin slot registered under `id`.
    pub fn plugin(&mut self, id: impl Into<String>) -> PluginSlot<'_> {
        PluginSlot {
            chain: self,
            id: id.into(),
        }
    }

    pub fn get_plugin(&self, id: &str) -> Option<&PluginRegistration> {
        self.plugins.get(id)
    }

    pub fn has_plugin(&self, id: &str) -> bool {
        self.plugins.contains_key(id)
    }

    pub fn plugin_ids(&self) -> impl Iterator<Item = &str> {
        self.plugins.keys().map(String::as_str)
    }

    /// Register a mutation to run at finalization.
    ///
    /// Deferring under an id that is already queued replaces the earlier
    /// mutation while keeping its position.
    pub fn defer(
        &mut self,
        id: impl Into<String>,
        mutation: impl FnOnce(&mut BundlerChain) -> anyhow::Result<()> + Send + 'static,
    ) -> Result<()> {
        let id = id.into();
        if self.finalized {
            return Err(ChainError::Finalized {
                operation: "defer",
                path: id,
            });
        }
        debug!(id = %id, "deferred chain mutation registered");
        self.deferred.insert(id, Box::new(mutation));
        Ok(())
    }

    pub fn has_deferred(&self, id: &str) -> bool {
        self.deferred.contains_key(id)
    }

    /// Drop a queued deferred mutation; returns whether one was queued.
    pub fn cancel_deferred(&mut self, id: &str) -> Result<bool> {
        if self.finalized {
            return Err(ChainError::Finalized {
                operation: "cancel",
                path: id.to_string(),
            });
        }
        Ok(self.deferred.shift_remove(id).is_some())
    }

    /// Run deferred mutations, freeze the chain, and produce the engine config.
    ///
    /// Mutations queued by other deferred mutations run in the same pass.
    pub fn finalize(&mut self) -> Result<EngineConfig> {
        if self.finalized {
            return Err(ChainError::Finalized {
                operation: "finalize",
                path: String::new(),
            });
        }

        while let Some((id, mutation)) = self.deferred.shift_remove_index(0) {
            debug!(id = %id, "running deferred chain mutation");
            mutation(self).map_err(|source| ChainError::DeferredFailed { id, source })?;
        }

        self.finalized = true;
        Ok(self.to_config())
    }

    /// Render the current state without finalizing.
    pub fn to_config(&self) -> EngineConfig {
        let mut root = self.root.clone();
        if !self.plugins.is_empty() {
            let mut list = match root.shift_remove("plugins") {
                Some(ChainValue::Array(existing)) => existing,
                Some(other) => vec![other],
                None => Vec::new(),
            };
            for (id, registration) in &self.plugins {
                let mut entry = ChainMap::new();
                entry.insert("name".to_string(), ChainValue::from(id.as_str()));
                entry.insert(
                    "constructor".to_string(),
                    ChainValue::from(registration.constructor.as_str()),
                );
                entry.insert(
                    "args".to_string(),
                    ChainValue::Array(registration.args.clone()),
                );
                list.push(ChainValue::Object(entry));
            }
            root.insert("plugins".to_string(), ChainValue::Array(list));
        }
        EngineConfig { root }
    }

    fn ensure_open(&self, operation: &'static str, path: &ChainPath) -> Result<()> {
        if self.finalized {
            return Err(ChainError::Finalized {
                operation,
                path: path.to_string(),
            });
        }
        Ok(())
    }
}

impl fmt::Debug for BundlerChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BundlerChain")
            .field("root", &self.root)
            .field("plugins", &self.plugins)
            .field("deferred", &self.deferred.keys().collect::<Vec<_>>())
            .field("finalized", &self.finalized)
            .finish()
    }
}

fn lookup<'a>(root: &'a ChainMap, segments: &[String]) -> Option<&'a ChainValue> {
    let (first, rest) = segments.split_first()?;
    let mut current = root.get(first)?;
    for segment in rest {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

fn lookup_mut<'a>(root: &'a mut ChainMap, segments: &[String]) -> Option<&'a mut ChainValue> {
    let (first, rest) = segments.split_first()?;
    let mut current = root.get_mut(first)?;
    for segment in rest {
        current = current.as_object_mut()?.get_mut(segment)?;
    }
    Some(current)
}

/// Walk to `path`, creating empty objects (and the final slot) on the way.
fn entry_mut<'a>(root: &'a mut ChainMap, path: &ChainPath) -> Result<&'a mut ChainValue> {
    let segments = path.segments();
    let Some((last, parents)) = segments.split_last() else {
        return Err(ChainError::InvalidPath {
            path: String::new(),
            reason: "root has no slot".to_string(),
        });
    };

    let mut map = root;
    for (depth, segment) in parents.iter().enumerate() {
        let node = map
            .entry(segment.clone())
            .or_insert_with(ChainValue::object);
        if node.is_null() {
            *node = ChainValue::object();
        }
        map = node.as_object_mut().ok_or_else(|| ChainError::NotAnObject {
            path: segments[..=depth].join("."),
        })?;
    }

    Ok(map.entry(last.clone()).or_insert(ChainValue::Null))
}

/// A chain view rooted at a sub-path.
pub struct ChainScope<'a> {
    chain: &'a mut BundlerChain,
    base: ChainPath,
}

impl ChainScope<'_> {
    pub fn path(&self) -> &ChainPath {
        &self.base
    }

    pub fn get(&self, path: impl IntoChainPath) -> Option<&ChainValue> {
        let path = path.into_chain_path().ok()?;
        self.chain.get(self.base.join(&path))
    }

    pub fn get_mut(&mut self, path: impl IntoChainPath) -> Result<Option<&mut ChainValue>> {
        let path = self.base.join(&path.into_chain_path()?);
        self.chain.get_mut(path)
    }

    pub fn set(&mut self, path: impl IntoChainPath, value: impl Into<ChainValue>) -> Result<&mut Self> {
        let path = self.base.join(&path.into_chain_path()?);
        self.chain.set(path, value)?;
        Ok(self)
    }

    pub fn merge(&mut self, path: impl IntoChainPath, value: impl Into<ChainValue>) -> Result<&mut Self> {
        let path = self.base.join(&path.into_chain_path()?);
        self.chain.merge(path, value)?;
        Ok(self)
    }

    pub fn delete(&mut self, path: impl IntoChainPath) -> Result<Option<ChainValue>> {
        let path = self.base.join(&path.into_chain_path()?);
        self.chain.delete(path)
    }

    pub fn scope(&mut self, path: impl IntoChainPath) -> Result<ChainScope<'_>> {
        let base = self.base.join(&path.into_chain_path()?);
        Ok(ChainScope {
            chain: &mut *self.chain,
            base,
        })
    }
}

/// Handle on the engine plugin registered under one id.
pub struct PluginSlot<'a> {
    chain: &'a mut BundlerChain,
    id: String,
}

impl PluginSlot<'_> {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn get(&self) -> Option<&PluginRegistration> {
        self.chain.plugins.get(&self.id)
    }

    /// Register (or re-register) the engine plugin at this id.
    ///
    /// Re-registering keeps the original position in the plugin list.
    pub fn use_plugin(
        self,
        constructor: impl Into<String>,
        args: impl IntoIterator<Item = ChainValue>,
    ) -> Result<()> {
        if self.chain.finalized {
            return Err(ChainError::Finalized {
                operation: "register plugin",
                path: self.id,
            });
        }
        let registration = PluginRegistration {
            constructor: constructor.into(),
            args: args.into_iter().collect(),
        };
        debug!(id = %self.id, constructor = %registration.constructor, "engine plugin registered");
        self.chain.plugins.insert(self.id, registration);
        Ok(())
    }

    /// Adjust the arguments of an already registered plugin.
    pub fn tap(self, f: impl FnOnce(&mut Vec<ChainValue>)) -> Result<()> {
        if self.chain.finalized {
            return Err(ChainError::Finalized {
                operation: "tap plugin",
                path: self.id,
            });
        }
        let registration = self
            .chain
            .plugins
            .get_mut(&self.id)
            .ok_or_else(|| ChainError::PluginNotFound {
                id: self.id.clone(),
            })?;
        f(&mut registration.args);
        Ok(())
    }

    pub fn remove(self) -> Result<Option<PluginRegistration>> {
        if self.chain.finalized {
            return Err(ChainError::Finalized {
                operation: "remove plugin",
                path: self.id,
            });
        }
        Ok(self.chain.plugins.shift_remove(&self.id))
    }
}

/// The finalized configuration handed to the bundler engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EngineConfig {
    root: ChainMap,
}

impl EngineConfig {
    pub fn get(&self, path: impl IntoChainPath) -> Option<&ChainValue> {
        let path = path.into_chain_path().ok()?;
        lookup(&self.root, path.segments())
    }

    pub fn as_map(&self) -> &ChainMap {
        &self.root
    }

    /// Engine-side hooks edit the plain object after hand-off.
    pub fn as_map_mut(&mut self) -> &mut ChainMap {
        &mut self.root
    }

    pub fn merge(&mut self, update: ChainValue) {
        let mut root = ChainValue::Object(std::mem::take(&mut self.root));
        root.deep_merge(update);
        if let ChainValue::Object(map) = root {
            self.root = map;
        }
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.root
                .iter()
                .map(|(key, value)| (key.clone(), value.to_json()))
                .collect(),
        )
    }

    /// Pretty-printed JSON; `Value`'s alternate `Display` cannot fail.
    pub fn to_json_string(&self) -> String {
        format!("{:#}", self.to_json())
    }
}
