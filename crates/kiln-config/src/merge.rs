//! Layering validated user configuration onto defaults.

use thiserror::Error;
use tracing::trace;

use crate::validation::ValidatedConfig;
use crate::value::ConfigValue;

/// An additive field whose default or user value is not an array.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot concatenate additive field \"{path}\": default is {default_shape}, user value is {user_shape}")]
pub struct MergeConflictError {
    pub path: String,
    pub default_shape: &'static str,
    pub user_shape: &'static str,
}

/// Deep-merges configuration trees.
///
/// Objects merge key by key. Arrays, functions and scalars from the user
/// replace the default wholesale, and a user `false` or `null` over an object
/// disables the whole subtree. Fields registered with [`Merger::additive`]
/// concatenate default then user arrays instead.
#[derive(Debug, Clone, Default)]
pub struct Merger {
    additive: Vec<String>,
}

impl Merger {
    pub fn new() -> Self {
        Self::default()
    }

    /// The merger used for Kiln configuration: `source.preEntry` is additive.
    pub fn builtin() -> Self {
        Self::new().additive("source.preEntry")
    }

    pub fn additive(mut self, path: impl Into<String>) -> Self {
        self.additive.push(path.into());
        self
    }

    pub fn merge(
        &self,
        defaults: &ConfigValue,
        user: &ValidatedConfig,
    ) -> Result<ConfigValue, MergeConflictError> {
        let mut merged = defaults.clone();
        let mut path = Vec::new();
        self.merge_into(&mut merged, user.as_value(), &mut path)?;
        Ok(merged)
    }

    fn merge_into(
        &self,
        target: &mut ConfigValue,
        update: &ConfigValue,
        path: &mut Vec<String>,
    ) -> Result<(), MergeConflictError> {
        if !path.is_empty() && self.is_additive(path) {
            return match (target, update) {
                (ConfigValue::Array(existing), ConfigValue::Array(extra)) => {
                    trace!(path = %path.join("."), "concatenating additive field");
                    existing.extend(extra.iter().cloned());
                    Ok(())
                }
                (slot @ ConfigValue::Null, ConfigValue::Array(_)) => {
                    *slot = update.clone();
                    Ok(())
                }
                (existing, _) => Err(MergeConflictError {
                    path: path.join("."),
                    default_shape: existing.shape(),
                    user_shape: update.shape(),
                }),
            };
        }

        match (target, update) {
            (ConfigValue::Object(existing), ConfigValue::Object(fields)) => {
                for (key, value) in fields {
                    path.push(key.clone());
                    let slot = existing.entry(key.clone()).or_insert(ConfigValue::Null);
                    self.merge_into(slot, value, path)?;
                    path.pop();
                }
                Ok(())
            }
            (slot, value) => {
                *slot = value.clone();
                Ok(())
            }
        }
    }

    fn is_additive(&self, path: &[String]) -> bool {
        self.additive.iter().any(|additive| {
            let mut segments = additive.split('.');
            path.iter().all(|segment| segments.next() == Some(segment.as_str()))
                && segments.next().is_none()
        })
    }
}

/// Merge `user` onto `defaults` with the builtin additive fields.
pub fn merge(
    defaults: &ConfigValue,
    user: &ValidatedConfig,
) -> Result<ConfigValue, MergeConflictError> {
    Merger::builtin().merge(defaults, user)
}
