//! The builtin default configuration.

use crate::error::Result;
use crate::options::KilnConfig;
use crate::value::ConfigValue;

/// Every section with its default values, as a raw configuration tree.
///
/// Derived from [`KilnConfig::default`], so the typed defaults and the merge
/// baseline never drift apart.
///
/// ```
/// let defaults = kiln_config::create_default_config().unwrap();
/// assert_eq!(
///     defaults.get("output.assetPrefix").and_then(|v| v.as_str()),
///     Some("/")
/// );
/// ```
pub fn create_default_config() -> Result<ConfigValue> {
    Ok(ConfigValue::from(KilnConfig::default().to_value()?))
}
