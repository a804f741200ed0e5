//! Command implementations.
//!
//! - [`check`] - Validate the configuration
//! - [`inspect`] - Print the engine configuration

pub mod check;
pub mod inspect;
pub(crate) mod utils;

pub use check::execute as check_execute;
pub use inspect::execute as inspect_execute;
