//! Kiln CLI.
//!
//! - [`cli`] - Argument definitions
//! - [`commands`] - `check` and `inspect`
//! - [`error`] - Error type and miette conversion
//! - [`logger`] - tracing setup
//! - [`ui`] - Status messages on stderr

pub mod cli;
pub mod commands;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, Result};
