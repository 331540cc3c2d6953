//! Finchat CLI library.
//!
//! Command-line and REPL front end for the report chat and the registry chat,
//! including configuration loading, logging setup, and output formatting.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod repl;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
