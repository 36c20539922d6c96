//! Hobbes CLI library.
//!
//! This library provides the core functionality for the `hobbes` command-line
//! interface: argument parsing, user settings, running the engine over a
//! sample file, and output formatting.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::{Cli, CliFormat};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
