//! Command-line argument parsing.

use crate::error::{CliError, Result};
use clap::Parser;
use hobbes_engine::{Conclusion, Value};
use std::path::PathBuf;

/// Hobbes - explain what a sample's data says about its age model.
#[derive(Debug, Parser)]
#[command(name = "hobbes")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Sample file (JSON or TOML)
    #[arg(short, long, env = "HOBBES_SAMPLE")]
    pub sample: PathBuf,

    /// Extra rule file (TOML), added to the built-in rules
    #[arg(short, long, env = "HOBBES_RULES")]
    pub rules: Option<PathBuf>,

    /// Use only the rule file, without the built-in rules
    #[arg(long, requires = "rules")]
    pub only_rules: bool,

    /// Engine configuration file (TOML)
    #[arg(short, long, env = "HOBBES_CONFIG")]
    pub config: Option<PathBuf>,

    /// Conclusion to argue about, as `name` or `name: p1, p2` (repeatable)
    #[arg(long = "conclusion", value_name = "NAME")]
    pub conclusions: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<CliFormat>,

    /// Only compute confidences, skipping simulations
    #[arg(short, long)]
    pub quick: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Log more (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Indented argument tree
    Text,
    /// One row per conclusion
    Table,
    /// Full argument tree as JSON
    Json,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Text => crate::config::OutputFormat::Text,
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}

impl Cli {
    /// Log filter directive for the requested verbosity
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

/// Parse `hiatus at depth: 12, 3400` into a conclusion
///
/// Parameters are numbers or booleans where they parse as such, text
/// otherwise.
pub fn parse_conclusion(s: &str) -> Result<Conclusion> {
    let (name, params) = match s.split_once(':') {
        Some((name, params)) => (name, Some(params)),
        None => (s, None),
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(CliError::InvalidInput(format!("Empty conclusion name in '{}'", s)));
    }

    let params = params
        .map(|p| p.split(',').map(|v| parse_value(v.trim())).collect::<Vec<Value>>())
        .unwrap_or_default();
    Ok(Conclusion::with_params(name.to_lowercase(), params))
}

fn parse_value(s: &str) -> Value {
    if let Ok(n) = s.parse::<f64>() {
        return Value::Number(n);
    }
    match s {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::Text(s.to_string()),
    }
}
