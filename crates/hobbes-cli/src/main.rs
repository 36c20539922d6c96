//! Hobbes CLI - explain a sample's age model from the command line.

use anyhow::Context;
use clap::Parser;
use hobbes_cli::{commands, Cli, Config, Formatter};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for JSON output
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load().context("Failed to load CLI settings")?;

    let format = cli.format.map(Into::into).unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    let output = commands::execute(&cli, &config, &formatter)
        .with_context(|| format!("Failed to explain {}", cli.sample.display()))?;
    println!("{}", output);
    Ok(())
}
