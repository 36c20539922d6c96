//! Running the engine for one invocation.

use crate::cli::{parse_conclusion, Cli};
use crate::config::Config;
use crate::error::Result;
use crate::output::{Formatter, QuickResult};
use hobbes_engine::{
    standard_rules, ArgumentView, CalculationRegistry, Conclusion, ConfidenceView, Engine, EngineConfig, RuleBase,
    SampleRecord, SimulationRegistry,
};
use std::fs;
use tracing::info;

/// Build the engine an invocation asks for
pub fn build_engine(cli: &Cli, config: &Config) -> Result<Engine> {
    let engine_config = match cli.config.as_ref().or(config.settings.engine.as_ref()) {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };

    let rules = match cli.rules.as_ref().or(config.settings.rules.as_ref()) {
        Some(path) if cli.only_rules => RuleBase::from_file(path)?,
        Some(path) => {
            info!(path = %path.display(), "Loading rule file");
            let contents = fs::read_to_string(path)?;
            standard_rules().extend(RuleBase::builder_from_toml_str(&contents)?).build()?
        }
        None => RuleBase::standard()?,
    };

    Ok(Engine::new(
        rules,
        CalculationRegistry::standard(),
        SimulationRegistry::standard(),
        engine_config,
    )?)
}

/// Run one invocation and return its rendered output
pub fn execute(cli: &Cli, config: &Config, formatter: &Formatter) -> Result<String> {
    let engine = build_engine(cli, config)?;
    let sample = SampleRecord::from_file(&cli.sample)?;
    info!(sample = %cli.sample.display(), name = ?sample.name, "Loaded sample");

    let conclusions: Vec<Conclusion> = if cli.conclusions.is_empty() {
        engine
            .config()
            .conclusions
            .iter()
            .map(|name| Conclusion::new(name.as_str()))
            .collect()
    } else {
        cli.conclusions
            .iter()
            .map(|c| parse_conclusion(c))
            .collect::<Result<_>>()?
    };

    if cli.quick {
        let mut results = Vec::with_capacity(conclusions.len());
        for conclusion in &conclusions {
            let confidence = engine.quick_confidence(&sample, conclusion)?;
            results.push(QuickResult {
                conclusion: conclusion.to_string(),
                confidence: confidence.map(ConfidenceView::from),
            });
        }
        return formatter.format_quick(&results);
    }

    let views: Vec<ArgumentView> = engine
        .explain(&sample, &conclusions)?
        .iter()
        .map(|a| ArgumentView::from_argument(a))
        .collect();
    formatter.format_arguments(&views)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use crate::error::CliError;
    use clap::Parser;
    use std::path::Path;

    const SAMPLE: &str = r#"{
        "name": "core 7",
        "attributes": {
            "depth": [0, 10, 20, 30],
            "Best Age": [50, 400, 300, 900]
        },
        "metadata": { "in ocean": true }
    }"#;

    fn cli(dir: &Path, extra: &[&str]) -> Cli {
        let sample = dir.join("sample.json");
        fs::write(&sample, SAMPLE).unwrap();
        let sample = sample.to_string_lossy().to_string();
        let mut args = vec!["hobbes", "--sample", sample.as_str()];
        args.extend_from_slice(extra);
        Cli::parse_from(args)
    }

    fn text() -> Formatter {
        Formatter::new(OutputFormat::Text, false)
    }

    #[test]
    fn test_default_conclusions() {
        let dir = tempfile::tempdir().unwrap();
        let output = execute(&cli(dir.path(), &[]), &Config::default(), &text()).unwrap();
        assert!(output.contains("Model Prediction"));
        assert!(output.contains("Argument For Need Marine Curve"));
    }

    #[test]
    fn test_named_conclusion() {
        let dir = tempfile::tempdir().unwrap();
        let output = execute(
            &cli(dir.path(), &["--conclusion", "reversal"]),
            &Config::default(),
            &text(),
        )
        .unwrap();
        assert!(output.starts_with("Argument For Reversal"));
        assert!(!output.contains("Need Marine Curve"));
    }

    #[test]
    fn test_quick_json() {
        let dir = tempfile::tempdir().unwrap();
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = execute(
            &cli(dir.path(), &["--quick", "--conclusion", "need marine curve"]),
            &Config::default(),
            &formatter,
        )
        .unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json[0]["conclusion"], "Need Marine Curve");
        assert_eq!(json[0]["confidence"]["direction"], "for");
    }

    #[test]
    fn test_rule_file_extends_standard_rules() {
        let dir = tempfile::tempdir().unwrap();
        let rules = dir.path().join("rules.toml");
        fs::write(
            &rules,
            "[[rule]]\nconclusion = \"deep core\"\nquality = \"sound\"\nrhs = [{ calculate = \"max\", args = [\"depth\"], into = \"bottom\" }, { observe = \">\", args = [\"bottom\", 25] }]\n",
        )
        .unwrap();
        let rules = rules.to_string_lossy().to_string();

        let output = execute(
            &cli(dir.path(), &["--rules", &rules, "--conclusion", "deep core", "--conclusion", "reversal"]),
            &Config::default(),
            &text(),
        )
        .unwrap();
        assert!(output.contains("Argument For Deep Core"));
        assert!(output.contains("Argument For Reversal"));

        let only = execute(
            &cli(dir.path(), &["--rules", &rules, "--only-rules", "--conclusion", "reversal"]),
            &Config::default(),
            &text(),
        )
        .unwrap();
        assert!(only.contains("No evidence about Reversal"));
    }

    #[test]
    fn test_engine_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("engine.toml");
        fs::write(&config, "conclusions = [\"reversal\"]\n").unwrap();
        let config = config.to_string_lossy().to_string();

        let output = execute(&cli(dir.path(), &["--config", &config]), &Config::default(), &text()).unwrap();
        assert!(output.starts_with("Argument For Reversal"));

        fs::write(dir.path().join("bad.toml"), "max_depth = 0\n").unwrap();
        let bad = dir.path().join("bad.toml").to_string_lossy().to_string();
        let result = execute(&cli(dir.path(), &["--config", &bad]), &Config::default(), &text());
        assert!(matches!(result, Err(CliError::Load(_))));
    }

    #[test]
    fn test_missing_sample() {
        let cli = Cli::parse_from(["hobbes", "--sample", "/nonexistent/sample.json"]);
        let result = execute(&cli, &Config::default(), &text());
        assert!(matches!(result, Err(CliError::Load(_))));
    }
}
