//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::{Color, Colorize};
use hobbes_engine::{ArgumentView, ConfidenceView, EvidenceView, RuleView};
use serde::Serialize;
use std::fmt::Write;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Confidence of one conclusion from a quick pass
#[derive(Debug, Clone, Serialize)]
pub struct QuickResult {
    /// Conclusion title
    pub conclusion: String,
    /// Confidence, absent without evidence
    pub confidence: Option<ConfidenceView>,
}

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format full arguments.
    pub fn format_arguments(&self, arguments: &[ArgumentView]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(arguments)?),
            OutputFormat::Table => Ok(self.arguments_table(arguments)),
            OutputFormat::Text => Ok(self.arguments_text(arguments)),
        }
    }

    /// Format quick-pass confidences.
    pub fn format_quick(&self, results: &[QuickResult]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(results)?),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Conclusion", "Confidence"]);
                for r in results {
                    builder.push_record([r.conclusion.clone(), describe(r.confidence.as_ref())]);
                }
                Ok(self.finish_table(builder))
            }
            OutputFormat::Text => {
                let lines: Vec<String> = results
                    .iter()
                    .map(|r| format!("{}: {}", r.conclusion, self.confidence(r.confidence.as_ref())))
                    .collect();
                Ok(lines.join("\n"))
            }
        }
    }

    fn arguments_table(&self, arguments: &[ArgumentView]) -> String {
        if arguments.is_empty() {
            return self.colorize("No conclusions examined.", Color::Yellow);
        }

        let mut builder = Builder::default();
        builder.push_record(["Conclusion", "Verdict", "Confidence", "Conflict", "Pro", "Con"]);
        for a in arguments {
            builder.push_record([
                a.conclusion.clone(),
                a.summary.clone(),
                describe(a.confidence.as_ref()),
                if a.conflict { "yes" } else { "no" }.to_string(),
                a.pro_evidence().len().to_string(),
                a.con_evidence().len().to_string(),
            ]);
        }
        self.finish_table(builder)
    }

    fn finish_table(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    fn arguments_text(&self, arguments: &[ArgumentView]) -> String {
        let mut out = String::new();
        for (i, argument) in arguments.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            self.write_argument(&mut out, argument, 0);
        }
        out
    }

    fn write_argument(&self, out: &mut String, argument: &ArgumentView, depth: usize) {
        let pad = "    ".repeat(depth);
        let summary = match &argument.confidence {
            Some(c) => self.colorize(&argument.summary, direction_color(c)),
            None => self.colorize(&argument.summary, Color::Yellow),
        };
        let _ = writeln!(out, "{}{} {}", pad, summary, self.confidence(argument.confidence.as_ref()));
        for rule in &argument.rules {
            self.write_rule(out, rule, depth + 1);
        }
    }

    fn write_rule(&self, out: &mut String, rule: &RuleView, depth: usize) {
        let pad = "    ".repeat(depth);
        let _ = writeln!(out, "{}- {}", pad, rule.summary);
        let _ = writeln!(out, "{}  {}", pad, self.colorize(&rule.rule, Color::BrightBlack));
        for evidence in &rule.evidence {
            match evidence {
                EvidenceView::Observation { summary, confidence, .. }
                | EvidenceView::Simulation { summary, confidence, .. } => {
                    let _ = writeln!(out, "{}  * {} {}", pad, summary, self.confidence(confidence.as_ref()));
                }
                EvidenceView::Calculation { summary, .. } => {
                    let _ = writeln!(out, "{}  * {}", pad, summary);
                }
                EvidenceView::Argument {
                    summary,
                    confidence,
                    argument,
                    ..
                } => match argument {
                    Some(nested) => self.write_argument(out, nested, depth + 1),
                    None => {
                        let _ = writeln!(out, "{}  * {} {}", pad, summary, self.confidence(confidence.as_ref()));
                    }
                },
            }
        }
    }

    fn confidence(&self, confidence: Option<&ConfidenceView>) -> String {
        let text = format!("[{}]", describe(confidence));
        match confidence {
            Some(c) => self.colorize(&text, direction_color(c)),
            None => self.colorize(&text, Color::Yellow),
        }
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: Color) -> String {
        if !self.color_enabled {
            return text.to_string();
        }
        text.color(color).to_string()
    }
}

fn describe(confidence: Option<&ConfidenceView>) -> String {
    confidence.map_or_else(|| "no evidence".to_string(), |c| c.text.clone())
}

fn direction_color(confidence: &ConfidenceView) -> Color {
    match confidence.direction.as_str() {
        "for" => Color::Green,
        "against" => Color::Red,
        _ => Color::Yellow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hobbes_engine::{Conclusion, Engine, SampleRecord};

    fn marine_argument() -> ArgumentView {
        let engine = Engine::standard().unwrap();
        let sample = SampleRecord::new().with_metadata("in ocean", true);
        let argument = engine
            .build_argument(&sample, &Conclusion::new("need marine curve"))
            .unwrap();
        ArgumentView::from_argument(&argument)
    }

    #[test]
    fn test_text_format() {
        let formatter = Formatter::new(OutputFormat::Text, false);
        let output = formatter.format_arguments(&[marine_argument()]).unwrap();
        assert!(output.starts_with("Argument For Need Marine Curve [highly for (accepted)]"));
        assert!(output.contains("in ocean is true => Need Marine Curve"));
        assert!(output.contains("* true is true [highly for (accepted)]"));
    }

    #[test]
    fn test_table_format() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_arguments(&[marine_argument()]).unwrap();
        assert!(output.contains("Verdict"));
        assert!(output.contains("Need Marine Curve"));
    }

    #[test]
    fn test_json_format() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_arguments(&[marine_argument()]).unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json[0]["summary"], "Argument For Need Marine Curve");
        assert_eq!(json[0]["rules"][0]["evidence"][0]["kind"], "observation");
    }

    #[test]
    fn test_empty_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_arguments(&[]).unwrap();
        assert!(output.contains("No conclusions examined"));
    }

    #[test]
    fn test_quick_text() {
        let formatter = Formatter::new(OutputFormat::Text, false);
        let results = vec![QuickResult {
            conclusion: "Reversal".to_string(),
            confidence: None,
        }];
        assert_eq!(formatter.format_quick(&results).unwrap(), "Reversal: [no evidence]");
    }
}
