//! Display-ready views of arguments
//!
//! Pure transformation of an [`Argument`] tree into serializable records,
//! rules ordered strongest support first. Nothing is recomputed here: every
//! confidence shown is the one the engine produced.

use crate::argument::Argument;
use crate::rules::{Outcome, Rhs, RhsInstance, RuleInstance};
use crate::term::Term;
use crate::value::Value;
use hobbes_domain::Confidence;
use serde::Serialize;

/// A confidence spelled out
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfidenceView {
    /// `for`, `against`, or empty for nil
    pub direction: String,
    /// `partly`, `mostly`, `highly`, or empty for nil
    pub level: String,
    /// Validity name
    pub validity: String,
    /// Whether the confidence supports its conclusion
    pub is_true: bool,
    /// Compact form, e.g. `mostly for (sound)`
    pub text: String,
}

impl From<Confidence> for ConfidenceView {
    fn from(c: Confidence) -> Self {
        Self {
            direction: c.direction_str().to_string(),
            level: c.applic.level_str().to_string(),
            validity: c.valid.to_string(),
            is_true: c.is_true(),
            text: c.to_string(),
        }
    }
}

/// One argument and the rules behind it
#[derive(Debug, Clone, Serialize)]
pub struct ArgumentView {
    /// Conclusion title, e.g. `Hiatus At Depth: 12`
    pub conclusion: String,
    /// One-line verdict, e.g. `Conflicted Argument Against Model Prediction`
    pub summary: String,
    /// Combined confidence; absent without evidence
    pub confidence: Option<ConfidenceView>,
    /// Some rule was more valid than the combined result
    pub conflict: bool,
    /// Fired rules, strongest support first
    pub rules: Vec<RuleView>,
}

/// One fired rule
#[derive(Debug, Clone, Serialize)]
pub struct RuleView {
    /// Rule text: calculations, clauses, conclusion
    pub rule: String,
    /// e.g. `highly applicable, accepted evidence for Reversal`
    pub summary: String,
    /// Confidence the rule contributed
    pub confidence: Option<ConfidenceView>,
    /// Every clause, in rule order
    pub evidence: Vec<EvidenceView>,
}

/// One clause, tagged by kind
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EvidenceView {
    /// Comparison of resolved values
    Observation {
        /// Clause as written
        clause: String,
        /// Clause with values, or why it could not be evaluated
        summary: String,
        /// Observation confidence
        confidence: Option<ConfidenceView>,
    },
    /// Computed binding
    Calculation {
        /// Clause as written
        clause: String,
        /// Bound value
        summary: String,
    },
    /// Statistical test
    Simulation {
        /// Clause as written
        clause: String,
        /// Simulation description
        summary: String,
        /// Simulation confidence
        confidence: Option<ConfidenceView>,
    },
    /// Nested argument
    Argument {
        /// Clause as written
        clause: String,
        /// Verdict of the nested argument
        summary: String,
        /// Nested confidence
        confidence: Option<ConfidenceView>,
        /// The nested argument, when fully built
        argument: Option<Box<ArgumentView>>,
    },
}

impl ArgumentView {
    /// Build the view of an argument and everything under it
    pub fn from_argument(argument: &Argument) -> Self {
        let conclusion = argument.conclusion.to_string();
        Self {
            summary: verdict(&conclusion, argument.confidence, argument.conflict),
            confidence: argument.confidence.map(ConfidenceView::from),
            conflict: argument.conflict,
            rules: argument.sorted_evidence().into_iter().map(RuleView::from_instance).collect(),
            conclusion,
        }
    }

    /// Rules supporting the conclusion
    pub fn pro_evidence(&self) -> Vec<&RuleView> {
        self.rules.iter().filter(|r| r.supports()).collect()
    }

    /// Rules opposing the conclusion
    pub fn con_evidence(&self) -> Vec<&RuleView> {
        self.rules.iter().filter(|r| r.opposes()).collect()
    }

    /// Every rule, strongest support first
    pub fn all_evidence(&self) -> Vec<&RuleView> {
        self.rules.iter().collect()
    }
}

impl RuleView {
    /// Build the view of one fired rule
    pub fn from_instance(instance: &RuleInstance) -> Self {
        let summary = match instance.confidence {
            Some(c) if !c.is_nil() => format!(
                "{} evidence {} {}",
                c.level_str(),
                c.direction_str(),
                instance.conclusion
            ),
            _ => format!("no evidence either way on {}", instance.conclusion),
        };
        Self {
            rule: instance.rule_string(),
            summary,
            confidence: instance.confidence.map(ConfidenceView::from),
            evidence: instance
                .evidence
                .iter()
                .map(|e| EvidenceView::from_instance(e, &instance.bindings))
                .collect(),
        }
    }

    fn supports(&self) -> bool {
        self.confidence.as_ref().is_some_and(|c| c.is_true)
    }

    fn opposes(&self) -> bool {
        self.confidence.as_ref().is_some_and(|c| c.direction == "against")
    }
}

impl EvidenceView {
    /// Build the view of one evaluated clause
    pub fn from_instance(instance: &RhsInstance, bindings: &[(String, Value)]) -> Self {
        let clause = instance.rhs.render(bindings);
        match &instance.outcome {
            Outcome::Observed(confidence) => {
                let summary = match confidence {
                    None if instance.values.iter().any(Option::is_none) => "Input Data Missing".to_string(),
                    None => "Operands cannot be compared".to_string(),
                    Some(c) => {
                        let negation = if c.is_true() { "" } else { "not " };
                        format!("{}{}", negation, with_values(&instance.rhs, &instance.values))
                    }
                };
                EvidenceView::Observation {
                    clause,
                    summary,
                    confidence: confidence.map(ConfidenceView::from),
                }
            }
            Outcome::Calculated(value) => {
                let var = match &instance.rhs {
                    Rhs::Calculation { var, .. } => var.as_str(),
                    _ => "value",
                };
                EvidenceView::Calculation {
                    clause,
                    summary: match value {
                        Some(v) => format!("{} = {}", var, v),
                        None => format!("{} could not be calculated", var),
                    },
                }
            }
            Outcome::Simulated(result) => EvidenceView::Simulation {
                clause,
                summary: match result {
                    Some(r) => r.description.clone(),
                    None => "Simulation not run".to_string(),
                },
                confidence: result.as_ref().map(|r| ConfidenceView::from(r.confidence)),
            },
            Outcome::Argued { confidence, argument } => {
                let nested = argument.as_ref().map(|a| Box::new(ArgumentView::from_argument(a)));
                let summary = match &nested {
                    Some(view) => view.summary.clone(),
                    None => verdict(&clause, *confidence, false),
                };
                EvidenceView::Argument {
                    clause,
                    summary,
                    confidence: confidence.map(ConfidenceView::from),
                    argument: nested,
                }
            }
        }
    }
}

/// `[Conflicted ]Argument For|Against <conclusion>`
fn verdict(conclusion: &str, confidence: Option<Confidence>, conflict: bool) -> String {
    match confidence {
        None => format!("No evidence about {}", conclusion),
        Some(c) => format!(
            "{}Argument {} {}",
            if conflict { "Conflicted " } else { "" },
            if c.is_true() { "For" } else { "Against" },
            conclusion
        ),
    }
}

/// Clause text with each resolved name's value substituted in
fn with_values(rhs: &Rhs, values: &[Option<Value>]) -> String {
    let bindings: Vec<(String, Value)> = rhs
        .params()
        .iter()
        .zip(values)
        .filter_map(|(term, value)| match (term, value) {
            (Term::Var(name), Some(v)) => Some((name.clone(), v.clone())),
            _ => None,
        })
        .collect();
    rhs.render(&bindings)
}
