//! Rules and their evaluation
//!
//! A rule concludes something from an ordered list of clauses. Clauses run
//! in order because a calculation binds a name that later clauses of the
//! same rule may read. Whether the rule fires depends on its template: an
//! AND rule needs every clause to produce a confidence, an OR rule any one.

use crate::argument::Argument;
use crate::conclusion::{Conclusion, ConclusionPattern};
use crate::engine::{Engine, Mode};
use crate::environment::Environment;
use crate::error::EngineResult;
use crate::observations::Comparison;
use crate::simulations::SimResult;
use crate::term::Term;
use crate::value::Value;
use hobbes_domain::{Confidence, Quality, Template, Validity};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Kind of a rule clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvidenceKind {
    /// Comparison of resolved values
    Observation,
    /// Binds a computed value; lends no confidence
    Calculation,
    /// Statistical test
    Simulation,
    /// Nested argument about another conclusion
    Argument,
}

impl EvidenceKind {
    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            EvidenceKind::Observation => "observation",
            EvidenceKind::Calculation => "calculation",
            EvidenceKind::Simulation => "simulation",
            EvidenceKind::Argument => "argument",
        }
    }
}

/// One clause of a rule body
#[derive(Debug, Clone, PartialEq)]
pub enum Rhs {
    /// Compare resolved values
    Observation {
        /// Operator
        comparison: Comparison,
        /// Operands
        params: Vec<Term>,
    },
    /// Compute a value and bind it for later clauses
    Calculation {
        /// Registered calculation name
        function: String,
        /// Arguments
        params: Vec<Term>,
        /// Name the result is bound to
        var: String,
    },
    /// Run a registered simulation
    Simulation {
        /// Registered simulation name
        name: String,
        /// Arguments
        params: Vec<Term>,
    },
    /// Argue about another conclusion
    Argument {
        /// Conclusion name
        conclusion: String,
        /// Conclusion parameters
        params: Vec<Term>,
    },
}

/// Observation clause
pub fn obs(comparison: Comparison, params: Vec<Term>) -> Rhs {
    Rhs::Observation { comparison, params }
}

/// Calculation clause binding its result to `var`
pub fn calculate(function: impl Into<String>, params: Vec<Term>, var: impl Into<String>) -> Rhs {
    Rhs::Calculation {
        function: function.into(),
        params,
        var: var.into(),
    }
}

/// Simulation clause
pub fn sim(name: impl Into<String>, params: Vec<Term>) -> Rhs {
    Rhs::Simulation {
        name: name.into(),
        params,
    }
}

/// Argument clause
pub fn arg(conclusion: impl Into<String>, params: Vec<Term>) -> Rhs {
    Rhs::Argument {
        conclusion: conclusion.into(),
        params,
    }
}

impl Rhs {
    /// Clause kind
    pub fn kind(&self) -> EvidenceKind {
        match self {
            Rhs::Observation { .. } => EvidenceKind::Observation,
            Rhs::Calculation { .. } => EvidenceKind::Calculation,
            Rhs::Simulation { .. } => EvidenceKind::Simulation,
            Rhs::Argument { .. } => EvidenceKind::Argument,
        }
    }

    /// Operand terms
    pub fn params(&self) -> &[Term] {
        match self {
            Rhs::Observation { params, .. }
            | Rhs::Calculation { params, .. }
            | Rhs::Simulation { params, .. }
            | Rhs::Argument { params, .. } => params,
        }
    }

    /// Clause text with known bindings substituted
    pub fn render(&self, bindings: &[(String, Value)]) -> String {
        let terms: Vec<String> = self.params().iter().map(|t| t.render(bindings)).collect();
        match self {
            Rhs::Observation { comparison, .. } => match terms.as_slice() {
                [a] => format!("{} {}", a, comparison),
                [a, b] => format!("{} {} {}", a, comparison, b),
                _ => format!("{} ({})", comparison, terms.join(", ")),
            },
            Rhs::Calculation { function, var, .. } => {
                format!("calculate {} := {} ({})", var, function, terms.join(", "))
            }
            Rhs::Simulation { name, .. } => format!("simulate {} ({})", name, terms.join(", ")),
            Rhs::Argument { conclusion, .. } if terms.is_empty() => conclusion.clone(),
            Rhs::Argument { conclusion, .. } => format!("{} ({})", conclusion, terms.join(", ")),
        }
    }

    fn evaluate(&self, engine: &Engine, env: &mut Environment<'_>, mode: Mode) -> EngineResult<RhsInstance> {
        let values = env.resolve_each(self.params())?;
        let complete: Option<Vec<Value>> = values.iter().cloned().collect();

        let outcome = match self {
            Rhs::Observation { comparison, .. } => {
                let confidence = complete
                    .and_then(|v| comparison.apply(&v))
                    .map(|applic| Confidence::new(applic, Validity::Accepted));
                Outcome::Observed(confidence)
            }
            Rhs::Calculation { function, var, .. } => {
                let value = match complete {
                    Some(v) => env.calculate(function, &v)?,
                    None => None,
                };
                if let Some(value) = &value {
                    env.bind(var.clone(), value.clone());
                }
                Outcome::Calculated(value)
            }
            Rhs::Simulation { name, .. } => {
                let result = match (mode, complete) {
                    (Mode::Full, Some(v)) => engine.simulate(name, &v)?,
                    _ => None,
                };
                Outcome::Simulated(result)
            }
            Rhs::Argument { conclusion, .. } => match complete {
                Some(v) => {
                    let conclusion = Conclusion::with_params(conclusion.clone(), v);
                    match mode {
                        Mode::Full => {
                            let argument = engine.argue(&conclusion, env)?;
                            Outcome::Argued {
                                confidence: argument.confidence,
                                argument: Some(argument),
                            }
                        }
                        Mode::Quick => Outcome::Argued {
                            confidence: engine.quick(&conclusion, env)?,
                            argument: None,
                        },
                    }
                }
                None => Outcome::Argued {
                    confidence: None,
                    argument: None,
                },
            },
        };

        trace!(clause = %self, kind = self.kind().as_str(), "Evaluated clause");
        Ok(RhsInstance {
            rhs: self.clone(),
            values,
            outcome,
        })
    }
}

impl fmt::Display for Rhs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(&[]))
    }
}

/// What a clause produced
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Observation confidence, `None` if operands were missing or unsuitable
    Observed(Option<Confidence>),
    /// Calculated value, `None` if it could not be computed
    Calculated(Option<Value>),
    /// Simulation result, `None` if skipped or inputs were missing
    Simulated(Option<SimResult>),
    /// Nested argument; in quick mode only the confidence is kept
    Argued {
        /// Confidence of the nested argument
        confidence: Option<Confidence>,
        /// The nested argument itself
        argument: Option<Arc<Argument>>,
    },
}

/// One evaluated clause
#[derive(Debug, Clone)]
pub struct RhsInstance {
    /// The clause as written
    pub rhs: Rhs,
    /// Resolved operand values, `None` where missing
    pub values: Vec<Option<Value>>,
    /// What it produced
    pub outcome: Outcome,
}

impl RhsInstance {
    /// Clause kind
    pub fn kind(&self) -> EvidenceKind {
        self.rhs.kind()
    }

    /// Confidence lent to the rule; calculations lend none
    pub fn confidence(&self) -> Option<Confidence> {
        match &self.outcome {
            Outcome::Observed(confidence) => *confidence,
            Outcome::Calculated(_) => None,
            Outcome::Simulated(result) => result.as_ref().map(|r| r.confidence),
            Outcome::Argued { confidence, .. } => *confidence,
        }
    }

    /// Whether the clause counts towards firing its rule
    ///
    /// A calculation neither blocks an AND rule nor fires an OR rule, so its
    /// validity is the rule's priority.
    pub fn is_valid(&self, priority: bool) -> bool {
        match self.outcome {
            Outcome::Calculated(_) => priority,
            _ => self.confidence().is_some(),
        }
    }

    /// Nested argument, if this clause built one
    pub fn argument(&self) -> Option<&Arc<Argument>> {
        match &self.outcome {
            Outcome::Argued { argument, .. } => argument.as_ref(),
            _ => None,
        }
    }
}

/// Precondition on a rule, checked before any clause runs
#[derive(Debug, Clone, PartialEq)]
pub struct Guard {
    /// Operator
    pub comparison: Comparison,
    /// Operands
    pub params: Vec<Term>,
    /// Run the rule when the comparison does not hold
    pub invert: bool,
}

impl Guard {
    /// Guard that holds when the comparison is true
    pub fn new(comparison: Comparison, params: Vec<Term>) -> Self {
        Self {
            comparison,
            params,
            invert: false,
        }
    }

    /// Same guard, inverted
    pub fn inverted(mut self) -> Self {
        self.invert = !self.invert;
        self
    }

    /// Evaluate in the current scope
    ///
    /// Missing or unsuitable data makes the comparison fail, so an inverted
    /// guard passes.
    pub fn check(&self, env: &mut Environment<'_>) -> EngineResult<bool> {
        let holds = env
            .resolve_all(&self.params)?
            .and_then(|values| self.comparison.apply(&values))
            .is_some_and(|applic| applic.is_true());
        Ok(holds != self.invert)
    }
}

/// A Horn-clause-like rule
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    /// Conclusion the rule argues about
    pub conclusion: ConclusionPattern,
    /// Optional precondition
    pub guard: Option<Guard>,
    /// Ordered clauses
    pub rhs: Vec<Rhs>,
    /// Validity ceilings
    pub quality: Quality,
    /// How clause confidences are unified
    pub template: Template,
}

/// Result of trying to run a rule
#[derive(Debug, Clone)]
pub enum RuleOutcome {
    /// The guard rejected the conclusion
    Unrunnable,
    /// The rule ran; it may or may not have fired
    Ran(RuleInstance),
}

impl RuleOutcome {
    /// The instance, if the rule ran
    pub fn into_instance(self) -> Option<RuleInstance> {
        match self {
            RuleOutcome::Ran(instance) => Some(instance),
            RuleOutcome::Unrunnable => None,
        }
    }
}

impl Rule {
    /// AND rule without a guard
    pub fn new(conclusion: impl Into<ConclusionPattern>, rhs: Vec<Rhs>, quality: impl Into<Quality>) -> Self {
        Self {
            conclusion: conclusion.into(),
            guard: None,
            rhs,
            quality: quality.into(),
            template: Template::default(),
        }
    }

    /// Builder-style template
    pub fn with_template(mut self, template: Template) -> Self {
        self.template = template;
        self
    }

    /// Builder-style guard
    pub fn with_guard(mut self, guard: Guard) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Whether the guard admits `conclusion`; rules without a guard always run
    pub fn can_run(&self, conclusion: &Conclusion, env: &mut Environment<'_>) -> EngineResult<bool> {
        let Some(guard) = &self.guard else {
            return Ok(true);
        };
        env.new_scope();
        for (name, value) in self.conclusion.bindings(conclusion) {
            env.bind(name, value);
        }
        let result = guard.check(env);
        env.leave_scope();
        result
    }

    /// Run every clause against `conclusion`
    pub(crate) fn run(
        self: &Arc<Self>,
        conclusion: &Conclusion,
        engine: &Engine,
        env: &mut Environment<'_>,
        mode: Mode,
    ) -> EngineResult<RuleOutcome> {
        if !self.can_run(conclusion, env)? {
            debug!(rule = %self.conclusion, "Guard rejected conclusion, rule skipped");
            return Ok(RuleOutcome::Unrunnable);
        }

        let bindings = self.conclusion.bindings(conclusion);
        env.new_scope();
        for (name, value) in &bindings {
            env.bind(name.clone(), value.clone());
        }
        let evidence = self.evaluate_clauses(engine, env, mode);
        env.leave_scope();
        let evidence = evidence?;

        let priority = self.template.priority;
        let fired = if priority {
            evidence.iter().all(|e| e.is_valid(priority))
        } else {
            evidence.iter().any(|e| e.is_valid(priority))
        };
        let confidence =
            fired.then(|| self.template.unify(self.quality, evidence.iter().map(RhsInstance::confidence)));

        debug!(
            rule = %self.conclusion,
            conclusion = %conclusion,
            fired,
            confidence = ?confidence.map(|c| c.to_string()),
            "Ran rule"
        );

        Ok(RuleOutcome::Ran(RuleInstance {
            rule: Arc::clone(self),
            conclusion: conclusion.clone(),
            bindings,
            evidence,
            confidence,
        }))
    }

    fn evaluate_clauses(
        &self,
        engine: &Engine,
        env: &mut Environment<'_>,
        mode: Mode,
    ) -> EngineResult<Vec<RhsInstance>> {
        self.rhs.iter().map(|rhs| rhs.evaluate(engine, env, mode)).collect()
    }
}

/// One run of a rule against a concrete conclusion
#[derive(Debug, Clone)]
pub struct RuleInstance {
    /// The rule that ran
    pub rule: Arc<Rule>,
    /// Conclusion it ran against
    pub conclusion: Conclusion,
    /// Conclusion parameter bindings
    pub bindings: Vec<(String, Value)>,
    /// Evaluated clauses, in rule order
    pub evidence: Vec<RhsInstance>,
    /// Unified confidence; `None` if the rule did not fire
    pub confidence: Option<Confidence>,
}

impl RuleInstance {
    /// Whether the rule fired
    pub fn was_run(&self) -> bool {
        self.confidence.is_some()
    }

    /// Rule text: calculations, then the joined clauses, then the conclusion
    pub fn rule_string(&self) -> String {
        let (calcs, clauses): (Vec<&Rhs>, Vec<&Rhs>) = self
            .rule
            .rhs
            .iter()
            .partition(|rhs| rhs.kind() == EvidenceKind::Calculation);

        let mut out = String::new();
        for calc in calcs {
            out.push_str(&calc.render(&self.bindings));
            out.push_str("; ");
        }
        let join = if self.rule.template.priority { " and " } else { " or " };
        let clauses: Vec<String> = clauses.iter().map(|c| c.render(&self.bindings)).collect();
        out.push_str(&clauses.join(join));
        out.push_str(" => ");
        if self.rule.template.flip {
            out.push_str("not ");
        }
        out.push_str(&self.conclusion.to_string());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_clauses() {
        let bindings = vec![("depth".to_string(), Value::Number(12.0))];

        let observe = obs(Comparison::Gt, vec![Term::call("model age", vec!["depth".into()]), "age".into()]);
        assert_eq!(observe.render(&bindings), "model age (12) > age");
        assert_eq!(obs(Comparison::IsTrue, vec!["in ocean".into()]).to_string(), "in ocean is true");

        let calc = calculate("max", vec!["Best Age".into()], "oldest age");
        assert_eq!(calc.to_string(), "calculate oldest age := max (Best Age)");
        assert_eq!(calc.kind(), EvidenceKind::Calculation);

        assert_eq!(arg("hiatus at depth", vec!["depth".into()]).render(&bindings), "hiatus at depth (12)");
        assert_eq!(arg("reversal", vec![]).to_string(), "reversal");
        assert_eq!(sim("increasing trend", vec!["Best Age".into()]).kind().as_str(), "simulation");
    }

    #[test]
    fn test_calculation_validity_follows_priority() {
        let instance = RhsInstance {
            rhs: calculate("max", vec![], "x"),
            values: vec![],
            outcome: Outcome::Calculated(None),
        };
        assert!(instance.is_valid(true));
        assert!(!instance.is_valid(false));
        assert_eq!(instance.confidence(), None);
    }
}
