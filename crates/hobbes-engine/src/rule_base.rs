//! The rule base: every rule and definition an engine reasons with
//!
//! Built once through [`RuleBaseBuilder`] (in code) or the TOML loader and
//! treated as immutable afterwards.

use crate::calculations::CalculationRegistry;
use crate::conclusion::{Conclusion, ConclusionPattern};
use crate::definitions::{Definitions, Resolver};
use crate::error::{EngineError, EngineResult};
use crate::observations::Comparison;
use crate::rules::{arg, Rhs, Rule};
use crate::simulations::SimulationRegistry;
use crate::term::Term;
use hobbes_domain::Quality;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::warn;

/// Immutable set of rules and definitions
#[derive(Debug, Clone, Default)]
pub struct RuleBase {
    rules: Vec<Arc<Rule>>,
    definitions: Definitions,
}

impl RuleBase {
    /// Start building a rule base
    pub fn builder() -> RuleBaseBuilder {
        RuleBaseBuilder::default()
    }

    /// All rules, in the order they were added
    pub fn rules(&self) -> &[Arc<Rule>] {
        &self.rules
    }

    /// All definitions
    pub fn definitions(&self) -> &Definitions {
        &self.definitions
    }

    /// Rules arguing about `conclusion`
    pub fn matching<'a>(&'a self, conclusion: &'a Conclusion) -> impl Iterator<Item = &'a Arc<Rule>> + 'a {
        self.rules.iter().filter(move |r| r.conclusion.matches(conclusion))
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether there are no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Check every name the rule base uses against the host registries
    ///
    /// Arguments about conclusions no rule concludes are allowed (they simply
    /// find no evidence) but logged.
    pub fn validate(
        &self,
        calculations: &CalculationRegistry,
        simulations: &SimulationRegistry,
    ) -> EngineResult<()> {
        for def in self.definitions.iter() {
            if let Resolver::Calc { function, .. } = &def.resolver {
                if !calculations.contains(function) {
                    return Err(EngineError::UnknownCalculation(function.clone()));
                }
            }
        }

        let concluded: HashSet<(&str, usize)> = self
            .rules
            .iter()
            .map(|r| (r.conclusion.name.as_str(), r.conclusion.params.len()))
            .collect();

        for rule in &self.rules {
            let name = rule.conclusion.to_string();

            let mut seen = HashSet::new();
            if let Some(dup) = rule.conclusion.params.iter().find(|p| !seen.insert(p.as_str())) {
                return Err(EngineError::Config(format!(
                    "Rule '{}' binds parameter '{}' twice",
                    name, dup
                )));
            }

            if let Some(guard) = &rule.guard {
                check_arity(&name, guard.comparison, guard.params.len())?;
            }

            for rhs in &rule.rhs {
                match rhs {
                    Rhs::Observation { comparison, params } => {
                        check_arity(&name, *comparison, params.len())?;
                    }
                    Rhs::Calculation { function, .. } => {
                        if !calculations.contains(function) {
                            return Err(EngineError::UnknownCalculation(function.clone()));
                        }
                    }
                    Rhs::Simulation { name: sim, .. } => {
                        if !simulations.contains(sim) {
                            return Err(EngineError::UnknownSimulation(sim.clone()));
                        }
                    }
                    Rhs::Argument { conclusion, params } => {
                        if !concluded.contains(&(conclusion.as_str(), params.len())) {
                            warn!(rule = %name, conclusion = %conclusion, "No rule concludes argued conclusion");
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

fn check_arity(rule: &str, comparison: Comparison, found: usize) -> EngineResult<()> {
    if comparison.arity() != found {
        return Err(EngineError::InvalidArity {
            rule: rule.to_string(),
            comparison: comparison.symbol().to_string(),
            expected: comparison.arity(),
            found,
        });
    }
    Ok(())
}

/// Collects rules and definitions, then freezes them into a [`RuleBase`]
///
/// Errors (duplicate definitions) are collected and reported by
/// [`build`](Self::build), so definitions can be chained freely.
#[derive(Debug, Default)]
pub struct RuleBaseBuilder {
    rules: Vec<Rule>,
    definitions: Definitions,
    errors: Vec<EngineError>,
}

impl RuleBaseBuilder {
    /// Define a name without parameters
    pub fn define(self, name: &str, resolver: Resolver) -> Self {
        self.define_with(name, &[], resolver)
    }

    /// Define a parametrized name
    pub fn define_with(mut self, name: &str, params: &[&str], resolver: Resolver) -> Self {
        let params = params.iter().map(|p| p.to_string()).collect();
        if let Err(e) = self.definitions.define(name, params, resolver) {
            self.errors.push(e);
        }
        self
    }

    /// Add a rule
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Add a rule `use model <model>` that rests on an assumption holding
    pub fn assumption(
        self,
        model: &str,
        assumption: &str,
        params: Vec<Term>,
        quality: impl Into<Quality>,
    ) -> Self {
        let conclusion = ConclusionPattern::new(format!("use model {}", model), &[]);
        self.rule(Rule::new(conclusion, vec![arg(assumption, params)], quality))
    }

    /// Merge another builder's rules and definitions into this one
    pub fn extend(mut self, other: RuleBaseBuilder) -> Self {
        self.errors.extend(other.errors);
        for def in other.definitions.iter() {
            if let Err(e) = self
                .definitions
                .define(def.name.clone(), def.params.clone(), def.resolver.clone())
            {
                self.errors.push(e);
            }
        }
        self.rules.extend(other.rules);
        self
    }

    /// Freeze into a rule base; fails on the first recorded error
    pub fn build(self) -> EngineResult<RuleBase> {
        if let Some(err) = self.errors.into_iter().next() {
            return Err(err);
        }
        Ok(RuleBase {
            rules: self.rules.into_iter().map(Arc::new).collect(),
            definitions: self.definitions,
        })
    }
}
