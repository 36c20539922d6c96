//! Inference engine

use crate::argument::Argument;
use crate::calculations::CalculationRegistry;
use crate::conclusion::Conclusion;
use crate::config::EngineConfig;
use crate::environment::Environment;
use crate::error::{EngineError, EngineResult};
use crate::rule_base::RuleBase;
use crate::rules::RuleInstance;
use crate::sample::Sample;
use crate::simulations::{SimResult, SimulationRegistry};
use crate::value::Value;
use hobbes_domain::Confidence;
use std::sync::Arc;
use tracing::{debug, info};

/// Whether simulations run while arguing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Full,
    Quick,
}

/// Builds arguments for conclusions about samples
///
/// The engine holds only read-only state: the rule base, the host's
/// calculation and simulation registries, and configuration. Every pass
/// over a sample gets its own [`Environment`], so one engine can serve
/// passes over different samples from several threads.
///
/// # Examples
///
/// ```
/// use hobbes_engine::{Conclusion, Engine, SampleRecord};
///
/// let engine = Engine::standard().unwrap();
/// let sample = SampleRecord::new()
///     .with_attribute("depth", vec![0.0, 10.0, 20.0, 30.0])
///     .with_attribute("Best Age", vec![50.0, 400.0, 300.0, 900.0]);
///
/// let argument = engine.build_argument(&sample, &Conclusion::new("reversal")).unwrap();
/// assert!(argument.is_true());
/// ```
#[derive(Debug)]
pub struct Engine {
    rules: RuleBase,
    calculations: CalculationRegistry,
    simulations: SimulationRegistry,
    config: EngineConfig,
}

impl Engine {
    /// Create an engine, validating the rule base against the registries
    pub fn new(
        rules: RuleBase,
        calculations: CalculationRegistry,
        simulations: SimulationRegistry,
        config: EngineConfig,
    ) -> EngineResult<Self> {
        config.validate()?;
        rules.validate(&calculations, &simulations)?;
        info!(
            rules = rules.len(),
            definitions = rules.definitions().len(),
            "Engine ready"
        );
        Ok(Self {
            rules,
            calculations,
            simulations,
            config,
        })
    }

    /// Engine over the built-in rule base and registries
    pub fn standard() -> EngineResult<Self> {
        Self::new(
            RuleBase::standard()?,
            CalculationRegistry::standard(),
            SimulationRegistry::standard(),
            EngineConfig::default(),
        )
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Rule base
    pub fn rules(&self) -> &RuleBase {
        &self.rules
    }

    /// Fresh environment for one pass over `sample`
    pub fn environment<'a>(&'a self, sample: &'a dyn Sample) -> Environment<'a> {
        Environment::new(sample, self.rules.definitions(), &self.calculations)
    }

    /// Build the argument for one conclusion in a fresh environment
    pub fn build_argument(&self, sample: &dyn Sample, conclusion: &Conclusion) -> EngineResult<Arc<Argument>> {
        let mut env = self.environment(sample);
        self.build_argument_in(conclusion, &mut env)
    }

    /// Build the argument for one conclusion in an existing environment
    ///
    /// Arguments already built in `env` are reused.
    pub fn build_argument_in(
        &self,
        conclusion: &Conclusion,
        env: &mut Environment<'_>,
    ) -> EngineResult<Arc<Argument>> {
        let argument = self.argue(conclusion, env)?;
        info!(
            conclusion = %conclusion,
            confidence = %describe(argument.confidence),
            rules = argument.evidence.len(),
            conflict = argument.conflict,
            "Built argument"
        );
        Ok(argument)
    }

    /// Build arguments for several conclusions, sharing one environment
    pub fn explain(&self, sample: &dyn Sample, conclusions: &[Conclusion]) -> EngineResult<Vec<Arc<Argument>>> {
        let mut env = self.environment(sample);
        conclusions
            .iter()
            .map(|c| self.build_argument_in(c, &mut env))
            .collect()
    }

    /// Build arguments for the configured top-level conclusions
    pub fn explain_ages(&self, sample: &dyn Sample) -> EngineResult<Vec<Arc<Argument>>> {
        let conclusions: Vec<Conclusion> = self
            .config
            .conclusions
            .iter()
            .map(|name| Conclusion::new(name.as_str()))
            .collect();
        self.explain(sample, &conclusions)
    }

    /// Confidence in a conclusion without running simulations
    pub fn quick_confidence(&self, sample: &dyn Sample, conclusion: &Conclusion) -> EngineResult<Option<Confidence>> {
        let mut env = self.environment(sample);
        let confidence = self.quick(conclusion, &mut env)?;
        info!(conclusion = %conclusion, confidence = %describe(confidence), "Quick confidence");
        Ok(confidence)
    }

    /// Build or reuse the argument for `conclusion` within one pass
    ///
    /// Rules run on top of the caller's scope stack, so a sub-rule can read
    /// names the calling rule bound. The memo is keyed by conclusion alone:
    /// a later caller with different bindings gets the first caller's result.
    pub(crate) fn argue(&self, conclusion: &Conclusion, env: &mut Environment<'_>) -> EngineResult<Arc<Argument>> {
        let key = conclusion.key();
        if self.config.memoize_arguments {
            if let Some(argument) = env.argument(&key) {
                debug!(conclusion = %key, "Reusing argument");
                return Ok(argument);
            }
        }

        env.enter(key.clone(), self.config.max_depth)?;
        let runs = self.run_rules(conclusion, env, Mode::Full);
        env.leave();

        let argument = Arc::new(Argument::new(conclusion.clone(), runs?));
        if self.config.memoize_arguments {
            env.remember_argument(key, Arc::clone(&argument));
        }
        Ok(argument)
    }

    pub(crate) fn quick(&self, conclusion: &Conclusion, env: &mut Environment<'_>) -> EngineResult<Option<Confidence>> {
        let key = conclusion.key();
        if self.config.memoize_arguments {
            if let Some(argument) = env.argument(&key) {
                return Ok(argument.confidence);
            }
            if let Some(confidence) = env.quick_confidence(&key) {
                return Ok(confidence);
            }
        }

        env.enter(key.clone(), self.config.max_depth)?;
        let runs = self.run_rules(conclusion, env, Mode::Quick);
        env.leave();

        let confidence = Argument::new(conclusion.clone(), runs?).confidence;
        if self.config.memoize_arguments {
            env.remember_quick(key, confidence);
        }
        Ok(confidence)
    }

    pub(crate) fn simulate(&self, name: &str, args: &[Value]) -> EngineResult<Option<SimResult>> {
        let f = self
            .simulations
            .get(name)
            .ok_or_else(|| EngineError::UnknownSimulation(name.to_string()))?;
        Ok(f(args))
    }

    fn run_rules(
        &self,
        conclusion: &Conclusion,
        env: &mut Environment<'_>,
        mode: Mode,
    ) -> EngineResult<Vec<RuleInstance>> {
        let mut runs = Vec::new();
        for rule in self.rules.matching(conclusion) {
            if let Some(instance) = rule.run(conclusion, self, env, mode)?.into_instance() {
                runs.push(instance);
            }
        }
        Ok(runs)
    }
}

fn describe(confidence: Option<Confidence>) -> String {
    confidence.map_or_else(|| "no evidence".to_string(), |c| c.to_string())
}
