//! Per-pass binding environment
//!
//! One [`Environment`] lives for one inference pass over one sample. It
//! resolves names (rule-local bindings first, then definitions, then sample
//! attributes), memoizes every resolved definition and every built argument,
//! and tracks which conclusions are being built so cycles can be reported.
//!
//! Definitions are evaluated in an isolated scope holding only their own
//! parameters, so a memoized definition value never depends on which rule
//! first asked for it.

use crate::argument::Argument;
use crate::calculations::CalculationRegistry;
use crate::definitions::{Definition, Definitions, Resolver, Source};
use crate::error::{EngineError, EngineResult};
use crate::sample::Sample;
use crate::term::Term;
use crate::value::{call_key, Value};
use hobbes_domain::Confidence;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Name resolution and memoization for one inference pass
pub struct Environment<'a> {
    sample: &'a dyn Sample,
    definitions: &'a Definitions,
    calculations: &'a CalculationRegistry,
    scopes: Vec<HashMap<String, Value>>,
    resolved: HashMap<String, Option<Value>>,
    resolving: Vec<String>,
    arguments: HashMap<String, Arc<Argument>>,
    quick: HashMap<String, Option<Confidence>>,
    in_progress: Vec<String>,
}

impl<'a> Environment<'a> {
    /// Fresh environment over a sample
    pub fn new(
        sample: &'a dyn Sample,
        definitions: &'a Definitions,
        calculations: &'a CalculationRegistry,
    ) -> Self {
        Self {
            sample,
            definitions,
            calculations,
            scopes: vec![HashMap::new()],
            resolved: HashMap::new(),
            resolving: Vec::new(),
            arguments: HashMap::new(),
            quick: HashMap::new(),
            in_progress: Vec::new(),
        }
    }

    /// Sample this pass reasons about
    pub fn sample(&self) -> &'a dyn Sample {
        self.sample
    }

    /// Open a scope that inherits every binding of the current one
    pub fn new_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Drop the innermost scope and its bindings
    pub fn leave_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Bind a name in the innermost scope
    pub fn bind(&mut self, name: impl Into<String>, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.into(), value);
        }
    }

    /// Innermost binding of a name
    pub fn binding(&self, name: &str) -> Option<&Value> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Resolve a term; `Ok(None)` means the data is missing
    pub fn resolve(&mut self, term: &Term) -> EngineResult<Option<Value>> {
        match term {
            Term::Literal(value) => Ok(Some(value.clone())),
            Term::Var(name) => self.resolve_name(name),
            Term::Call { name, args } => {
                let Some(values) = self.resolve_all(args)? else {
                    return Ok(None);
                };
                let definitions = self.definitions;
                match definitions.get(name, values.len()) {
                    Some(def) => self.evaluate_definition(def, values),
                    None => Ok(None),
                }
            }
        }
    }

    /// Resolve every term, keeping missing ones as `None`
    pub fn resolve_each(&mut self, terms: &[Term]) -> EngineResult<Vec<Option<Value>>> {
        terms.iter().map(|t| self.resolve(t)).collect()
    }

    /// Resolve every term; `Ok(None)` if any is missing
    pub fn resolve_all(&mut self, terms: &[Term]) -> EngineResult<Option<Vec<Value>>> {
        Ok(self.resolve_each(terms)?.into_iter().collect())
    }

    /// Resolve a bare name: bindings, then definitions, then the sample
    pub fn resolve_name(&mut self, name: &str) -> EngineResult<Option<Value>> {
        if let Some(value) = self.binding(name) {
            return Ok(Some(value.clone()));
        }
        let definitions = self.definitions;
        match definitions.get(name, 0) {
            Some(def) => self.evaluate_definition(def, Vec::new()),
            None => Ok(self.sample.get(name)),
        }
    }

    fn evaluate_definition(&mut self, def: &'a Definition, args: Vec<Value>) -> EngineResult<Option<Value>> {
        let key = call_key(&def.name, &args);
        if let Some(value) = self.resolved.get(&key) {
            return Ok(value.clone());
        }
        if let Some(pos) = self.resolving.iter().position(|k| *k == key) {
            let mut chain = self.resolving[pos..].to_vec();
            chain.push(key);
            warn!(chain = %chain.join(" -> "), "Cyclic definition");
            return Err(EngineError::CyclicDefinition(chain));
        }

        self.resolving.push(key.clone());
        let frame: HashMap<String, Value> = def.params.iter().cloned().zip(args).collect();
        let outer = std::mem::replace(&mut self.scopes, vec![frame]);
        let result = self.run_resolver(&def.resolver);
        self.scopes = outer;
        self.resolving.pop();

        let value = result?;
        debug!(definition = %key, found = value.is_some(), "Resolved definition");
        self.resolved.insert(key, value.clone());
        Ok(value)
    }

    fn run_resolver(&mut self, resolver: &'a Resolver) -> EngineResult<Option<Value>> {
        match resolver {
            Resolver::Literal(value) => Ok(Some(value.clone())),
            Resolver::Lookup(sources) => {
                for source in sources {
                    if let Some(value) = self.read_source(source)? {
                        return Ok(Some(value));
                    }
                }
                Ok(None)
            }
            Resolver::Calc { function, args } => {
                let Some(values) = self.resolve_all(args)? else {
                    return Ok(None);
                };
                self.calculate(function, &values)
            }
        }
    }

    fn read_source(&mut self, source: &Source) -> EngineResult<Option<Value>> {
        match source {
            Source::Metadata(key) => Ok(self.sample.metadata(key)),
            Source::Attribute(name) => Ok(self.sample.get(name)),
            Source::Db { table, field, keys } => {
                let mut pairs = Vec::with_capacity(keys.len());
                for key in keys {
                    match self.resolve_name(key)? {
                        Some(value) => pairs.push((key.clone(), value)),
                        None => return Ok(None),
                    }
                }
                Ok(self.sample.db(table, field, &pairs))
            }
        }
    }

    /// Run a registered calculation
    pub fn calculate(&self, function: &str, args: &[Value]) -> EngineResult<Option<Value>> {
        let f = self
            .calculations
            .get(function)
            .ok_or_else(|| EngineError::UnknownCalculation(function.to_string()))?;
        Ok(f(args))
    }

    /// Argument already built in this pass
    pub fn argument(&self, key: &str) -> Option<Arc<Argument>> {
        self.arguments.get(key).cloned()
    }

    pub(crate) fn remember_argument(&mut self, key: String, argument: Arc<Argument>) {
        self.arguments.insert(key, argument);
    }

    /// Quick confidence already computed in this pass
    pub fn quick_confidence(&self, key: &str) -> Option<Option<Confidence>> {
        self.quick.get(key).copied()
    }

    pub(crate) fn remember_quick(&mut self, key: String, confidence: Option<Confidence>) {
        self.quick.insert(key, confidence);
    }

    /// Number of conclusions currently being built
    pub fn depth(&self) -> usize {
        self.in_progress.len()
    }

    /// Mark a conclusion as being built
    pub(crate) fn enter(&mut self, key: String, limit: usize) -> EngineResult<()> {
        if let Some(pos) = self.in_progress.iter().position(|k| *k == key) {
            let mut chain = self.in_progress[pos..].to_vec();
            chain.push(key);
            warn!(chain = %chain.join(" -> "), "Cyclic conclusion");
            return Err(EngineError::CyclicConclusion(chain));
        }
        if self.in_progress.len() >= limit {
            warn!(conclusion = %key, limit, "Argument depth limit exceeded");
            return Err(EngineError::DepthExceeded { conclusion: key, limit });
        }
        self.in_progress.push(key);
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.in_progress.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::{calc, db, lookup, metadata};
    use crate::sample::SampleRecord;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sample() -> SampleRecord {
        SampleRecord::new()
            .with_attribute("depth", vec![0.0, 10.0, 20.0])
            .with_attribute("Best Age", vec![0.0, 100.0, 300.0])
            .with_metadata("Core Site", "Atlantic")
            .with_metadata("latitude", 10)
            .with_row(
                "temps",
                [("latitude".to_string(), Value::from(10)), ("average".to_string(), Value::from(-3))]
                    .into_iter()
                    .collect(),
            )
    }

    #[test]
    fn test_resolution_order() {
        let sample = sample();
        let mut defs = Definitions::new();
        defs.define("depth", vec![], Resolver::Literal(Value::from("defined"))).unwrap();
        let calcs = CalculationRegistry::standard();
        let mut env = Environment::new(&sample, &defs, &calcs);

        // Definition wins over the sample attribute
        assert_eq!(env.resolve_name("depth").unwrap(), Some(Value::from("defined")));

        // Binding wins over the definition
        env.new_scope();
        env.bind("depth", Value::from(1));
        assert_eq!(env.resolve_name("depth").unwrap(), Some(Value::from(1)));
        env.leave_scope();

        assert_eq!(env.resolve_name("Best Age").unwrap(), Some(Value::Series(vec![0.0, 100.0, 300.0])));
        assert_eq!(env.resolve_name("no such thing").unwrap(), None);
    }

    #[test]
    fn test_inner_scopes_inherit() {
        let sample = SampleRecord::new();
        let defs = Definitions::new();
        let calcs = CalculationRegistry::new();
        let mut env = Environment::new(&sample, &defs, &calcs);

        env.new_scope();
        env.bind("a", Value::from(1));
        env.new_scope();
        env.bind("b", Value::from(2));
        assert_eq!(env.binding("a"), Some(&Value::from(1)));
        env.leave_scope();
        assert_eq!(env.binding("b"), None);
        env.leave_scope();
        assert_eq!(env.binding("a"), None);
    }

    #[test]
    fn test_lookup_sources_in_order() {
        let sample = sample();
        let mut defs = Definitions::new();
        defs.define(
            "average temperature",
            vec![],
            lookup(vec![metadata("average temperature"), db("temps", "average", &["latitude"])]),
        )
        .unwrap();
        defs.define("latitude", vec![], lookup(vec![metadata("latitude")])).unwrap();
        defs.define("core site", vec![], lookup(vec![metadata("Core Site")])).unwrap();
        let calcs = CalculationRegistry::new();
        let mut env = Environment::new(&sample, &defs, &calcs);

        assert_eq!(env.resolve_name("core site").unwrap(), Some(Value::from("Atlantic")));
        assert_eq!(env.resolve_name("average temperature").unwrap(), Some(Value::from(-3)));
    }

    #[test]
    fn test_parametrized_definition() {
        let sample = sample();
        let mut defs = Definitions::new();
        defs.define(
            "model age",
            vec!["at depth".to_string()],
            calc("value_at", vec!["depth".into(), "Best Age".into(), "at depth".into()]),
        )
        .unwrap();
        let calcs = CalculationRegistry::standard();
        let mut env = Environment::new(&sample, &defs, &calcs);

        let at = |d: i32| Term::call("model age", vec![Term::lit(d)]);
        assert_eq!(env.resolve(&at(5)).unwrap(), Some(Value::Number(50.0)));
        assert_eq!(env.resolve(&at(15)).unwrap(), Some(Value::Number(200.0)));
        // Wrong arity is simply undefined
        assert_eq!(env.resolve(&Term::call("model age", vec![])).unwrap(), None);
    }

    #[test]
    fn test_definitions_memoized_per_environment() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut calcs = CalculationRegistry::new();
        calcs.register("counted", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Some(Value::from(7))
        });
        let mut defs = Definitions::new();
        defs.define("seven", vec![], calc("counted", vec![])).unwrap();
        let sample = SampleRecord::new();

        let mut env = Environment::new(&sample, &defs, &calcs);
        env.resolve_name("seven").unwrap();
        env.resolve_name("seven").unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let mut fresh = Environment::new(&sample, &defs, &calcs);
        fresh.resolve_name("seven").unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_missing_input_is_not_an_error() {
        let sample = SampleRecord::new();
        let mut defs = Definitions::new();
        defs.define("min age slope", vec![], calc("min", vec!["no data".into()])).unwrap();
        let calcs = CalculationRegistry::standard();
        let mut env = Environment::new(&sample, &defs, &calcs);

        assert_eq!(env.resolve_name("min age slope").unwrap(), None);
    }

    #[test]
    fn test_cyclic_definition() {
        let sample = SampleRecord::new();
        let mut defs = Definitions::new();
        defs.define("a", vec![], calc("max", vec!["b".into()])).unwrap();
        defs.define("b", vec![], calc("max", vec!["a".into()])).unwrap();
        let calcs = CalculationRegistry::standard();
        let mut env = Environment::new(&sample, &defs, &calcs);

        let err = env.resolve_name("a").unwrap_err();
        assert_eq!(
            err,
            EngineError::CyclicDefinition(vec!["a".to_string(), "b".to_string(), "a".to_string()])
        );
    }

    #[test]
    fn test_unknown_calculation_is_an_error() {
        let sample = SampleRecord::new();
        let mut defs = Definitions::new();
        defs.define("x", vec![], calc("nope", vec![])).unwrap();
        let calcs = CalculationRegistry::new();
        let mut env = Environment::new(&sample, &defs, &calcs);

        assert_eq!(
            env.resolve_name("x").unwrap_err(),
            EngineError::UnknownCalculation("nope".to_string())
        );
    }

    #[test]
    fn test_conclusion_stack() {
        let sample = SampleRecord::new();
        let defs = Definitions::new();
        let calcs = CalculationRegistry::new();
        let mut env = Environment::new(&sample, &defs, &calcs);

        env.enter("a".to_string(), 3).unwrap();
        env.enter("b".to_string(), 3).unwrap();
        assert_eq!(
            env.enter("a".to_string(), 3).unwrap_err(),
            EngineError::CyclicConclusion(vec!["a".to_string(), "b".to_string(), "a".to_string()])
        );
        env.enter("c".to_string(), 3).unwrap();
        assert!(matches!(
            env.enter("d".to_string(), 3),
            Err(EngineError::DepthExceeded { limit: 3, .. })
        ));
        env.leave();
        assert_eq!(env.depth(), 2);
    }
}
