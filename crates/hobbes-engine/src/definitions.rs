//! Named quantities and how to compute them
//!
//! A definition tells the environment how to produce a value the first time
//! a name is requested: read it from the sample, call a calculation, or use
//! a constant. Definitions may take positional parameters, so
//! `(model age, at depth)` can be instantiated once per concrete depth.

use crate::error::{EngineError, EngineResult};
use crate::term::Term;
use crate::value::Value;
use std::collections::HashMap;

/// Where a lookup reads from
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    /// Sample metadata key
    Metadata(String),
    /// Sample attribute
    Attribute(String),
    /// Reference table row matched on the values of `keys`
    Db {
        /// Table name
        table: String,
        /// Column to return
        field: String,
        /// Names whose resolved values select the row; each is also the column name
        keys: Vec<String>,
    },
}

/// How a definition computes its value
#[derive(Debug, Clone, PartialEq)]
pub enum Resolver {
    /// First source that yields data
    Lookup(Vec<Source>),
    /// Named calculation over resolved arguments
    Calc {
        /// Registered calculation name
        function: String,
        /// Argument terms
        args: Vec<Term>,
    },
    /// Constant
    Literal(Value),
}

/// A named resolver
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    /// Defined name
    pub name: String,
    /// Positional parameter names
    pub params: Vec<String>,
    /// How the value is computed
    pub resolver: Resolver,
}

/// All definitions of a rule base, keyed by name and arity
#[derive(Debug, Clone, Default)]
pub struct Definitions {
    by_key: HashMap<(String, usize), Definition>,
}

impl Definitions {
    /// Empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a definition; a name may be defined once per arity
    pub fn define(
        &mut self,
        name: impl Into<String>,
        params: Vec<String>,
        resolver: Resolver,
    ) -> EngineResult<()> {
        let name = name.into();
        let key = (name.clone(), params.len());
        if self.by_key.contains_key(&key) {
            return Err(EngineError::DuplicateDefinition {
                name,
                arity: params.len(),
            });
        }
        self.by_key.insert(
            key,
            Definition {
                name,
                params,
                resolver,
            },
        );
        Ok(())
    }

    /// Definition of `name` taking `arity` parameters
    pub fn get(&self, name: &str, arity: usize) -> Option<&Definition> {
        self.by_key.get(&(name.to_string(), arity))
    }

    /// Every definition, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &Definition> {
        self.by_key.values()
    }

    /// Number of definitions
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    /// Whether there are no definitions
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

/// `Lookup` over the given sources
pub fn lookup(sources: Vec<Source>) -> Resolver {
    Resolver::Lookup(sources)
}

/// `Calc` of a registered calculation
pub fn calc(function: impl Into<String>, args: Vec<Term>) -> Resolver {
    Resolver::Calc {
        function: function.into(),
        args,
    }
}

/// Metadata source
pub fn metadata(key: impl Into<String>) -> Source {
    Source::Metadata(key.into())
}

/// Attribute source
pub fn attribute(name: impl Into<String>) -> Source {
    Source::Attribute(name.into())
}

/// Reference table source
pub fn db(table: impl Into<String>, field: impl Into<String>, keys: &[&str]) -> Source {
    Source::Db {
        table: table.into(),
        field: field.into(),
        keys: keys.iter().map(|k| k.to_string()).collect(),
    }
}
