//! Conclusions and the patterns rules are written against

use crate::value::{call_key, Value};
use std::fmt;

/// A proposition to argue about, with concrete parameter values
#[derive(Debug, Clone, PartialEq)]
pub struct Conclusion {
    /// Conclusion name, e.g. `hiatus at depth`
    pub name: String,
    /// Concrete parameter values
    pub params: Vec<Value>,
}

impl Conclusion {
    /// Unparametrized conclusion
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_params(name, Vec::new())
    }

    /// Parametrized conclusion
    pub fn with_params(name: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    /// Identity used for memoization and cycle detection
    pub fn key(&self) -> String {
        call_key(&self.name, &self.params)
    }
}

/// Title case with parameters after a colon: `Hiatus At Depth: 12, 3400`
impl fmt::Display for Conclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title: Vec<String> = self.name.split_whitespace().map(capitalize).collect();
        f.write_str(&title.join(" "))?;
        if !self.params.is_empty() {
            let params: Vec<String> = self.params.iter().map(Value::to_string).collect();
            write!(f, ": {}", params.join(", "))?;
        }
        Ok(())
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

impl From<&str> for Conclusion {
    fn from(name: &str) -> Self {
        Conclusion::new(name)
    }
}

/// The conclusion side of a rule: a name and parameter names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConclusionPattern {
    /// Conclusion name
    pub name: String,
    /// Parameter names bound from the conclusion's values
    pub params: Vec<String>,
}

impl ConclusionPattern {
    /// Create a pattern
    pub fn new(name: impl Into<String>, params: &[&str]) -> Self {
        Self {
            name: name.into(),
            params: params.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Whether a rule with this pattern argues about `conclusion`
    pub fn matches(&self, conclusion: &Conclusion) -> bool {
        self.name == conclusion.name && self.params.len() == conclusion.params.len()
    }

    /// Parameter bindings for a matching conclusion
    pub fn bindings(&self, conclusion: &Conclusion) -> Vec<(String, Value)> {
        self.params
            .iter()
            .cloned()
            .zip(conclusion.params.iter().cloned())
            .collect()
    }
}

impl fmt::Display for ConclusionPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.params.is_empty() {
            write!(f, " ({})", self.params.join(", "))?;
        }
        Ok(())
    }
}

impl From<&str> for ConclusionPattern {
    fn from(name: &str) -> Self {
        ConclusionPattern::new(name, &[])
    }
}
