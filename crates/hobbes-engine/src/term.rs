//! Terms: the operands written in rules and definitions

use crate::value::Value;
use std::fmt;

/// An operand before resolution
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    /// A constant
    Literal(Value),
    /// A name resolved through the environment
    Var(String),
    /// A parametrized name, e.g. `(model age, depth)`
    Call {
        /// Definition name
        name: String,
        /// Argument terms, bound to the definition's parameters by position
        args: Vec<Term>,
    },
}

impl Term {
    /// Name reference
    pub fn var(name: impl Into<String>) -> Self {
        Term::Var(name.into())
    }

    /// Constant
    pub fn lit(value: impl Into<Value>) -> Self {
        Term::Literal(value.into())
    }

    /// Parametrized name reference
    pub fn call(name: impl Into<String>, args: Vec<Term>) -> Self {
        Term::Call {
            name: name.into(),
            args,
        }
    }

    /// Render with known bindings substituted for names
    pub fn render(&self, bindings: &[(String, Value)]) -> String {
        match self {
            Term::Literal(v) => v.to_string(),
            Term::Var(name) => bindings
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.to_string())
                .unwrap_or_else(|| name.clone()),
            Term::Call { name, args } => {
                let args: Vec<String> = args.iter().map(|a| a.render(bindings)).collect();
                format!("{} ({})", name, args.join(", "))
            }
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(&[]))
    }
}

impl From<&str> for Term {
    fn from(name: &str) -> Self {
        Term::var(name)
    }
}

impl From<String> for Term {
    fn from(name: String) -> Self {
        Term::Var(name)
    }
}

impl From<f64> for Term {
    fn from(n: f64) -> Self {
        Term::lit(n)
    }
}

impl From<i32> for Term {
    fn from(n: i32) -> Self {
        Term::lit(n)
    }
}

impl From<bool> for Term {
    fn from(b: bool) -> Self {
        Term::lit(b)
    }
}

impl From<Value> for Term {
    fn from(v: Value) -> Self {
        Term::Literal(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        let term = Term::call("model age", vec!["at depth".into()]);
        assert_eq!(term.to_string(), "model age (at depth)");

        let bindings = vec![("at depth".to_string(), Value::Number(12.5))];
        assert_eq!(term.render(&bindings), "model age (12.5)");
        assert_eq!(Term::from(0).to_string(), "0");
    }
}
