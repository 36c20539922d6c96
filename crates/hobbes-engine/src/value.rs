//! Values resolved from samples, definitions and calculations

use serde::{Deserialize, Serialize};
use std::fmt;

/// A resolved datum
///
/// Deserialized untagged, so sample files can write plain JSON/TOML values:
/// `true`, `-5.2`, `[0.0, 1.5, 3.0]`, `"Atlantic"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Boolean flag
    Bool(bool),
    /// Scalar measurement
    Number(f64),
    /// Ordered measurements, e.g. one per depth
    Series(Vec<f64>),
    /// Free text
    Text(String),
}

impl Value {
    /// Scalar view; single-element series count as scalars
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Series(s) if s.len() == 1 => Some(s[0]),
            _ => None,
        }
    }

    /// Series view; scalars become one-element series
    pub fn as_series(&self) -> Option<Vec<f64>> {
        match self {
            Value::Series(s) => Some(s.clone()),
            Value::Number(n) => Some(vec![*n]),
            _ => None,
        }
    }

    /// Truthiness: booleans as-is, numbers when nonzero, text when non-empty
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => Some(*n != 0.0),
            Value::Text(t) => Some(!t.is_empty()),
            Value::Series(_) => None,
        }
    }

    /// Text view
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(t) => Some(t),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(t) => f.write_str(t),
            Value::Series(s) => {
                let items: Vec<String> = s.iter().map(|n| n.to_string()).collect();
                write!(f, "[{}]", items.join(", "))
            }
        }
    }
}

/// Memo identity of `name` applied to `args`
///
/// Text is quoted so `5` and `"5"` get different keys, as do one `"a, b"`
/// and the pair `"a"`, `"b"`.
pub(crate) fn call_key(name: &str, args: &[Value]) -> String {
    if args.is_empty() {
        return name.to_string();
    }
    let args: Vec<String> = args
        .iter()
        .map(|v| match v {
            Value::Text(t) => format!("{:?}", t),
            other => other.to_string(),
        })
        .collect();
    format!("{}({})", name, args.join(", "))
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(t: &str) -> Self {
        Value::Text(t.to_string())
    }
}

impl From<String> for Value {
    fn from(t: String) -> Self {
        Value::Text(t)
    }
}

impl From<Vec<f64>> for Value {
    fn from(s: Vec<f64>) -> Self {
        Value::Series(s)
    }
}
