//! Observation comparisons
//!
//! An observation compares resolved values and reports how strongly the
//! comparison holds as an [`Applicability`]. Plain ordering comparisons are
//! graded by how far apart the operands are: a comparison that barely holds
//! is only partly applicable.

use crate::value::Value;
use hobbes_domain::Applicability;
use std::fmt;
use std::str::FromStr;

const VERY_CLOSE: f64 = 0.05;
const CLOSE: f64 = 0.1;
const CLOSEISH: f64 = 0.2;
const FARISH: f64 = 0.5;
const FAR: f64 = 0.75;

/// Comparison operator of an observation or guard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `~=`: graded closeness of two numbers
    Near,
    /// `within %`: is `b` within fraction `perc` of `a`
    WithinPercent,
    /// `is true`
    IsTrue,
    /// `is the same magnitude as`
    SameMagnitude,
}

impl Comparison {
    /// Every comparison, in symbol-table order
    pub const ALL: [Comparison; 10] = [
        Comparison::Lt,
        Comparison::Le,
        Comparison::Gt,
        Comparison::Ge,
        Comparison::Eq,
        Comparison::Ne,
        Comparison::Near,
        Comparison::WithinPercent,
        Comparison::IsTrue,
        Comparison::SameMagnitude,
    ];

    /// Rule-table symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Comparison::Lt => "<",
            Comparison::Le => "<=",
            Comparison::Gt => ">",
            Comparison::Ge => ">=",
            Comparison::Eq => "==",
            Comparison::Ne => "!=",
            Comparison::Near => "~=",
            Comparison::WithinPercent => "within %",
            Comparison::IsTrue => "is true",
            Comparison::SameMagnitude => "is the same magnitude as",
        }
    }

    /// Parse a rule-table symbol
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.into_iter().find(|c| c.symbol() == s)
    }

    /// Number of operands
    pub fn arity(&self) -> usize {
        match self {
            Comparison::IsTrue => 1,
            Comparison::WithinPercent => 3,
            _ => 2,
        }
    }

    /// Evaluate against resolved operands
    ///
    /// `None` when the operands do not suit the comparison (wrong count,
    /// text where a number is needed, zero reference for `within %`).
    pub fn apply(&self, params: &[Value]) -> Option<Applicability> {
        if params.len() != self.arity() {
            return None;
        }
        match self {
            Comparison::IsTrue => Some(truth(params[0].as_bool()?)),
            Comparison::Eq | Comparison::Ne => {
                let equal = match (params[0].as_number(), params[1].as_number()) {
                    (Some(a), Some(b)) => a == b,
                    _ => params[0] == params[1],
                };
                Some(truth(equal == (*self == Comparison::Eq)))
            }
            _ => {
                let nums = params
                    .iter()
                    .map(Value::as_number)
                    .collect::<Option<Vec<f64>>>()?;
                self.apply_numbers(&nums)
            }
        }
    }

    fn apply_numbers(&self, nums: &[f64]) -> Option<Applicability> {
        let graded = |holds: bool| {
            let diff = graded_difference(nums);
            if holds {
                diff
            } else {
                -diff
            }
        };
        match (self, nums) {
            (Comparison::Lt, [a, b]) => Some(graded(a < b)),
            (Comparison::Le, [a, b]) => Some(graded(a <= b)),
            (Comparison::Gt, [a, b]) => Some(graded(a > b)),
            (Comparison::Ge, [a, b]) => Some(graded(a >= b)),
            (Comparison::Near, [a, b]) => Some(near_eq(*a, *b)),
            (Comparison::WithinPercent, [a, b, perc]) => within_percent(*a, *b, *perc),
            (Comparison::SameMagnitude, [a, b]) => Some(same_magnitude(*a, *b)),
            _ => None,
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Comparison {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Unknown comparison: {}", s))
    }
}

fn truth(holds: bool) -> Applicability {
    if holds {
        Applicability::HIGHLY_FOR
    } else {
        Applicability::HIGHLY_AGAINST
    }
}

/// Mean pairwise distance relative to the operands' total magnitude
///
/// Any zero operand makes the difference 0.
pub fn percent_difference(nums: &[f64]) -> f64 {
    if nums.iter().any(|n| *n == 0.0) {
        return 0.0;
    }
    let divisor: f64 = nums.iter().map(|n| n.abs()).sum();
    let mut total = 0.0;
    let mut count = 0;
    for (i, a) in nums.iter().enumerate() {
        for b in &nums[i + 1..] {
            total += (a - b).abs();
            count += 1;
        }
    }
    if count == 0 {
        return 0.0;
    }
    total / (divisor * count as f64)
}

fn graded_difference(nums: &[f64]) -> Applicability {
    let perc = percent_difference(nums);
    if perc < VERY_CLOSE {
        Applicability::PARTLY_FOR
    } else if perc < CLOSE {
        Applicability::MOSTLY_FOR
    } else {
        Applicability::HIGHLY_FOR
    }
}

/// How nearly equal two numbers are
pub fn near_eq(a: f64, b: f64) -> Applicability {
    let perc = percent_difference(&[a, b]);
    if perc < VERY_CLOSE {
        Applicability::HIGHLY_FOR
    } else if perc < CLOSE {
        Applicability::MOSTLY_FOR
    } else if perc < CLOSEISH {
        Applicability::PARTLY_FOR
    } else if perc < FARISH {
        Applicability::PARTLY_AGAINST
    } else if perc < FAR {
        Applicability::MOSTLY_AGAINST
    } else {
        Applicability::HIGHLY_AGAINST
    }
}

/// Whether `b` is within `perc` (a fraction) of the reference value `a`
///
/// Misses are graded by how far past the tolerance the error lands.
pub fn within_percent(a: f64, b: f64, perc: f64) -> Option<Applicability> {
    if a == 0.0 {
        return None;
    }
    let error = ((a - b) / a).abs();
    let overshoot = error - perc;
    Some(if overshoot <= 0.0 {
        Applicability::HIGHLY_FOR
    } else if overshoot < 0.05 {
        Applicability::MOSTLY_FOR
    } else if overshoot < 0.1 {
        Applicability::PARTLY_AGAINST
    } else if overshoot < 0.3 {
        Applicability::MOSTLY_AGAINST
    } else {
        Applicability::HIGHLY_AGAINST
    })
}

/// Whether two numbers are of similar size, judged on their ratio
pub fn same_magnitude(a: f64, b: f64) -> Applicability {
    if a == b {
        return Applicability::HIGHLY_FOR;
    }
    let ratio = if b != 0.0 { a / b } else { b / a };
    near_eq(ratio * 100.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nums(values: &[f64]) -> Vec<Value> {
        values.iter().map(|v| Value::Number(*v)).collect()
    }

    #[test]
    fn test_symbols_roundtrip() {
        for c in Comparison::ALL {
            assert_eq!(Comparison::parse(c.symbol()), Some(c));
        }
        assert_eq!("within %".parse::<Comparison>(), Ok(Comparison::WithinPercent));
        assert!("=~".parse::<Comparison>().is_err());
    }

    #[test]
    fn test_percent_difference() {
        assert_eq!(percent_difference(&[0.0, 5.0]), 0.0);
        assert_eq!(percent_difference(&[1.0, 3.0]), 0.5);
        assert_eq!(percent_difference(&[-5.0, 5.0]), 1.0);
    }

    #[test]
    fn test_ordering_is_graded() {
        // Any zero operand: difference 0, so only partly
        assert_eq!(Comparison::Lt.apply(&nums(&[-5.0, 0.0])), Some(Applicability::PARTLY_FOR));
        assert_eq!(Comparison::Gt.apply(&nums(&[10.0, 1.0])), Some(Applicability::HIGHLY_FOR));
        assert_eq!(Comparison::Gt.apply(&nums(&[1.0, 10.0])), Some(Applicability::HIGHLY_AGAINST));
        assert_eq!(Comparison::Le.apply(&nums(&[100.0, 115.0])), Some(Applicability::MOSTLY_FOR));
        assert_eq!(Comparison::Ge.apply(&nums(&[100.0, 101.0])), Some(Applicability::PARTLY_AGAINST));
    }

    #[test]
    fn test_equality() {
        assert_eq!(Comparison::Eq.apply(&nums(&[2.0, 2.0])), Some(Applicability::HIGHLY_FOR));
        assert_eq!(
            Comparison::Ne.apply(&[Value::from("a"), Value::from("a")]),
            Some(Applicability::HIGHLY_AGAINST)
        );
        assert_eq!(
            Comparison::Eq.apply(&[Value::from("a"), Value::Number(1.0)]),
            Some(Applicability::HIGHLY_AGAINST)
        );
    }

    #[test]
    fn test_near_eq() {
        assert_eq!(near_eq(0.7, 0.71), Applicability::HIGHLY_FOR);
        assert_eq!(near_eq(1.0, 1.15), Applicability::MOSTLY_FOR);
        assert_eq!(near_eq(1.0, 1.4), Applicability::PARTLY_FOR);
        assert_eq!(near_eq(1.0, 2.5), Applicability::PARTLY_AGAINST);
        assert_eq!(near_eq(1.0, 5.0), Applicability::MOSTLY_AGAINST);
        assert_eq!(near_eq(-1.0, 1.0), Applicability::HIGHLY_AGAINST);
    }

    #[test]
    fn test_within_percent() {
        assert_eq!(within_percent(100.0, 110.0, 0.15), Some(Applicability::HIGHLY_FOR));
        assert_eq!(within_percent(100.0, 118.0, 0.15), Some(Applicability::MOSTLY_FOR));
        assert_eq!(within_percent(100.0, 122.0, 0.15), Some(Applicability::PARTLY_AGAINST));
        assert_eq!(within_percent(100.0, 140.0, 0.15), Some(Applicability::MOSTLY_AGAINST));
        assert_eq!(within_percent(100.0, 200.0, 0.15), Some(Applicability::HIGHLY_AGAINST));
        assert_eq!(within_percent(0.0, 1.0, 0.15), None);
    }

    #[test]
    fn test_is_true_and_same_magnitude() {
        assert_eq!(Comparison::IsTrue.apply(&[Value::Bool(true)]), Some(Applicability::HIGHLY_FOR));
        assert_eq!(Comparison::IsTrue.apply(&[Value::Number(0.0)]), Some(Applicability::HIGHLY_AGAINST));
        assert_eq!(Comparison::IsTrue.apply(&[Value::Series(vec![])]), None);

        assert_eq!(same_magnitude(3.0, 3.0), Applicability::HIGHLY_FOR);
        assert_eq!(same_magnitude(99.0, 100.0), Applicability::HIGHLY_FOR);
        assert_eq!(same_magnitude(1.0, 100.0), Applicability::HIGHLY_AGAINST);
    }

    #[test]
    fn test_unsuitable_operands() {
        assert_eq!(Comparison::Lt.apply(&[Value::from("a"), Value::Number(1.0)]), None);
        assert_eq!(Comparison::Lt.apply(&nums(&[1.0])), None);
        assert_eq!(Comparison::Near.apply(&[Value::Series(vec![1.0, 2.0]), Value::Number(1.0)]), None);
    }
}
