//! Named calculation functions
//!
//! Rules and definitions refer to calculations by name. The host registers
//! the functions; [`CalculationRegistry::standard`] provides the set used by
//! the age-model rule base.
//!
//! A calculation returns `None` when its inputs do not support a result
//! (empty series, mismatched lengths, division by zero). That is treated as
//! missing data, never as an error.

use crate::value::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Signature of a registered calculation
pub type CalcFn = dyn Fn(&[Value]) -> Option<Value> + Send + Sync;

/// Name to function table
#[derive(Clone, Default)]
pub struct CalculationRegistry {
    functions: HashMap<String, Arc<CalcFn>>,
}

impl fmt::Debug for CalculationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CalculationRegistry")
            .field("functions", &self.names())
            .finish()
    }
}

impl CalculationRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in numeric calculations
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register("min", |args| fold(args, f64::min));
        registry.register("max", |args| fold(args, f64::max));
        registry.register("mean", |args| {
            let nums = flatten(args)?;
            mean(&nums).map(Value::Number)
        });
        registry.register("count", |args| Some(Value::Number(flatten(args)?.len() as f64)));
        registry.register("slope", |args| {
            let (x, y) = pair(args)?;
            Some(Value::Series(slopes(&x, &y)))
        });
        registry.register("value_at", |args| {
            let [x, y, at] = args else { return None };
            value_at(&x.as_series()?, &y.as_series()?, at.as_number()?).map(Value::Number)
        });
        registry.register("find_angles", |args| {
            let (x, y) = pair(args)?;
            Some(Value::Series(find_angles(&x, &y)))
        });
        registry.register("normalize_angles", |args| {
            let angles = flatten(args)?;
            Some(Value::Series(angles.into_iter().map(normalize_angle).collect()))
        });
        registry.register("mean_squared_error", |args| {
            let (a, b) = pair(args)?;
            mean_squared_error(&a, &b).map(Value::Number)
        });
        registry.register("normalized_error", |args| {
            let (a, b) = pair(args)?;
            let mse = mean_squared_error(&a, &b)?;
            let scale = mean(&a.iter().map(|v| v.abs()).collect::<Vec<_>>())?;
            (scale != 0.0).then(|| Value::Number(mse.sqrt() / scale))
        });
        registry.register("difference", |args| {
            let [a, b] = args else { return None };
            Some(Value::Number(a.as_number()? - b.as_number()?))
        });
        registry.register("ratio", |args| {
            let [a, b] = args else { return None };
            let b = b.as_number()?;
            if b == 0.0 {
                return None;
            }
            Some(Value::Number(a.as_number()? / b))
        });
        registry
    }

    /// Register (or replace) a calculation
    pub fn register<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&[Value]) -> Option<Value> + Send + Sync + 'static,
    {
        self.functions.insert(name.into(), Arc::new(f));
    }

    /// Whether `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Look up a calculation
    pub fn get(&self, name: &str) -> Option<&Arc<CalcFn>> {
        self.functions.get(name)
    }

    /// Sorted registered names
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// All numbers in the arguments, series flattened in order
fn flatten(args: &[Value]) -> Option<Vec<f64>> {
    let mut out = Vec::new();
    for arg in args {
        out.extend(arg.as_series()?);
    }
    Some(out)
}

fn fold(args: &[Value], f: fn(f64, f64) -> f64) -> Option<Value> {
    flatten(args)?.into_iter().reduce(f).map(Value::Number)
}

/// Two equal-length, non-empty series
fn pair(args: &[Value]) -> Option<(Vec<f64>, Vec<f64>)> {
    let [a, b] = args else { return None };
    let (a, b) = (a.as_series()?, b.as_series()?);
    (a.len() == b.len() && !a.is_empty()).then_some((a, b))
}

fn mean(nums: &[f64]) -> Option<f64> {
    (!nums.is_empty()).then(|| nums.iter().sum::<f64>() / nums.len() as f64)
}

/// Slope of each consecutive segment; vertical segments are skipped
pub fn slopes(x: &[f64], y: &[f64]) -> Vec<f64> {
    x.windows(2)
        .zip(y.windows(2))
        .filter(|(xs, _)| xs[1] != xs[0])
        .map(|(xs, ys)| (ys[1] - ys[0]) / (xs[1] - xs[0]))
        .collect()
}

/// Linear interpolation of `y` at `at`; outside the range the nearest
/// segment is extended
pub fn value_at(x: &[f64], y: &[f64], at: f64) -> Option<f64> {
    if x.len() != y.len() || x.is_empty() {
        return None;
    }
    if x.len() == 1 {
        return Some(y[0]);
    }
    let last = x.len() - 2;
    let i = x
        .windows(2)
        .position(|w| at >= w[0].min(w[1]) && at <= w[0].max(w[1]))
        .unwrap_or(if at < x[0] { 0 } else { last });
    let (x0, x1, y0, y1) = (x[i], x[i + 1], y[i], y[i + 1]);
    if x1 == x0 {
        return Some(y0);
    }
    Some(y0 + (at - x0) * (y1 - y0) / (x1 - x0))
}

/// Change in direction, in degrees, at each interior point of the curve
pub fn find_angles(x: &[f64], y: &[f64]) -> Vec<f64> {
    let headings: Vec<f64> = x
        .windows(2)
        .zip(y.windows(2))
        .map(|(xs, ys)| (ys[1] - ys[0]).atan2(xs[1] - xs[0]).to_degrees())
        .collect();
    headings.windows(2).map(|h| normalize_angle(h[1] - h[0])).collect()
}

/// Fold an angle into `[0, 180]`
pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle.rem_euclid(360.0);
    if a > 180.0 {
        360.0 - a
    } else {
        a
    }
}

fn mean_squared_error(a: &[f64], b: &[f64]) -> Option<f64> {
    let squares: Vec<f64> = a.iter().zip(b).map(|(p, q)| (p - q).powi(2)).collect();
    mean(&squares)
}
