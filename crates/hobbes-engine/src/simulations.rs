//! Simulations: statistical tests that yield a confidence directly
//!
//! A simulation maps a raw statistic onto applicability with five cut points
//! and maps its significance onto validity. Simulations are the expensive
//! part of an argument and are skipped entirely in quick mode.

use crate::value::Value;
use hobbes_domain::{Applicability, Confidence, Validity};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Outcome of one simulation run
#[derive(Debug, Clone, PartialEq)]
pub struct SimResult {
    /// Confidence the simulation lends its rule
    pub confidence: Confidence,
    /// Simulation name
    pub name: String,
    /// One-line description of what was found
    pub description: String,
}

/// Signature of a registered simulation
pub type SimFn = dyn Fn(&[Value]) -> Option<SimResult> + Send + Sync;

/// Name to simulation table
#[derive(Clone, Default)]
pub struct SimulationRegistry {
    simulations: HashMap<String, Arc<SimFn>>,
}

impl fmt::Debug for SimulationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.simulations.keys().collect();
        names.sort();
        f.debug_struct("SimulationRegistry").field("simulations", &names).finish()
    }
}

impl SimulationRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in simulations
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register("increasing trend", increasing_trend);
        registry
    }

    /// Register (or replace) a simulation
    pub fn register<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&[Value]) -> Option<SimResult> + Send + Sync + 'static,
    {
        self.simulations.insert(name.into(), Arc::new(f));
    }

    /// Whether `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.simulations.contains_key(name)
    }

    /// Look up a simulation
    pub fn get(&self, name: &str) -> Option<&Arc<SimFn>> {
        self.simulations.get(name)
    }
}

/// Map a statistic onto applicability
///
/// `cuts` holds the five boundaries between the six applicability ranks,
/// from most against to most for. NaN counts as highly against.
pub fn applicability_from_thresholds(cuts: [f64; 5], value: f64) -> Applicability {
    const RANKS: [Applicability; 6] = [
        Applicability::HIGHLY_AGAINST,
        Applicability::MOSTLY_AGAINST,
        Applicability::PARTLY_AGAINST,
        Applicability::PARTLY_FOR,
        Applicability::MOSTLY_FOR,
        Applicability::HIGHLY_FOR,
    ];
    if value.is_nan() {
        return Applicability::HIGHLY_AGAINST;
    }
    let rank = cuts.iter().take_while(|&&cut| value >= cut).count();
    RANKS[rank]
}

/// Map a significance level (smaller is more significant) onto validity
pub fn validity_from_significance(sig: f64) -> Validity {
    if sig.is_nan() || sig > 0.1 {
        Validity::Plausible
    } else if sig > 0.05 {
        Validity::Probable
    } else if sig > 0.01 {
        Validity::Sound
    } else {
        Validity::Accepted
    }
}

/// Two-sided sign test p-value for `k` successes in `n` fair trials
pub fn sign_test(k: usize, n: usize) -> f64 {
    if n == 0 {
        return f64::NAN;
    }
    let m = k.max(n - k);
    let ln_half_n = n as f64 * 0.5f64.ln();
    let mut ln_choose = 0.0;
    let mut tail = 0.0;
    for i in 0..=n {
        if i > 0 {
            ln_choose += ((n - i + 1) as f64).ln() - (i as f64).ln();
        }
        if i >= m {
            tail += (ln_choose + ln_half_n).exp();
        }
    }
    (2.0 * tail).min(1.0)
}

/// Does the series rise from one point to the next?
///
/// Applicability follows the fraction of rising steps, validity the sign
/// test significance of that fraction. Flat steps are ignored.
fn increasing_trend(args: &[Value]) -> Option<SimResult> {
    let [series] = args else { return None };
    let series = series.as_series()?;
    let steps: Vec<f64> = series
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|d| *d != 0.0)
        .collect();
    if steps.is_empty() {
        return None;
    }
    let rising = steps.iter().filter(|d| **d > 0.0).count();
    let fraction = rising as f64 / steps.len() as f64;
    let p = sign_test(rising, steps.len());

    Some(SimResult {
        confidence: Confidence::new(
            applicability_from_thresholds([0.2, 0.35, 0.5, 0.65, 0.8], fraction),
            validity_from_significance(p),
        ),
        name: "increasing trend".to_string(),
        description: format!(
            "{} of {} steps rise (p = {:.3})",
            rising,
            steps.len(),
            p
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cuts() {
        let cuts = [0.0, 1.0, 2.0, 3.0, 4.0];
        assert_eq!(applicability_from_thresholds(cuts, -1.0), Applicability::HIGHLY_AGAINST);
        assert_eq!(applicability_from_thresholds(cuts, 0.0), Applicability::MOSTLY_AGAINST);
        assert_eq!(applicability_from_thresholds(cuts, 1.5), Applicability::PARTLY_AGAINST);
        assert_eq!(applicability_from_thresholds(cuts, 2.0), Applicability::PARTLY_FOR);
        assert_eq!(applicability_from_thresholds(cuts, 3.9), Applicability::MOSTLY_FOR);
        assert_eq!(applicability_from_thresholds(cuts, 10.0), Applicability::HIGHLY_FOR);
        assert_eq!(applicability_from_thresholds(cuts, f64::NAN), Applicability::HIGHLY_AGAINST);
    }

    #[test]
    fn test_significance() {
        assert_eq!(validity_from_significance(f64::NAN), Validity::Plausible);
        assert_eq!(validity_from_significance(0.2), Validity::Plausible);
        assert_eq!(validity_from_significance(0.07), Validity::Probable);
        assert_eq!(validity_from_significance(0.03), Validity::Sound);
        assert_eq!(validity_from_significance(0.001), Validity::Accepted);
    }

    #[test]
    fn test_sign_test() {
        // 10 of 10: 2 * 0.5^10
        assert!((sign_test(10, 10) - 2.0 / 1024.0).abs() < 1e-12);
        assert!((sign_test(0, 10) - 2.0 / 1024.0).abs() < 1e-12);
        assert_eq!(sign_test(2, 4), 1.0);
        assert!(sign_test(0, 0).is_nan());
    }

    #[test]
    fn test_increasing_trend() {
        let rising = Value::Series((0..12).map(|i| i as f64).collect());
        let result = increasing_trend(&[rising]).unwrap();
        assert_eq!(result.confidence, Confidence::new(Applicability::HIGHLY_FOR, Validity::Accepted));

        let flat = Value::Series(vec![1.0, 1.0, 1.0]);
        assert!(increasing_trend(&[flat]).is_none());

        let falling = Value::Series(vec![5.0, 4.0, 3.0]);
        let result = increasing_trend(&[falling]).unwrap();
        assert_eq!(result.confidence.applic, Applicability::HIGHLY_AGAINST);
        assert_eq!(result.confidence.valid, Validity::Plausible);
    }
}
