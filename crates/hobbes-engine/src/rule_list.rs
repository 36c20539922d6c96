//! Built-in rule base for age-depth models
//!
//! Arguments about whether an age model can be trusted, whether a marine
//! calibration curve is needed, and how the Bacon age modeller should be
//! configured. Only standard calculations and simulations are used, so any
//! sample with `depth` and `Best Age` series can be examined.

use crate::conclusion::ConclusionPattern;
use crate::definitions::{calc, db, lookup, metadata, Resolver};
use crate::error::EngineResult;
use crate::observations::Comparison::{self, Gt, IsTrue, Lt, Near};
use crate::rule_base::{RuleBase, RuleBaseBuilder};
use crate::rules::{arg, calculate, obs, sim, Guard, Rhs, Rule};
use crate::term::Term;
use hobbes_domain::Template;
use hobbes_domain::Validity::{Accepted, Plausible, Probable, Sound};

impl RuleBase {
    /// The built-in rule base
    pub fn standard() -> EngineResult<RuleBase> {
        standard_rules().build()
    }
}

/// Builder preloaded with the built-in rules, for hosts that add their own
pub fn standard_rules() -> RuleBaseBuilder {
    RuleBase::builder()
        .extend(age_model())
        .extend(calibration())
        .extend(bacon())
        .extend(ice_cores())
}

fn var(name: &str) -> Term {
    Term::var(name)
}

fn model_age(depth: Term) -> Term {
    Term::call("model age", vec![depth])
}

fn meta(key: &str) -> Resolver {
    lookup(vec![metadata(key)])
}

fn observe(comparison: Comparison, lhs: Term, rhs: impl Into<Term>) -> Rhs {
    obs(comparison, vec![lhs, rhs.into()])
}

fn age_model() -> RuleBaseBuilder {
    RuleBase::builder()
        .define_with(
            "model age",
            &["at depth"],
            calc("value_at", vec![var("depth"), var("Best Age"), var("at depth")]),
        )
        .define_with("slope", &["xs", "ys"], calc("slope", vec![var("xs"), var("ys")]))
        .define(
            "min age slope",
            calc("min", vec![Term::call("slope", vec![var("depth"), var("Best Age")])]),
        )
        .define("accumulation angles", calc("find_angles", vec![var("depth"), var("Best Age")]))
        .define(
            "normalized accumulation angles",
            calc("normalize_angles", vec![var("accumulation angles")]),
        )
        .define("max accumulation elbow", calc("max", vec![var("normalized accumulation angles")]))
        .define("hiatus reported", meta("hiatus"))
        .define(
            "mean squared error",
            calc("mean_squared_error", vec![var("Calibrated 14C Age"), var("Best Age")]),
        )
        .define(
            "normalized error",
            calc("normalized_error", vec![var("Calibrated 14C Age"), var("Best Age")]),
        )
        .rule(Rule::new("invalid model", vec![arg("model prediction", vec![])], Accepted).with_template(Template::not()))
        .rule(Rule::new("model prediction", vec![arg("model covers origin", vec![])], Accepted))
        .rule(Rule::new("model prediction", vec![arg("reversal", vec![])], Accepted).with_template(Template::not()))
        .rule(Rule::new("model prediction", vec![arg("smooth accumulation rate", vec![])], Accepted))
        .rule(Rule::new(
            "model covers origin",
            vec![observe(Lt, model_age(Term::lit(0)), 2000)],
            Sound,
        ))
        .rule(Rule::new("reversal", vec![observe(Lt, var("min age slope"), 0)], Accepted))
        .rule(Rule::new(
            "smooth accumulation rate",
            vec![observe(Lt, var("max accumulation elbow"), 20)],
            Sound,
        ))
        .rule(Rule::new(
            "monotonic ages",
            vec![sim("increasing trend", vec![var("Best Age")])],
            Sound,
        ))
        .rule(Rule::new(
            "ages within radiocarbon range",
            vec![
                calculate("max", vec![var("Best Age")], "oldest age"),
                observe(Lt, var("oldest age"), 50000),
            ],
            Accepted,
        ))
        .rule(Rule::new(
            ConclusionPattern::new("hiatus at depth", &["depth", "age"]),
            vec![
                observe(Gt, model_age(var("depth")), var("age")),
                arg("hiatus at depth", vec![var("depth")]),
            ],
            Sound,
        ))
        .rule(Rule::new(
            ConclusionPattern::new("hiatus at depth", &["depth"]),
            vec![arg("hiatus", vec![])],
            Probable,
        ))
        .rule(Rule::new("hiatus", vec![obs(IsTrue, vec![var("hiatus reported")])], Probable))
        .rule(Rule::new(
            "mean squared error is positive",
            vec![observe(Gt, var("mean squared error"), 0)],
            Sound,
        ))
        .rule(Rule::new(
            "normalized error is positive",
            vec![observe(Gt, var("normalized error"), 0)],
            Sound,
        ))
}

fn calibration() -> RuleBaseBuilder {
    RuleBase::builder()
        .define("core site", meta("Core Site"))
        .define("in ocean", meta("in ocean"))
        .define("reservoir age", meta("reservoir age"))
        .rule(Rule::new("need marine curve", vec![obs(IsTrue, vec![var("in ocean")])], Accepted))
        .rule(
            Rule::new("reservoir correction", vec![observe(Gt, var("reservoir age"), 0)], Sound)
                .with_guard(Guard::new(IsTrue, vec![var("in ocean")])),
        )
}

fn bacon() -> RuleBaseBuilder {
    RuleBase::builder()
        .define("section thickness", meta("section thickness"))
        .define("bacon iterations", meta("bacon iterations"))
        .define("bacon memory mean", meta("bacon memory mean"))
        .define("bacon memory strength", meta("bacon memory strength"))
        .rule(Rule::new("bacon runs fast", vec![arg("high section thickness", vec![])], Accepted))
        .rule(Rule::new("high section thickness", vec![observe(Gt, var("section thickness"), 30)], Accepted))
        .rule(Rule::new("bacon runs fast", vec![arg("low bacon iterations", vec![])], Sound))
        .rule(Rule::new("low bacon iterations", vec![observe(Lt, var("bacon iterations"), 300)], Sound))
        .rule(Rule::new("increase core thickness", vec![observe(Lt, var("section thickness"), 5)], Accepted))
        .rule(Rule::new("sensible defaults", vec![observe(Near, var("bacon memory mean"), 0.7)], Plausible))
        .rule(Rule::new("sensible defaults", vec![observe(Near, var("bacon memory strength"), 4)], Plausible))
        .rule(Rule::new("decrease section width", vec![arg("invalid model", vec![])], Plausible))
        .rule(Rule::new("increase iterations", vec![arg("invalid model", vec![])], Plausible))
        .rule(
            Rule::new("increase memory", vec![arg("smooth accumulation rate", vec![])], Plausible)
                .with_template(Template::not()),
        )
        .rule(Rule::new("decrease memory", vec![arg("invalid model", vec![])], Plausible))
        .assumption("Bacon", "smooth accumulation rate", vec![], Sound)
}

fn ice_cores() -> RuleBaseBuilder {
    RuleBase::builder()
        .define("latitude", meta("latitude"))
        .define("longitude", meta("longitude"))
        .define(
            "current average temperature",
            lookup(vec![
                metadata("average temperature"),
                db("NOAA temperatures", "average", &["latitude", "longitude"]),
            ]),
        )
        .rule(Rule::new(
            "no snow melt",
            vec![arg("current temperature rarely above freezing", vec![])],
            Sound,
        ))
        .rule(Rule::new(
            "current temperature rarely above freezing",
            vec![observe(Lt, var("current average temperature"), 0)],
            Plausible,
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::CalculationRegistry;
    use crate::simulations::SimulationRegistry;

    #[test]
    fn test_standard_rules_validate() {
        let rules = RuleBase::standard().unwrap();
        assert!(rules.len() > 20);
        rules
            .validate(&CalculationRegistry::standard(), &SimulationRegistry::standard())
            .unwrap();
    }
}
