//! Declarative rule files
//!
//! Rule files are TOML with the same shape as the in-code rule table:
//!
//! ```toml
//! [[define]]
//! name = "min age slope"
//! calc = { function = "min", args = [{ call = "slope", args = ["depth", "Best Age"] }] }
//!
//! [[define]]
//! name = "core site"
//! lookup = [{ metadata = "Core Site" }]
//!
//! [[rule]]
//! conclusion = "reversal"
//! quality = "accepted"
//! rhs = [{ observe = "<", args = ["min age slope", 0] }]
//!
//! [[rule]]
//! conclusion = "invalid model"
//! quality = ["accepted", "sound"]
//! template = "not"
//! rhs = [{ argue = "model prediction" }]
//! ```
//!
//! Strings in argument lists are names; numbers and booleans are literals;
//! `{ text = "..." }` is a literal string and `{ call = ..., args = [...] }`
//! a parametrized name.

use crate::conclusion::ConclusionPattern;
use crate::definitions::{Resolver, Source};
use crate::error::LoadError;
use crate::observations::Comparison;
use crate::rule_base::{RuleBase, RuleBaseBuilder};
use crate::rules::{Guard, Rhs, Rule};
use crate::term::Term;
use crate::value::Value;
use hobbes_domain::{Quality, Template, Validity};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleFile {
    #[serde(default)]
    define: Vec<DefineSpec>,
    #[serde(default)]
    rule: Vec<RuleSpec>,
    #[serde(default)]
    assumption: Vec<AssumptionSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DefineSpec {
    name: String,
    #[serde(default)]
    params: Vec<String>,
    lookup: Option<Vec<SourceSpec>>,
    calc: Option<CalcSpec>,
    value: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SourceSpec {
    Metadata {
        metadata: String,
    },
    Attribute {
        attribute: String,
    },
    Db {
        table: String,
        field: String,
        #[serde(default)]
        keys: Vec<String>,
    },
}

#[derive(Debug, Deserialize)]
struct CalcSpec {
    function: String,
    #[serde(default)]
    args: Vec<TermSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum TermSpec {
    Bool(bool),
    Number(f64),
    Name(String),
    Call {
        call: String,
        #[serde(default)]
        args: Vec<TermSpec>,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleSpec {
    conclusion: String,
    #[serde(default)]
    params: Vec<String>,
    quality: QualitySpec,
    #[serde(default)]
    template: Option<TemplateSpec>,
    #[serde(default)]
    guard: Option<GuardSpec>,
    #[serde(default)]
    rhs: Vec<RhsSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AssumptionSpec {
    model: String,
    conclusion: String,
    #[serde(default)]
    args: Vec<TermSpec>,
    quality: QualitySpec,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum QualitySpec {
    Single(String),
    Pair([String; 2]),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TemplateSpec {
    Named(String),
    Custom {
        #[serde(default)]
        flip: bool,
        #[serde(default = "default_priority")]
        priority: bool,
        #[serde(default)]
        increment: i32,
    },
}

fn default_priority() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct GuardSpec {
    observe: String,
    #[serde(default)]
    args: Vec<TermSpec>,
    #[serde(default)]
    invert: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RhsSpec {
    Observe {
        observe: String,
        #[serde(default)]
        args: Vec<TermSpec>,
    },
    Calculate {
        calculate: String,
        #[serde(default)]
        args: Vec<TermSpec>,
        into: String,
    },
    Simulate {
        simulate: String,
        #[serde(default)]
        args: Vec<TermSpec>,
    },
    Argue {
        argue: String,
        #[serde(default)]
        args: Vec<TermSpec>,
    },
}

impl RuleBase {
    /// Parse a TOML rule file into a builder
    ///
    /// Returning the builder lets callers merge file rules with
    /// [`standard_rules`](crate::standard_rules) before building.
    pub fn builder_from_toml_str(s: &str) -> Result<RuleBaseBuilder, LoadError> {
        let file: RuleFile = toml::from_str(s)?;
        let mut builder = RuleBase::builder();

        for def in file.define {
            let params: Vec<&str> = def.params.iter().map(String::as_str).collect();
            let resolver = resolver(&def)?;
            builder = builder.define_with(&def.name, &params, resolver);
        }
        for spec in file.rule {
            builder = builder.rule(rule(spec)?);
        }
        for spec in file.assumption {
            builder = builder.assumption(
                &spec.model,
                &spec.conclusion,
                terms(spec.args),
                quality(&spec.quality)?,
            );
        }
        Ok(builder)
    }

    /// Parse and build a TOML rule file
    pub fn from_toml_str(s: &str) -> Result<RuleBase, LoadError> {
        Ok(Self::builder_from_toml_str(s)?.build()?)
    }

    /// Load a TOML rule file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<RuleBase, LoadError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}

fn resolver(def: &DefineSpec) -> Result<Resolver, LoadError> {
    match (&def.lookup, &def.calc, &def.value) {
        (Some(sources), None, None) => Ok(Resolver::Lookup(sources.iter().map(source).collect())),
        (None, Some(spec), None) => Ok(Resolver::Calc {
            function: spec.function.clone(),
            args: terms(spec.args.clone()),
        }),
        (None, None, Some(value)) => Ok(Resolver::Literal(value.clone())),
        _ => Err(LoadError::Invalid(format!(
            "Definition '{}' needs exactly one of lookup, calc or value",
            def.name
        ))),
    }
}

fn source(spec: &SourceSpec) -> Source {
    match spec {
        SourceSpec::Metadata { metadata } => Source::Metadata(metadata.clone()),
        SourceSpec::Attribute { attribute } => Source::Attribute(attribute.clone()),
        SourceSpec::Db { table, field, keys } => Source::Db {
            table: table.clone(),
            field: field.clone(),
            keys: keys.clone(),
        },
    }
}

fn terms(specs: Vec<TermSpec>) -> Vec<Term> {
    specs.into_iter().map(term).collect()
}

fn term(spec: TermSpec) -> Term {
    match spec {
        TermSpec::Bool(b) => Term::lit(b),
        TermSpec::Number(n) => Term::lit(n),
        TermSpec::Name(name) => Term::Var(name),
        TermSpec::Text { text } => Term::lit(text),
        TermSpec::Call { call, args } => Term::call(call, terms(args)),
    }
}

fn validity(s: &str) -> Result<Validity, LoadError> {
    Validity::parse(s).ok_or_else(|| LoadError::Invalid(format!("Unknown validity: {}", s)))
}

fn quality(spec: &QualitySpec) -> Result<Quality, LoadError> {
    Ok(match spec {
        QualitySpec::Single(v) => Quality::from(validity(v)?),
        QualitySpec::Pair([t, f]) => Quality::new(validity(t)?, validity(f)?),
    })
}

fn template(spec: &TemplateSpec) -> Result<Template, LoadError> {
    match spec {
        TemplateSpec::Named(name) => match name.to_lowercase().as_str() {
            "and" => Ok(Template::and()),
            "or" => Ok(Template::or()),
            "not" => Ok(Template::not()),
            other => Err(LoadError::Invalid(format!("Unknown template: {}", other))),
        },
        TemplateSpec::Custom {
            flip,
            priority,
            increment,
        } => Ok(Template::new(*flip, *priority, *increment)),
    }
}

fn comparison(symbol: &str) -> Result<Comparison, LoadError> {
    symbol.parse().map_err(LoadError::Invalid)
}

fn rule(spec: RuleSpec) -> Result<Rule, LoadError> {
    let params: Vec<&str> = spec.params.iter().map(String::as_str).collect();
    let conclusion = ConclusionPattern::new(spec.conclusion.as_str(), &params);

    let mut rhs = Vec::with_capacity(spec.rhs.len());
    for clause in spec.rhs {
        rhs.push(match clause {
            RhsSpec::Observe { observe, args } => Rhs::Observation {
                comparison: comparison(&observe)?,
                params: terms(args),
            },
            RhsSpec::Calculate {
                calculate,
                args,
                into,
            } => Rhs::Calculation {
                function: calculate,
                params: terms(args),
                var: into,
            },
            RhsSpec::Simulate { simulate, args } => Rhs::Simulation {
                name: simulate,
                params: terms(args),
            },
            RhsSpec::Argue { argue, args } => Rhs::Argument {
                conclusion: argue,
                params: terms(args),
            },
        });
    }

    let mut rule = Rule::new(conclusion, rhs, quality(&spec.quality)?);
    if let Some(t) = &spec.template {
        rule = rule.with_template(template(t)?);
    }
    if let Some(g) = spec.guard {
        let mut guard = Guard::new(comparison(&g.observe)?, terms(g.args));
        if g.invert {
            guard = guard.inverted();
        }
        rule = rule.with_guard(guard);
    }
    Ok(rule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::EvidenceKind;

    const RULES: &str = r#"
[[define]]
name = "min age slope"
calc = { function = "min", args = [{ call = "slope", args = ["depth", "Best Age"] }] }

[[define]]
name = "slope"
params = ["xs", "ys"]
calc = { function = "slope", args = ["xs", "ys"] }

[[define]]
name = "site"
lookup = [{ metadata = "Core Site" }, { table = "sites", field = "name", keys = ["core id"] }]

[[rule]]
conclusion = "reversal"
quality = "accepted"
rhs = [{ observe = "<", args = ["min age slope", 0] }]

[[rule]]
conclusion = "hiatus at depth"
params = ["depth"]
quality = ["sound", "probable"]
template = { flip = true, increment = 1 }
guard = { observe = "is true", args = ["cored"], invert = true }
rhs = [
    { calculate = "max", args = ["Best Age"], into = "oldest" },
    { observe = ">", args = ["oldest", { text = "n/a" }] },
    { argue = "reversal" },
]

[[assumption]]
model = "Bacon"
conclusion = "reversal"
quality = "sound"
"#;

    #[test]
    fn test_load_rule_file() {
        let rules = RuleBase::from_toml_str(RULES).unwrap();
        assert_eq!(rules.len(), 3);
        assert_eq!(rules.definitions().len(), 3);

        let hiatus = &rules.rules()[1];
        assert_eq!(hiatus.conclusion, ConclusionPattern::new("hiatus at depth", &["depth"]));
        assert_eq!(hiatus.quality, Quality::new(Validity::Sound, Validity::Probable));
        assert_eq!(hiatus.template, Template::new(true, true, 1));
        assert!(hiatus.guard.as_ref().unwrap().invert);
        let kinds: Vec<EvidenceKind> = hiatus.rhs.iter().map(Rhs::kind).collect();
        assert_eq!(
            kinds,
            vec![EvidenceKind::Calculation, EvidenceKind::Observation, EvidenceKind::Argument]
        );
        assert_eq!(
            hiatus.rhs[1].params()[1],
            Term::Literal(Value::Text("n/a".to_string()))
        );

        let def = rules.definitions().get("min age slope", 0).unwrap();
        assert_eq!(
            def.resolver,
            Resolver::Calc {
                function: "min".to_string(),
                args: vec![Term::call("slope", vec!["depth".into(), "Best Age".into()])],
            }
        );
    }

    #[test]
    fn test_rejects_bad_content() {
        let unknown_op = "[[rule]]\nconclusion = \"x\"\nquality = \"sound\"\nrhs = [{ observe = \"<>\", args = [1, 2] }]\n";
        assert!(matches!(RuleBase::from_toml_str(unknown_op), Err(LoadError::Invalid(_))));

        let bad_validity = "[[rule]]\nconclusion = \"x\"\nquality = \"certain\"\n";
        assert!(matches!(RuleBase::from_toml_str(bad_validity), Err(LoadError::Invalid(_))));

        let two_resolvers = "[[define]]\nname = \"x\"\nvalue = 1\ncalc = { function = \"min\" }\n";
        assert!(matches!(RuleBase::from_toml_str(two_resolvers), Err(LoadError::Invalid(_))));

        let duplicate = "[[define]]\nname = \"x\"\nvalue = 1\n[[define]]\nname = \"x\"\nvalue = 2\n";
        assert!(matches!(RuleBase::from_toml_str(duplicate), Err(LoadError::Engine(_))));

        assert!(matches!(RuleBase::from_toml_str("[[rule]]\n"), Err(LoadError::Toml(_))));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.toml");
        std::fs::write(&path, RULES).unwrap();
        assert_eq!(RuleBase::from_file(&path).unwrap().len(), 3);
        assert!(matches!(
            RuleBase::from_file(dir.path().join("missing.toml")),
            Err(LoadError::Io(_))
        ));
    }
}
