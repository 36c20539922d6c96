//! Hobbes Reasoning Engine
//!
//! Builds explainable arguments about scientific samples. Rules relate a
//! conclusion to observations, calculations, simulations and arguments
//! about other conclusions; the engine runs every rule for a conclusion,
//! combines what fired, and keeps the whole tree so the reasoning can be
//! shown to a scientist.
//!
//! # Architecture
//!
//! - [`RuleBase`]: immutable rules and definitions, built in code or from TOML
//! - [`Environment`]: per-pass scope stack and memo tables over one [`Sample`]
//! - [`Engine`]: read-only; builds [`Argument`]s and quick confidences
//! - [`evidence`]: serializable views of argument trees
//!
//! Confidence arithmetic comes from `hobbes-domain`.
//!
//! # Examples
//!
//! ```
//! use hobbes_engine::{ArgumentView, Conclusion, Engine, SampleRecord};
//!
//! let engine = Engine::standard().unwrap();
//! let sample = SampleRecord::new()
//!     .with_metadata("in ocean", true)
//!     .with_attribute("depth", vec![0.0, 10.0, 20.0])
//!     .with_attribute("Best Age", vec![100.0, 500.0, 900.0]);
//!
//! let argument = engine.build_argument(&sample, &Conclusion::new("need marine curve")).unwrap();
//! let view = ArgumentView::from_argument(&argument);
//! assert_eq!(view.summary, "Argument For Need Marine Curve");
//! ```

#![warn(missing_docs)]

pub mod argument;
pub mod calculations;
pub mod conclusion;
pub mod config;
pub mod definitions;
pub mod engine;
pub mod environment;
pub mod error;
pub mod evidence;
pub mod loader;
pub mod observations;
pub mod rule_base;
pub mod rule_list;
pub mod rules;
pub mod sample;
pub mod simulations;
pub mod term;
pub mod value;

pub use argument::Argument;
pub use calculations::CalculationRegistry;
pub use conclusion::{Conclusion, ConclusionPattern};
pub use config::EngineConfig;
pub use definitions::{attribute, calc, db, lookup, metadata, Definitions, Resolver, Source};
pub use engine::Engine;
pub use environment::Environment;
pub use error::{EngineError, EngineResult, LoadError};
pub use evidence::{ArgumentView, ConfidenceView, EvidenceView, RuleView};
pub use observations::Comparison;
pub use rule_base::{RuleBase, RuleBaseBuilder};
pub use rule_list::standard_rules;
pub use rules::{arg, calculate, obs, sim, EvidenceKind, Guard, Outcome, Rhs, RhsInstance, Rule, RuleInstance, RuleOutcome};
pub use sample::{Sample, SampleRecord};
pub use simulations::{SimResult, SimulationRegistry};
pub use term::Term;
pub use value::Value;

pub use hobbes_domain::{Applicability, Confidence, Quality, Template, Validity};
