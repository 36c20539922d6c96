//! Engine error types
//!
//! Missing sample data is never an error: it surfaces as a missing
//! confidence and the affected rule simply does not fire. Everything here is
//! a configuration problem or a reasoning failure the caller must see.

use thiserror::Error;

/// Result type alias for engine operations
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Errors raised while validating a rule base or building arguments
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// A rule or definition names a calculation the host did not register
    #[error("Unknown calculation: {0}")]
    UnknownCalculation(String),

    /// A rule names a simulation the host did not register
    #[error("Unknown simulation: {0}")]
    UnknownSimulation(String),

    /// An observation or guard was given the wrong number of parameters
    #[error("Rule '{rule}': '{comparison}' takes {expected} parameter(s), got {found}")]
    InvalidArity {
        /// Conclusion of the offending rule
        rule: String,
        /// Comparison symbol
        comparison: String,
        /// Parameters the comparison needs
        expected: usize,
        /// Parameters supplied
        found: usize,
    },

    /// The same name and arity was defined twice
    #[error("Duplicate definition '{name}' with {arity} parameter(s)")]
    DuplicateDefinition {
        /// Defined name
        name: String,
        /// Number of parameters
        arity: usize,
    },

    /// A definition requires its own value to be computed
    #[error("Cyclic definition: {}", .0.join(" -> "))]
    CyclicDefinition(Vec<String>),

    /// A conclusion (indirectly) argues from itself
    #[error("Cyclic conclusion dependency: {}", .0.join(" -> "))]
    CyclicConclusion(Vec<String>),

    /// Argument nesting went deeper than the configured limit
    #[error("Argument depth limit of {limit} exceeded while building '{conclusion}'")]
    DepthExceeded {
        /// Conclusion being built when the limit was hit
        conclusion: String,
        /// Configured limit
        limit: usize,
    },

    /// Invalid engine configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors raised while reading samples, rule files or configuration
#[derive(Error, Debug)]
pub enum LoadError {
    /// Failed to read a file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Failed to parse JSON
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Well-formed file with invalid contents
    #[error("Invalid content: {0}")]
    Invalid(String),

    /// Loaded content failed engine validation
    #[error(transparent)]
    Engine(#[from] EngineError),
}
