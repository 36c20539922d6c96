//! Hobbes Domain Layer
//!
//! This crate contains the confidence algebra at the heart of the Hobbes
//! reasoning engine. It has ZERO runtime dependencies and defines the value
//! types every other layer reasons with.
//!
//! ## Key Concepts
//!
//! - **Applicability**: direction (for/against) and strength (partly/mostly/highly)
//!   of a piece of evidence
//! - **Validity**: how trustworthy evidence is (plausible → probable → sound → accepted)
//! - **Confidence**: an (applicability, validity) pair, with a total order and
//!   a combination procedure over lists of confidences
//! - **Template**: per-rule options for unifying clause confidences
//!
//! ## Architecture
//!
//! - No external crate dependencies
//! - Immutable `Copy` value types only
//! - Rule evaluation and data access live in `hobbes-engine`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod applicability;
pub mod confidence;
pub mod template;
pub mod validity;

// Re-exports for convenience
pub use applicability::{Applicability, Direction};
pub use confidence::{Confidence, Quality};
pub use template::Template;
pub use validity::Validity;
