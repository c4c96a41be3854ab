//! Compass Core Types and Definitions
//!
//! This crate provides the canonical model types shared by the Compass
//! grading engine and its tooling. It includes:
//!
//! - **Identifiers**: String-interned element ids and numeric model ids ([`identifier`] module)
//! - **Elements**: Node and edge kinds of all supported diagram families ([`element`] module)
//! - **Models**: Submitted diagrams and their structural validation ([`model`] module)
//! - **Scores**: Manual and inferred per-element credits ([`score`] module)
//! - **Grades**: Per-model aggregates and export rounding ([`grade`] module)

pub mod element;
pub mod error;
pub mod grade;
pub mod identifier;
pub mod model;
pub mod score;

pub use error::StructuralError;
