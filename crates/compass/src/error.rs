//! Error types for Compass operations.
//!
//! This module provides the main error type [`CompassError`] returned by the
//! [`CompassEngine`](crate::CompassEngine) API.

use thiserror::Error;

use compass_core::{StructuralError, identifier::ModelId};

use crate::diagnostic::PayloadError;

/// The main error type for Compass operations.
///
/// Per-entry problems inside an assessment are not errors; they are returned
/// as warnings in the [`AssessmentReport`](crate::AssessmentReport).
#[derive(Debug, Error)]
pub enum CompassError {
    #[error("model {0} is not registered")]
    UnknownModel(ModelId),

    #[error("model {0} is already registered")]
    DuplicateModel(ModelId),

    #[error("model {model} is structurally invalid: {source}")]
    StructuralViolation {
        model: ModelId,
        #[source]
        source: StructuralError,
    },

    #[error("{0}")]
    MalformedPayload(#[from] PayloadError),
}

impl CompassError {
    /// Create a new `StructuralViolation` error for `model`.
    pub fn structural(model: ModelId, source: StructuralError) -> Self {
        Self::StructuralViolation { model, source }
    }
}
