//! Diagnostics for assessment ingestion.
//!
//! Problems with individual assessment entries never abort a batch. They are
//! reported as [`Diagnostic`]s: warnings for entries that were skipped, and
//! errors for payloads that are rejected as a whole by [`validate_payload`].
//!
//! # Example
//!
//! ```
//! # use compass::diagnostic::{Diagnostic, ErrorCode};
//! # use compass::identifier::{Id, ModelId};
//! let diag = Diagnostic::warning("unknown element `c9`")
//!     .with_code(ErrorCode::W001)
//!     .with_subject(ModelId::new(3), Id::new("c9"))
//!     .with_help("check that the assessment targets the right submission");
//!
//! assert_eq!(diag.to_string(), "warning[W001]: unknown element `c9`");
//! ```
//!
//! [`validate_payload`]: crate::validate_payload

mod collector;
mod error_code;
mod payload_error;
mod severity;

pub use collector::DiagnosticCollector;
pub use error_code::ErrorCode;
pub use payload_error::PayloadError;
pub use severity::Severity;

use std::fmt;

use serde::Serialize;

use compass_core::identifier::{Id, ModelId};

/// A single warning or error about an assessment entry.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<ErrorCode>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<ModelId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    element: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    help: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The model the diagnostic refers to, if known.
    pub fn model(&self) -> Option<ModelId> {
        self.model
    }

    /// The element the diagnostic refers to, if known.
    pub fn element(&self) -> Option<Id> {
        self.element
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Set the error code.
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Set the model and element the diagnostic is about.
    pub fn with_subject(mut self, model: ModelId, element: Id) -> Self {
        self.model = Some(model);
        self.element = Some(element);
        self
    }

    /// Set the model the diagnostic is about.
    pub fn with_model(mut self, model: ModelId) -> Self {
        self.model = Some(model);
        self
    }

    /// Set the help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            model: None,
            element: None,
            help: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Format: "warning[W001]: message" or "warning: message"
        write!(f, "{}", self.severity)?;
        if let Some(code) = self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_new() {
        let diag = Diagnostic::error("test error");

        assert!(diag.severity().is_error());
        assert_eq!(diag.message(), "test error");
        assert!(diag.code().is_none());
        assert!(diag.model().is_none());
        assert!(diag.element().is_none());
        assert!(diag.help().is_none());
    }

    #[test]
    fn test_diagnostic_builders() {
        let diag = Diagnostic::warning("credits are not a finite number")
            .with_code(ErrorCode::W002)
            .with_subject(ModelId::new(7), Id::new("m1"))
            .with_help("use a finite credit value");

        assert_eq!(diag.code(), Some(ErrorCode::W002));
        assert_eq!(diag.model(), Some(ModelId::new(7)));
        assert_eq!(diag.element(), Some(Id::new("m1")));
        assert_eq!(diag.help(), Some("use a finite credit value"));
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::error("duplicate entry `c1`").with_code(ErrorCode::E101);
        assert_eq!(diag.to_string(), "error[E101]: duplicate entry `c1`");

        let diag = Diagnostic::warning("skipped");
        assert_eq!(diag.to_string(), "warning: skipped");
    }

    #[test]
    fn test_diagnostic_with_model_only() {
        let diag = Diagnostic::error("rejected").with_model(ModelId::new(2));
        assert_eq!(diag.model(), Some(ModelId::new(2)));
        assert!(diag.element().is_none());
    }
}
