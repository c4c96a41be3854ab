//! Collector for accumulating diagnostics while a payload is processed.
//!
//! The [`DiagnosticCollector`] lets ingestion report every problematic entry
//! instead of stopping at the first one.

use crate::diagnostic::{Diagnostic, PayloadError};

/// A collector for accumulating diagnostics.
///
/// # Example
///
/// ```
/// # use compass::diagnostic::{Diagnostic, DiagnosticCollector, ErrorCode};
/// let mut collector = DiagnosticCollector::new();
///
/// collector.emit(
///     Diagnostic::warning("unknown element `c9`")
///         .with_code(ErrorCode::W001)
/// );
///
/// let warnings = collector.finish().expect("warnings do not fail");
/// assert_eq!(warnings.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    has_errors: bool,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a diagnostic to this collector.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity().is_error() {
            self.has_errors = true;
        }
        self.diagnostics.push(diagnostic);
    }

    /// Returns `true` if an error has been emitted.
    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    /// Finish collection.
    ///
    /// - If there are errors, returns `Err(PayloadError)` with all diagnostics.
    /// - Otherwise returns the collected warnings.
    pub fn finish(self) -> Result<Vec<Diagnostic>, PayloadError> {
        if self.has_errors {
            Err(PayloadError::new(self.diagnostics))
        } else {
            Ok(self.diagnostics)
        }
    }
}
