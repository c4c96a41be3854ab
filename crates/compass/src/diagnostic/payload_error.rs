//! The PayloadError type for rejected assessment payloads.

use std::fmt;

use crate::diagnostic::Diagnostic;

/// An assessment payload rejected as a whole.
///
/// Wraps every diagnostic found while checking the payload, errors and
/// warnings alike.
#[derive(Debug, Clone)]
pub struct PayloadError {
    diagnostics: Vec<Diagnostic>,
}

impl PayloadError {
    /// Create a new payload error from diagnostics.
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    /// Get all diagnostics in this error.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

impl fmt::Display for PayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(first) = self.diagnostics.first() {
            write!(f, "{}", first)?;
            if self.diagnostics.len() > 1 {
                write!(f, " (+{} more)", self.diagnostics.len() - 1)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for PayloadError {}

impl From<Diagnostic> for PayloadError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self {
            diagnostics: vec![diagnostic],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::ErrorCode;

    #[test]
    fn test_payload_error_display() {
        let err = PayloadError::new(vec![
            Diagnostic::error("entry has an empty local id").with_code(ErrorCode::E100),
            Diagnostic::error("duplicate entry `c1`").with_code(ErrorCode::E101),
        ]);

        assert_eq!(
            err.to_string(),
            "error[E100]: entry has an empty local id (+1 more)"
        );
    }

    #[test]
    fn test_payload_error_from_diagnostic() {
        let err: PayloadError = Diagnostic::error("bad").into();
        assert_eq!(err.diagnostics().len(), 1);
        assert_eq!(err.to_string(), "error: bad");
    }
}
