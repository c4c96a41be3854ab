//! Codes for the Compass diagnostic system.
//!
//! Codes are organized by severity:
//! - `W0xx` - Skipped assessment entries
//! - `E1xx` - Malformed assessment payloads

use std::fmt;

use serde::{Serialize, Serializer};

/// Codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Entry Warnings (W0xx)
    // =========================================================================
    /// Unknown element.
    ///
    /// An assessment entry names a `local_id` that the model does not contain.
    W001,

    /// Invalid credits.
    ///
    /// An assessment entry carries a NaN or infinite credit value.
    W002,

    // =========================================================================
    // Payload Errors (E1xx)
    // =========================================================================
    /// Malformed entry.
    ///
    /// An assessment entry has an empty `local_id`.
    E100,

    /// Duplicate entry.
    ///
    /// The same `local_id` appears twice in one payload.
    E101,
}

impl ErrorCode {
    /// Returns the code as a string (e.g., "W001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::W001 => "W001",
            ErrorCode::W002 => "W002",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
        }
    }

    /// Returns a short description of the code.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::W001 => "unknown element",
            ErrorCode::W002 => "invalid credits",
            ErrorCode::E100 => "malformed entry",
            ErrorCode::E101 => "duplicate entry",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::W001.to_string(), "W001");
        assert_eq!(ErrorCode::E101.to_string(), "E101");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::W001.description(), "unknown element");
        assert_eq!(ErrorCode::W002.description(), "invalid credits");
        assert_eq!(ErrorCode::E100.description(), "malformed entry");
    }
}
