//! Error classification

use std::fmt;

/// Broad category an error falls into, used by callers to pick a response without matching on
/// every variant of every module's error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input; the aggregate was left untouched.
    Validation,

    /// A referenced cart, order, subscription or product does not exist.
    NotFound,

    /// The request is well formed but not allowed in the current state.
    Conflict,

    /// Cached values disagree with the values they are derived from.
    InvariantViolation,

    /// Arithmetic or time computation failed (overflow, currency mismatch).
    Computation,
}

impl ErrorKind {
    /// Returns the kind as a static snake case string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::InvariantViolation => "invariant_violation",
            Self::Computation => "computation",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text that does not name a variant of one of the crate's enums.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseEnumError {
    /// What was being parsed, e.g. `"order status"`
    pub kind: &'static str,

    /// The rejected text
    pub value: String,
}

impl ParseEnumError {
    /// Rejected `value` while parsing a `kind`.
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_render_snake_case() {
        assert_eq!(ErrorKind::NotFound.to_string(), "not_found");
        assert_eq!(
            ErrorKind::InvariantViolation.as_str(),
            "invariant_violation"
        );
    }

    #[test]
    fn parse_enum_error_names_kind_and_value() {
        let error = ParseEnumError::new("order status", "lost");

        assert_eq!(error.to_string(), "unknown order status: lost");
    }
}
