//! Error types for value-layer operations.

use std::fmt;

/// Categories of value-layer errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing constructor argument, unexpected named arguments, bad arity
    Usage,
    /// Operation applied to a value of the wrong kind (e.g. `car` of nil)
    Type,
    /// Slot index outside of the valid range
    Range,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Usage => "usage error",
            ErrorKind::Type => "type error",
            ErrorKind::Range => "range error",
        }
    }
}

/// An error reported synchronously by a value-layer operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueError {
    /// The category of error
    pub kind: ErrorKind,
    /// Human-readable error message
    pub message: String,
}

impl ValueError {
    /// Create a new error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Create a usage error.
    pub fn usage(what: impl Into<String>) -> Self {
        Self::new(ErrorKind::Usage, what)
    }

    /// Create a type error.
    pub fn type_error(what: impl Into<String>) -> Self {
        Self::new(ErrorKind::Type, what)
    }

    /// Create a range error.
    pub fn range(what: impl Into<String>) -> Self {
        Self::new(ErrorKind::Range, what)
    }

    pub fn is_usage(&self) -> bool {
        self.kind == ErrorKind::Usage
    }

    pub fn is_type(&self) -> bool {
        self.kind == ErrorKind::Type
    }

    pub fn is_range(&self) -> bool {
        self.kind == ErrorKind::Range
    }
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValueError {}

impl From<ValueError> for String {
    fn from(err: ValueError) -> String {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_error_display() {
        let err = ValueError::type_error("cannot get car of nil");
        assert_eq!(err.to_string(), "cannot get car of nil");
    }

    #[test]
    fn test_value_error_kinds() {
        assert!(ValueError::usage("x").is_usage());
        assert!(ValueError::type_error("x").is_type());
        assert!(ValueError::range("x").is_range());
        assert!(!ValueError::range("x").is_usage());
    }

    #[test]
    fn test_value_error_into_string() {
        let err = ValueError::range("pair index out of range");
        let s: String = err.into();
        assert_eq!(s, "pair index out of range");
    }

    #[test]
    fn test_error_kind_as_str() {
        assert_eq!(ErrorKind::Usage.as_str(), "usage error");
        assert_eq!(ErrorKind::Range.as_str(), "range error");
    }
}
