//! Error types for plgen.

use thiserror::Error;

/// The main error type for plgen operations.
#[derive(Debug, Error)]
pub enum PlGenError {
    /// A type tag with no entry in the type mapper.
    #[error("Unknown type tag '{0}': add a mapping before compiling")]
    UnknownType(String),

    /// A plain-function parameter without a type annotation.
    #[error("Function '{function}': parameter '{param}' must be annotated to be translated to pl/python")]
    MissingAnnotation { function: String, param: String },

    /// Trigger definition without exactly one of table/entity.
    #[error("Trigger '{0}': exactly one of table or entity must be set")]
    TriggerTarget(String),

    /// A routine or table name that fails the identifier whitelist.
    #[error("Invalid SQL identifier: '{0}'")]
    InvalidIdentifier(String),

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// SQL execution error, surfaced unmodified from the database.
    #[error("Execution error: {0}")]
    Execution(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlGenError {
    /// Create a missing-annotation error for a named function parameter.
    pub fn missing_annotation(function: impl Into<String>, param: impl Into<String>) -> Self {
        Self::MissingAnnotation {
            function: function.into(),
            param: param.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// Result type alias for plgen operations.
pub type PlGenResult<T> = Result<T, PlGenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PlGenError::missing_annotation("pl_max", "b");
        assert_eq!(
            err.to_string(),
            "Function 'pl_max': parameter 'b' must be annotated to be translated to pl/python"
        );
    }

    #[test]
    fn test_unknown_type_display() {
        let err = PlGenError::UnknownType("decimal".to_string());
        assert_eq!(
            err.to_string(),
            "Unknown type tag 'decimal': add a mapping before compiling"
        );
    }
}
