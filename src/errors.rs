// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for stack synthesis operations

use thiserror::Error;

use crate::domain::{LogicalIdError, NetworkError};

/// Errors that can occur while declaring network resources
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StackError {
    /// Neither (or an unusable combination) of the acquisition inputs was supplied
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An argument had the wrong type
    #[error("Argument \"{argument}\" expected {expected}, got {actual}")]
    InvalidType {
        argument: String,
        expected: String,
        actual: String,
    },

    /// An argument had the right type but an unusable value
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// A construct with the same logical id already exists in the stack
    #[error("There is already a construct with id '{0}' in this stack")]
    DuplicateConstruct(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StackError {
    pub(crate) fn invalid_type(
        argument: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        StackError::InvalidType {
            argument: argument.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// A keyword the receiving operation does not accept
    pub(crate) fn unexpected_argument(argument: impl Into<String>, accepted: &str) -> Self {
        Self::invalid_type(argument, accepted, "an unexpected keyword")
    }
}

/// Short type name of a JSON value, used in type errors
pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Result type for stack operations
pub type StackResult<T> = Result<T, StackError>;

impl From<NetworkError> for StackError {
    fn from(err: NetworkError) -> Self {
        StackError::InvalidValue(err.to_string())
    }
}

impl From<LogicalIdError> for StackError {
    fn from(err: LogicalIdError) -> Self {
        StackError::InvalidValue(err.to_string())
    }
}

impl From<serde_json::Error> for StackError {
    fn from(err: serde_json::Error) -> Self {
        StackError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_type_message() {
        let err = StackError::invalid_type("cidr", "string", "integer");
        assert_eq!(
            err.to_string(),
            "Argument \"cidr\" expected string, got integer"
        );
    }

    #[test]
    fn test_unexpected_argument_is_a_type_error() {
        let err = StackError::unexpected_argument("subnet_ids", "a link option");
        assert_eq!(
            err.to_string(),
            "Argument \"subnet_ids\" expected a link option, got an unexpected keyword"
        );
    }

    #[test]
    fn test_network_error_becomes_invalid_value() {
        let err: StackError = NetworkError::InvalidPrefixLength(40).into();
        assert!(matches!(err, StackError::InvalidValue(_)));
    }
}
