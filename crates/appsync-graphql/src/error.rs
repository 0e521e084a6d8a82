//! Error types for request synthesis.
//!
//! Nothing here is transient: every error is a property of the inputs, so
//! [`GraphQLError::is_retryable`] is always `false`. Retry policy belongs to
//! the transport that sends the request.

use std::fmt;

use appsync_core::CoreError;

/// Errors that can occur while building a GraphQL request.
#[derive(Debug)]
pub enum GraphQLError {
    /// A type could not be resolved, or a schema is malformed.
    Schema(CoreError),

    /// A required builder field was never set.
    MissingField(&'static str),

    /// Request options failed validation.
    InvalidOptions(String),

    /// The generated document is not valid GraphQL.
    InvalidDocument(String),

    /// A variable could not be built or encoded.
    InvalidVariables(String),

    /// Wire envelope encoding failed.
    Serialization(String),
}

impl fmt::Display for GraphQLError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schema(err) => write!(f, "Schema error: {err}"),
            Self::MissingField(field) => {
                write!(f, "Request builder is missing required field: {field}")
            }
            Self::InvalidOptions(msg) => write!(f, "Invalid request options: {msg}"),
            Self::InvalidDocument(msg) => write!(f, "Invalid GraphQL document: {msg}"),
            Self::InvalidVariables(msg) => write!(f, "Invalid variables: {msg}"),
            Self::Serialization(msg) => write!(f, "Serialization error: {msg}"),
        }
    }
}

impl std::error::Error for GraphQLError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Schema(err) => Some(err),
            _ => None,
        }
    }
}

impl GraphQLError {
    /// Returns a stable error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Schema(CoreError::InvalidTemporal { .. }) => "INVALID_TEMPORAL",
            Self::Schema(_) => "SCHEMA_ERROR",
            Self::MissingField(_) => "MISSING_FIELD",
            Self::InvalidOptions(_) => "INVALID_OPTIONS",
            Self::InvalidDocument(_) => "INVALID_DOCUMENT",
            Self::InvalidVariables(_) => "INVALID_VARIABLES",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Whether the error stems from schema resolution.
    #[must_use]
    pub fn is_schema_error(&self) -> bool {
        matches!(self, Self::Schema(err) if err.is_schema_error())
    }

    /// Always `false`; request synthesis is deterministic.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        false
    }
}

impl From<CoreError> for GraphQLError {
    fn from(err: CoreError) -> Self {
        Self::Schema(err)
    }
}

impl From<serde_json::Error> for GraphQLError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
