use thiserror::Error;

/// Core error types for schema resolution and scalar parsing
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Model schema not registered: {0}")]
    SchemaNotFound(String),

    #[error("Custom type schema not registered: {0}")]
    CustomTypeNotFound(String),

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("{reason} in [{input}]. {suggestion}")]
    InvalidTemporal {
        input: String,
        reason: String,
        suggestion: &'static str,
    },

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl CoreError {
    /// Create a new SchemaNotFound error
    pub fn schema_not_found(type_name: impl Into<String>) -> Self {
        Self::SchemaNotFound(type_name.into())
    }

    /// Create a new CustomTypeNotFound error
    pub fn custom_type_not_found(type_name: impl Into<String>) -> Self {
        Self::CustomTypeNotFound(type_name.into())
    }

    /// Create a new InvalidSchema error
    pub fn invalid_schema(message: impl Into<String>) -> Self {
        Self::InvalidSchema(message.into())
    }

    /// Create a new InvalidTemporal error
    pub fn invalid_temporal(
        input: impl Into<String>,
        reason: impl Into<String>,
        suggestion: &'static str,
    ) -> Self {
        Self::InvalidTemporal {
            input: input.into(),
            reason: reason.into(),
            suggestion,
        }
    }

    /// Check if this error came from an unresolvable type reference
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            Self::SchemaNotFound(_) | Self::CustomTypeNotFound(_) | Self::InvalidSchema(_)
        )
    }

    /// Get error category for logging/monitoring
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::SchemaNotFound(_) | Self::CustomTypeNotFound(_) | Self::InvalidSchema(_) => {
                ErrorCategory::Schema
            }
            Self::InvalidTemporal { .. } => ErrorCategory::Validation,
            Self::JsonError(_) => ErrorCategory::Serialization,
        }
    }
}

/// Error categories for monitoring and classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Schema,
    Validation,
    Serialization,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Schema => write!(f, "schema"),
            Self::Validation => write!(f, "validation"),
            Self::Serialization => write!(f, "serialization"),
        }
    }
}

/// Convenience result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
