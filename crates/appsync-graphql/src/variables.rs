//! Typed request variables and their wire encoding.

use appsync_core::{AwsDate, AwsDateTime, AwsTime};
use serde_json::Value;

use crate::error::GraphQLError;

/// A variable value, tagged by how it is encoded on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum VariableValue {
    Null,
    Boolean(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Input objects, lists and filters, encoded as JSON.
    Object(Value),
}

impl VariableValue {
    /// Encodes the value for the `variables` object: numbers and booleans
    /// unquoted, strings quoted and escaped, objects as JSON.
    ///
    /// # Errors
    ///
    /// Returns `GraphQLError::InvalidVariables` for non-finite floats.
    pub fn to_wire(&self) -> Result<String, GraphQLError> {
        match self {
            Self::Null => Ok("null".to_string()),
            Self::Boolean(value) => Ok(value.to_string()),
            Self::Int(value) => Ok(value.to_string()),
            Self::Float(value) if value.is_finite() => Ok(serde_json::to_string(value)?),
            Self::Float(value) => Err(GraphQLError::InvalidVariables(format!(
                "{value} has no JSON representation"
            ))),
            Self::String(value) => Ok(serde_json::to_string(value)?),
            Self::Object(value) => Ok(serde_json::to_string(value)?),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null | Self::Object(Value::Null))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// JSON view of the value, used when inspecting requests.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Boolean(value) => Value::Bool(*value),
            Self::Int(value) => Value::from(*value),
            Self::Float(value) => Value::from(*value),
            Self::String(value) => Value::String(value.clone()),
            Self::Object(value) => value.clone(),
        }
    }
}

impl From<bool> for VariableValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i32> for VariableValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for VariableValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for VariableValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for VariableValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for VariableValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl<T: Into<VariableValue>> From<Option<T>> for VariableValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl From<Value> for VariableValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Boolean(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Self::String(s),
            other => Self::Object(other),
        }
    }
}

impl From<AwsDate> for VariableValue {
    fn from(value: AwsDate) -> Self {
        Self::String(value.to_string())
    }
}

impl From<AwsTime> for VariableValue {
    fn from(value: AwsTime) -> Self {
        Self::String(value.to_string())
    }
}

impl From<AwsDateTime> for VariableValue {
    fn from(value: AwsDateTime) -> Self {
        Self::String(value.to_string())
    }
}

/// A declared variable: GraphQL type plus value.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub type_name: String,
    pub value: VariableValue,
}

impl Variable {
    pub fn new(type_name: impl Into<String>, value: impl Into<VariableValue>) -> Self {
        Self {
            type_name: type_name.into(),
            value: value.into(),
        }
    }
}
