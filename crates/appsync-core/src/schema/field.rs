//! Field descriptors for models and custom types.

use serde::{Deserialize, Serialize};

use super::auth::AuthRule;

/// A single field of a [`ModelSchema`](super::ModelSchema).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelField {
    pub name: String,

    /// Wire name, when it differs from `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_name: Option<String>,

    /// Wire type name (`String`, `ID`, `AWSDateTime`, a model or custom type name, ...).
    pub target_type: String,

    #[serde(default)]
    pub is_required: bool,

    #[serde(default)]
    pub is_array: bool,

    #[serde(default)]
    pub is_enum: bool,

    #[serde(default)]
    pub is_primary_key: bool,

    #[serde(default)]
    pub is_custom_type: bool,

    #[serde(default)]
    pub is_model: bool,

    /// To-one reference resolved on demand rather than inline.
    #[serde(default)]
    pub is_lazy: bool,

    #[serde(default)]
    pub is_read_only: bool,

    /// Field-level rules; when present they replace the model rules for this field.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub auth_rules: Vec<AuthRule>,
}

impl ModelField {
    pub fn new(name: impl Into<String>, target_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target_name: None,
            target_type: target_type.into(),
            is_required: false,
            is_array: false,
            is_enum: false,
            is_primary_key: false,
            is_custom_type: false,
            is_model: false,
            is_lazy: false,
            is_read_only: false,
            auth_rules: Vec::new(),
        }
    }

    /// Shorthand for a required `ID!` primary key field.
    pub fn id(name: impl Into<String>) -> Self {
        Self::new(name, "ID").required().primary_key()
    }

    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    pub fn array(mut self) -> Self {
        self.is_array = true;
        self
    }

    pub fn enumeration(mut self) -> Self {
        self.is_enum = true;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    pub fn custom_type(mut self) -> Self {
        self.is_custom_type = true;
        self
    }

    pub fn model(mut self) -> Self {
        self.is_model = true;
        self
    }

    pub fn lazy(mut self) -> Self {
        self.is_lazy = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.is_read_only = true;
        self
    }

    pub fn with_target_name(mut self, target_name: impl Into<String>) -> Self {
        self.target_name = Some(target_name.into());
        self
    }

    pub fn with_auth_rule(mut self, rule: AuthRule) -> Self {
        self.auth_rules.push(rule);
        self
    }

    pub fn target_name_or_name(&self) -> &str {
        self.target_name.as_deref().unwrap_or(&self.name)
    }

    /// A plain value: neither a model reference nor a custom type.
    pub fn is_scalar(&self) -> bool {
        !self.is_model && !self.is_custom_type
    }
}

/// A field of a [`CustomTypeSchema`](super::CustomTypeSchema).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomTypeField {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_name: Option<String>,

    pub target_type: String,

    #[serde(default)]
    pub is_required: bool,

    #[serde(default)]
    pub is_array: bool,

    #[serde(default)]
    pub is_enum: bool,

    #[serde(default)]
    pub is_custom_type: bool,
}

impl CustomTypeField {
    pub fn new(name: impl Into<String>, target_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target_name: None,
            target_type: target_type.into(),
            is_required: false,
            is_array: false,
            is_enum: false,
            is_custom_type: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    pub fn array(mut self) -> Self {
        self.is_array = true;
        self
    }

    pub fn enumeration(mut self) -> Self {
        self.is_enum = true;
        self
    }

    pub fn custom_type(mut self) -> Self {
        self.is_custom_type = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_field() {
        let field = ModelField::id("id");
        assert!(field.is_primary_key);
        assert!(field.is_required);
        assert!(field.is_scalar());
        assert_eq!(field.target_type, "ID");
    }

    #[test]
    fn test_target_name_fallback() {
        let field = ModelField::new("title", "String");
        assert_eq!(field.target_name_or_name(), "title");
        let renamed = field.with_target_name("post_title");
        assert_eq!(renamed.target_name_or_name(), "post_title");
    }

    #[test]
    fn test_model_field_is_not_scalar() {
        assert!(!ModelField::new("blog", "Blog").model().is_scalar());
        assert!(!ModelField::new("address", "Address").custom_type().is_scalar());
    }

    #[test]
    fn test_deserialize_defaults() {
        let field: ModelField =
            serde_json::from_str(r#"{"name": "tags", "targetType": "String", "isArray": true}"#)
                .unwrap();
        assert!(field.is_array);
        assert!(!field.is_required);
        assert!(field.auth_rules.is_empty());
    }
}
