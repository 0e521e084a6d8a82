//! JSON schema documents.
//!
//! A document bundles every model and custom type of an application so the
//! whole graph can be registered in one step:
//!
//! ```json
//! {
//!   "models": [{ "name": "Post", "fields": [{ "name": "id", "targetType": "ID", "isPrimaryKey": true }] }],
//!   "customTypes": [{ "name": "Address", "fields": [{ "name": "city", "targetType": "String" }] }]
//! }
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::model::{CustomTypeSchema, ModelSchema};
use super::registry::SchemaRegistry;
use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDocument {
    #[serde(default)]
    pub models: Vec<ModelSchema>,

    #[serde(default)]
    pub custom_types: Vec<CustomTypeSchema>,
}

impl SchemaDocument {
    /// Parse a document from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate every schema, then register all of them.
    ///
    /// Nothing is registered if any schema is invalid.
    pub fn register_into(&self, registry: &SchemaRegistry) -> Result<()> {
        for model in &self.models {
            model.validate()?;
        }
        for custom_type in &self.custom_types {
            custom_type.validate()?;
        }

        for custom_type in &self.custom_types {
            registry.register_custom_type(custom_type.name().to_string(), custom_type.clone())?;
        }
        for model in &self.models {
            registry.register(model.clone())?;
        }

        debug!(
            models = self.models.len(),
            custom_types = self.custom_types.len(),
            "Registered schema document"
        );
        Ok(())
    }
}
