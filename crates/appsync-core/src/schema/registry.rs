//! Schema registry keyed by type name.
//!
//! Models and custom types live in separate maps, so a model and a custom
//! type may share a name without clobbering each other. Uses DashMap for
//! concurrent reads; registration is an upsert and is expected to happen
//! during setup.
//!
//! Construct an isolated registry with [`SchemaRegistry::new`] and pass it
//! by handle. [`SchemaRegistry::global`] exists only for top-level wiring.

use std::sync::{Arc, LazyLock};

use dashmap::DashMap;
use tracing::debug;

use super::model::{CustomTypeSchema, ModelSchema};
use crate::error::{CoreError, Result};

static GLOBAL: LazyLock<Arc<SchemaRegistry>> = LazyLock::new(|| Arc::new(SchemaRegistry::new()));

/// Lookup table from type name to its structural schema.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    models: DashMap<String, Arc<ModelSchema>>,
    custom_types: DashMap<String, Arc<CustomTypeSchema>>,
}

impl SchemaRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry handle.
    pub fn global() -> Arc<SchemaRegistry> {
        Arc::clone(&GLOBAL)
    }

    /// Register (or replace) a model schema under `name`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidSchema` when `name` is empty.
    pub fn register_model(&self, name: impl Into<String>, schema: ModelSchema) -> Result<()> {
        let name = ensure_name(name.into())?;
        debug!(type_name = %name, fields = schema.fields().len(), "Registering model schema");
        self.models.insert(name, Arc::new(schema));
        Ok(())
    }

    /// Register a model schema under its own name.
    pub fn register(&self, schema: ModelSchema) -> Result<()> {
        self.register_model(schema.name().to_string(), schema)
    }

    /// Register (or replace) a custom type schema under `name`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidSchema` when `name` is empty.
    pub fn register_custom_type(
        &self,
        name: impl Into<String>,
        schema: CustomTypeSchema,
    ) -> Result<()> {
        let name = ensure_name(name.into())?;
        debug!(type_name = %name, fields = schema.fields().len(), "Registering custom type schema");
        self.custom_types.insert(name, Arc::new(schema));
        Ok(())
    }

    pub fn get_model(&self, name: &str) -> Option<Arc<ModelSchema>> {
        self.models.get(name).map(|entry| Arc::clone(entry.value()))
    }

    pub fn get_custom_type(&self, name: &str) -> Option<Arc<CustomTypeSchema>> {
        self.custom_types.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// Resolve a model schema or fail with a schema error.
    pub fn model_schema(&self, name: &str) -> Result<Arc<ModelSchema>> {
        self.get_model(name)
            .ok_or_else(|| CoreError::schema_not_found(name))
    }

    /// Resolve a custom type schema or fail with a schema error.
    pub fn custom_type_schema(&self, name: &str) -> Result<Arc<CustomTypeSchema>> {
        self.get_custom_type(name)
            .ok_or_else(|| CoreError::custom_type_not_found(name))
    }

    pub fn contains_model(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    /// Registered model names, sorted.
    pub fn model_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.models.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Registered custom type names, sorted.
    pub fn custom_type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.custom_types.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Total number of registered schemas of either kind.
    pub fn len(&self) -> usize {
        self.models.len() + self.custom_types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty() && self.custom_types.is_empty()
    }

    /// Remove every registered schema.
    pub fn clear(&self) {
        debug!(
            models = self.models.len(),
            custom_types = self.custom_types.len(),
            "Clearing schema registry"
        );
        self.models.clear();
        self.custom_types.clear();
    }
}

fn ensure_name(name: String) -> Result<String> {
    if name.trim().is_empty() {
        return Err(CoreError::invalid_schema("schema name must not be empty"));
    }
    Ok(name)
}
