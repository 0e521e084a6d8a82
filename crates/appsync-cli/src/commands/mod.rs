pub mod auth_modes;
pub mod request;
pub mod selection;
pub mod temporal;

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use appsync_core::{SchemaDocument, SchemaRegistry};
use appsync_graphql::GraphQLRequestOptions;
use tracing::debug;

/// Reads a schema document and registers it into a fresh registry.
fn load_registry(path: &Path) -> Result<Arc<SchemaRegistry>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema file: {}", path.display()))?;
    let document = SchemaDocument::from_json_str(&content)
        .with_context(|| format!("Invalid schema document: {}", path.display()))?;

    let registry = SchemaRegistry::new();
    document.register_into(&registry)?;
    debug!(
        path = %path.display(),
        models = registry.model_names().len(),
        "Loaded schema document"
    );
    Ok(Arc::new(registry))
}

/// API defaults unless an options file is given.
fn load_options(path: Option<&Path>) -> Result<GraphQLRequestOptions> {
    let Some(path) = path else {
        return Ok(GraphQLRequestOptions::api());
    };
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read options file: {}", path.display()))?;
    Ok(GraphQLRequestOptions::from_toml_str(&content)?)
}
