//! Request options.
//!
//! Options control how far the selection-set builder follows relationships
//! and how paginated results are shaped. They can be loaded from TOML:
//!
//! ```toml
//! max_depth = 3
//! leaf_serialization_behavior = "just_id"
//! list_items_field_name = "items"
//! pagination_token_field_name = "nextToken"
//! include_paths = ["comments", "comments.author"]
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::GraphQLError;

/// How a relationship that is not expanded is represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeafSerializationBehavior {
    /// Expand relationships up to the depth budget.
    #[default]
    Full,
    /// Collapse every relationship to its primary-key fields.
    JustId,
}

/// Options for selection-set and request building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphQLRequestOptions {
    /// Relationship levels expanded below the root.
    /// Default: 2
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Default: full
    #[serde(default)]
    pub leaf_serialization_behavior: LeafSerializationBehavior,

    /// List field of the pagination envelope.
    /// Default: "items"
    #[serde(default = "default_list_items_field_name")]
    pub list_items_field_name: String,

    /// Token field of the pagination envelope.
    /// Default: "nextToken"
    #[serde(default = "default_pagination_token_field_name")]
    pub pagination_token_field_name: String,

    /// Extra fields selected next to the token (e.g. `startedAt` for sync queries).
    #[serde(default)]
    pub pagination_meta_fields: Vec<String>,

    /// Bookkeeping fields selected on every model (e.g. `_version`).
    #[serde(default)]
    pub model_meta_fields: Vec<String>,

    /// Dotted relationship paths, relative to the root type, that are loaded eagerly.
    #[serde(default)]
    pub include_paths: BTreeSet<String>,
}

fn default_max_depth() -> usize {
    2
}

fn default_list_items_field_name() -> String {
    "items".to_string()
}

fn default_pagination_token_field_name() -> String {
    "nextToken".to_string()
}

impl Default for GraphQLRequestOptions {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            leaf_serialization_behavior: LeafSerializationBehavior::default(),
            list_items_field_name: default_list_items_field_name(),
            pagination_token_field_name: default_pagination_token_field_name(),
            pagination_meta_fields: Vec::new(),
            model_meta_fields: Vec::new(),
            include_paths: BTreeSet::new(),
        }
    }
}

impl GraphQLRequestOptions {
    /// Options for plain API requests.
    pub fn api() -> Self {
        Self::default()
    }

    /// Options for sync-engine requests: shallow, id-only relationships and
    /// conflict-resolution metadata on every model.
    pub fn sync() -> Self {
        Self {
            max_depth: 1,
            leaf_serialization_behavior: LeafSerializationBehavior::JustId,
            pagination_meta_fields: vec!["startedAt".to_string()],
            model_meta_fields: vec![
                "_deleted".to_string(),
                "_lastChangedAt".to_string(),
                "_version".to_string(),
            ],
            ..Self::default()
        }
    }

    /// Parse and validate options from TOML.
    ///
    /// # Errors
    ///
    /// Returns `GraphQLError::InvalidOptions` on malformed TOML or invalid values.
    pub fn from_toml_str(input: &str) -> Result<Self, GraphQLError> {
        let options: Self =
            toml::from_str(input).map_err(|e| GraphQLError::InvalidOptions(e.to_string()))?;
        options.validate().map_err(GraphQLError::InvalidOptions)?;
        Ok(options)
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_leaf_serialization_behavior(mut self, behavior: LeafSerializationBehavior) -> Self {
        self.leaf_serialization_behavior = behavior;
        self
    }

    #[must_use]
    pub fn with_include_path(mut self, path: impl Into<String>) -> Self {
        self.include_paths.insert(path.into());
        self
    }

    /// Whether `path` or any path below it was requested eagerly.
    pub fn includes_path(&self, path: &str) -> bool {
        self.include_paths.iter().any(|included| {
            included == path
                || included
                    .strip_prefix(path)
                    .is_some_and(|rest| rest.starts_with('.'))
        })
    }

    /// Validates the options.
    ///
    /// # Errors
    ///
    /// Returns an error if an envelope field name is empty or clashes with the
    /// list field, or if an include path has an empty segment.
    pub fn validate(&self) -> Result<(), String> {
        if self.list_items_field_name.trim().is_empty() {
            return Err("list_items_field_name must not be empty".into());
        }
        if self.pagination_token_field_name.trim().is_empty() {
            return Err("pagination_token_field_name must not be empty".into());
        }
        if self.pagination_token_field_name == self.list_items_field_name {
            return Err("pagination_token_field_name must differ from list_items_field_name".into());
        }
        if self
            .pagination_meta_fields
            .iter()
            .any(|f| f.trim().is_empty() || *f == self.list_items_field_name)
        {
            return Err(
                "pagination_meta_fields must be non-empty and differ from list_items_field_name"
                    .into(),
            );
        }
        if self.model_meta_fields.iter().any(|f| f.trim().is_empty()) {
            return Err("model_meta_fields must not contain empty names".into());
        }
        if let Some(path) = self
            .include_paths
            .iter()
            .find(|p| p.split('.').any(|segment| segment.trim().is_empty()))
        {
            return Err(format!("include path '{path}' has an empty segment"));
        }
        Ok(())
    }
}
