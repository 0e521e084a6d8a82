//! Selection-set construction.
//!
//! Turns a possibly cyclic model graph into a finite, deterministic GraphQL
//! selection. Children are kept in a name-ordered map, so output never depends
//! on field declaration order. Recursion is bounded three ways:
//!
//! - to-many and lazy relationships are omitted unless an include path asks for them
//! - relationships past the depth budget (or all of them under `just_id`) collapse
//!   to their primary-key fields
//! - a relationship that re-enters a model already open on the current path
//!   collapses to its primary-key fields regardless of budget

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;

use appsync_core::{CustomTypeSchema, ModelField, ModelOperation, ModelSchema, SchemaRegistry};
use tracing::{debug, trace, warn};

use crate::Result;
use crate::config::{GraphQLRequestOptions, LeafSerializationBehavior};
use crate::operation::OperationType;

const INDENT: &str = "  ";

/// A node of a GraphQL selection: a field name plus the fields selected below it.
///
/// The root node has no name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SelectionSet {
    name: Option<String>,
    children: BTreeMap<String, SelectionSet>,
}

impl SelectionSet {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn field(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            children: BTreeMap::new(),
        }
    }

    /// Build the selection for `root_type` with a throwaway builder.
    pub fn build(
        registry: &SchemaRegistry,
        root_type: &str,
        operation: OperationType,
        options: &GraphQLRequestOptions,
    ) -> Result<Self> {
        SelectionSetBuilder::new(registry, options).build(root_type, operation)
    }

    #[must_use]
    pub fn with_child(mut self, child: SelectionSet) -> Self {
        self.insert(child);
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = SelectionSet>) -> Self {
        for child in children {
            self.insert(child);
        }
        self
    }

    /// Add a child, merging with an existing child of the same name.
    /// An unnamed child contributes its own children.
    pub fn insert(&mut self, child: SelectionSet) {
        let Some(name) = child.name.clone() else {
            for grandchild in child.children.into_values() {
                self.insert(grandchild);
            }
            return;
        };
        match self.children.entry(name) {
            Entry::Vacant(slot) => {
                slot.insert(child);
            }
            Entry::Occupied(mut slot) => {
                for grandchild in child.children.into_values() {
                    slot.get_mut().insert(grandchild);
                }
            }
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn child(&self, name: &str) -> Option<&SelectionSet> {
        self.children.get(name)
    }

    pub fn children(&self) -> impl Iterator<Item = &SelectionSet> {
        self.children.values()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Renders ` {` + children + `}` with children indented one level below `margin`.
    /// A leaf renders as the empty string.
    pub fn render_block(&self, margin: &str) -> String {
        let mut out = String::new();
        self.write_block(&mut out, margin);
        out
    }

    fn write_block(&self, out: &mut String, margin: &str) {
        if self.children.is_empty() {
            return;
        }
        let inner = format!("{margin}{INDENT}");
        out.push_str(" {\n");
        for (i, child) in self.children.values().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&inner);
            out.push_str(child.name.as_deref().unwrap_or_default());
            child.write_block(out, &inner);
        }
        out.push('\n');
        out.push_str(margin);
        out.push('}');
    }
}

impl fmt::Display for SelectionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name}{}", self.render_block("")),
            None => f.write_str(self.render_block("").trim_start()),
        }
    }
}

/// Builds selection sets against a registry.
#[derive(Debug, Clone, Copy)]
pub struct SelectionSetBuilder<'a> {
    registry: &'a SchemaRegistry,
    options: &'a GraphQLRequestOptions,
}

impl<'a> SelectionSetBuilder<'a> {
    pub fn new(registry: &'a SchemaRegistry, options: &'a GraphQLRequestOptions) -> Self {
        Self { registry, options }
    }

    /// Resolve `root_type` and build its selection.
    ///
    /// # Errors
    ///
    /// Returns a schema error if the root or any expanded relationship or
    /// custom type is not registered.
    pub fn build(&self, root_type: &str, operation: OperationType) -> Result<SelectionSet> {
        let schema = self.registry.model_schema(root_type)?;
        self.build_for_schema(&schema, operation)
    }

    /// Build the selection for an already resolved root schema.
    pub fn build_for_schema(
        &self,
        schema: &ModelSchema,
        operation: OperationType,
    ) -> Result<SelectionSet> {
        debug!(
            type_name = %schema.name(),
            operation = %operation,
            max_depth = self.options.max_depth,
            "Building selection set"
        );

        let mut walk = Walk {
            registry: self.registry,
            options: self.options,
            operation,
            open_models: Vec::new(),
            open_custom_types: Vec::new(),
            path: Vec::new(),
        };
        let fields = walk.model_fields(schema, self.options.max_depth)?;

        let root = if operation.is_paginated() {
            SelectionSet::root().with_children(pagination_envelope(self.options, fields))
        } else {
            SelectionSet::root().with_children(fields)
        };

        debug!(
            type_name = %schema.name(),
            fields = root.children.len(),
            "Built selection set"
        );
        Ok(root)
    }
}

/// `{ items { ... } nextToken <meta...> }`
fn pagination_envelope(
    options: &GraphQLRequestOptions,
    items: Vec<SelectionSet>,
) -> Vec<SelectionSet> {
    let mut envelope = vec![
        SelectionSet::field(&options.list_items_field_name).with_children(items),
        SelectionSet::field(&options.pagination_token_field_name),
    ];
    envelope.extend(options.pagination_meta_fields.iter().map(SelectionSet::field));
    envelope
}

fn primary_key_leaf(schema: &ModelSchema) -> Vec<SelectionSet> {
    schema
        .primary_index_fields()
        .into_iter()
        .map(SelectionSet::field)
        .collect()
}

/// State of one recursive expansion. The open-type stacks and the field path
/// describe only the current branch and are unwound on the way back up.
struct Walk<'a> {
    registry: &'a SchemaRegistry,
    options: &'a GraphQLRequestOptions,
    operation: OperationType,
    open_models: Vec<String>,
    open_custom_types: Vec<String>,
    path: Vec<String>,
}

impl Walk<'_> {
    fn model_fields(&mut self, schema: &ModelSchema, depth: usize) -> Result<Vec<SelectionSet>> {
        self.open_models.push(schema.name().to_string());
        let fields = self.collect_model_fields(schema, depth);
        self.open_models.pop();
        fields
    }

    fn collect_model_fields(
        &mut self,
        schema: &ModelSchema,
        depth: usize,
    ) -> Result<Vec<SelectionSet>> {
        let mut fields = Vec::with_capacity(schema.fields().len());

        for field in schema.fields().values() {
            if field.is_model {
                self.path.push(field.name.clone());
                let node = self.relationship(schema, field, depth);
                self.path.pop();
                fields.extend(node?);
            } else if field.is_custom_type {
                fields.extend(self.custom_type(&field.name, &field.target_type)?);
            } else {
                fields.push(SelectionSet::field(&field.name));
            }
        }

        let operations = [ModelOperation::Read, self.operation.model_operation()];
        fields.extend(
            schema
                .auth_rules()
                .iter()
                .filter(|rule| rule.is_owner_rule() && operations.iter().any(|op| rule.applies_to(*op)))
                .map(|rule| SelectionSet::field(rule.owner_field_or_default())),
        );

        fields.extend(
            schema
                .meta_fields()
                .iter()
                .chain(&self.options.model_meta_fields)
                .map(SelectionSet::field),
        );

        Ok(fields)
    }

    fn relationship(
        &mut self,
        schema: &ModelSchema,
        field: &ModelField,
        depth: usize,
    ) -> Result<Option<SelectionSet>> {
        let path = self.path.join(".");
        let to_many = field.is_array
            || schema
                .association(&field.name)
                .is_some_and(|association| association.is_to_many());
        let included = self.options.includes_path(&path);

        if (to_many || field.is_lazy) && !included {
            trace!(path = %path, "Omitting lazily loaded relationship");
            return Ok(None);
        }

        let target = self.registry.model_schema(&field.target_type)?;
        let children = if self.open_models.iter().any(|open| open == target.name()) {
            trace!(
                path = %path,
                type_name = %target.name(),
                "Relationship re-enters an open type, selecting primary key only"
            );
            primary_key_leaf(&target)
        } else if !included
            && (depth == 0
                || self.options.leaf_serialization_behavior == LeafSerializationBehavior::JustId)
        {
            trace!(path = %path, depth, "Relationship collapsed to primary key");
            primary_key_leaf(&target)
        } else {
            self.model_fields(&target, depth.saturating_sub(1))?
        };

        let node = if to_many {
            SelectionSet::field(&field.name).with_children(pagination_envelope(self.options, children))
        } else {
            SelectionSet::field(&field.name).with_children(children)
        };
        Ok(Some(node))
    }

    fn custom_type(&mut self, field_name: &str, type_name: &str) -> Result<Option<SelectionSet>> {
        if self.open_custom_types.iter().any(|open| open == type_name) {
            warn!(
                field = field_name,
                type_name,
                "Recursive custom type cannot be selected, skipping field"
            );
            return Ok(None);
        }

        let schema = self.registry.custom_type_schema(type_name)?;
        self.open_custom_types.push(type_name.to_string());
        let children = self.custom_type_fields(&schema);
        self.open_custom_types.pop();

        Ok(Some(SelectionSet::field(field_name).with_children(children?)))
    }

    fn custom_type_fields(&mut self, schema: &CustomTypeSchema) -> Result<Vec<SelectionSet>> {
        let mut fields = Vec::with_capacity(schema.fields().len());
        for field in schema.fields().values() {
            if field.is_custom_type {
                fields.extend(self.custom_type(&field.name, &field.target_type)?);
            } else {
                fields.push(SelectionSet::field(&field.name));
            }
        }
        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{QueryType, SubscriptionType};
    use appsync_core::{AuthRule, CustomTypeField};

    fn blog_registry() -> SchemaRegistry {
        let registry = SchemaRegistry::new();
        registry
            .register(
                ModelSchema::builder("Blog")
                    .field(ModelField::id("id"))
                    .field(ModelField::new("name", "String").required())
                    .has_many("posts", "Post", "blog")
                    .build()
                    .unwrap(),
            )
            .unwrap();
        registry
            .register(
                ModelSchema::builder("Post")
                    .field(ModelField::id("id"))
                    .field(ModelField::new("title", "String").required())
                    .belongs_to("blog", "Blog", ["blogId"])
                    .has_many("comments", "Comment", "post")
                    .auth_rule(AuthRule::owner())
                    .build()
                    .unwrap(),
            )
            .unwrap();
        registry
            .register(
                ModelSchema::builder("Comment")
                    .field(ModelField::id("id"))
                    .field(ModelField::new("content", "String"))
                    .belongs_to("post", "Post", ["postId"])
                    .build()
                    .unwrap(),
            )
            .unwrap();
        registry
    }

    const GET: OperationType = OperationType::Query(QueryType::Get);

    #[test]
    fn test_get_expands_to_one_and_omits_to_many() {
        let registry = blog_registry();
        let options = GraphQLRequestOptions::default();
        let selection = SelectionSet::build(&registry, "Post", GET, &options).unwrap();
        assert_eq!(
            selection.to_string(),
            "{\n  blog {\n    id\n    name\n  }\n  id\n  owner\n  title\n}"
        );
    }

    #[test]
    fn test_nested_depth_budget() {
        let registry = blog_registry();
        let options = GraphQLRequestOptions::default();
        let selection = SelectionSet::build(&registry, "Comment", GET, &options).unwrap();
        let post = selection.child("post").unwrap();
        let blog = post.child("blog").unwrap();
        assert!(blog.child("name").is_some());
        assert!(post.child("owner").is_some());
        assert!(post.child("comments").is_none());
    }

    #[test]
    fn test_zero_depth_collapses_to_primary_key() {
        let registry = blog_registry();
        let options = GraphQLRequestOptions::default().with_max_depth(0);
        let selection = SelectionSet::build(&registry, "Comment", GET, &options).unwrap();
        assert_eq!(
            selection.to_string(),
            "{\n  content\n  id\n  post {\n    id\n  }\n}"
        );
    }

    #[test]
    fn test_just_id_collapses_relationships() {
        let registry = blog_registry();
        let options = GraphQLRequestOptions::default()
            .with_leaf_serialization_behavior(LeafSerializationBehavior::JustId);
        let selection = SelectionSet::build(&registry, "Post", GET, &options).unwrap();
        let blog = selection.child("blog").unwrap();
        let names: Vec<_> = blog.children().filter_map(SelectionSet::name).collect();
        assert_eq!(names, vec!["id"]);
    }

    #[test]
    fn test_include_path_loads_to_many_with_envelope() {
        let registry = blog_registry();
        let options = GraphQLRequestOptions::default().with_include_path("comments");
        let selection = SelectionSet::build(&registry, "Post", GET, &options).unwrap();
        assert_eq!(
            selection.child("comments").unwrap().to_string(),
            "comments {\n  items {\n    content\n    id\n    post {\n      id\n    }\n  }\n  nextToken\n}"
        );
    }

    #[test]
    fn test_list_wraps_root_in_envelope() {
        let registry = blog_registry();
        let options = GraphQLRequestOptions::sync();
        let selection =
            SelectionSet::build(&registry, "Post", OperationType::Query(QueryType::Sync), &options)
                .unwrap();
        assert_eq!(
            selection.to_string(),
            "{\n  items {\n    _deleted\n    _lastChangedAt\n    _version\n    blog {\n      id\n    }\n    id\n    owner\n    title\n  }\n  nextToken\n  startedAt\n}"
        );
    }

    #[test]
    fn test_self_referential_pair_terminates() {
        let registry = SchemaRegistry::new();
        registry
            .register(
                ModelSchema::builder("Husband")
                    .field(ModelField::id("id"))
                    .has_one("wife", "Wife", "husband")
                    .build()
                    .unwrap(),
            )
            .unwrap();
        registry
            .register(
                ModelSchema::builder("Wife")
                    .field(ModelField::id("id"))
                    .belongs_to("husband", "Husband", ["husbandId"])
                    .build()
                    .unwrap(),
            )
            .unwrap();

        let options = GraphQLRequestOptions::default().with_max_depth(10);
        let selection = SelectionSet::build(&registry, "Husband", GET, &options).unwrap();
        assert_eq!(
            selection.to_string(),
            "{\n  id\n  wife {\n    husband {\n      id\n    }\n    id\n  }\n}"
        );
    }

    #[test]
    fn test_order_independent_of_declaration() {
        let forward = SchemaRegistry::new();
        forward
            .register(
                ModelSchema::builder("Note")
                    .field(ModelField::id("id"))
                    .field(ModelField::new("body", "String"))
                    .field(ModelField::new("author", "String"))
                    .build()
                    .unwrap(),
            )
            .unwrap();
        let backward = SchemaRegistry::new();
        backward
            .register(
                ModelSchema::builder("Note")
                    .field(ModelField::new("author", "String"))
                    .field(ModelField::new("body", "String"))
                    .field(ModelField::id("id"))
                    .build()
                    .unwrap(),
            )
            .unwrap();

        let options = GraphQLRequestOptions::default();
        let a = SelectionSet::build(&forward, "Note", GET, &options).unwrap().to_string();
        let b = SelectionSet::build(&backward, "Note", GET, &options).unwrap().to_string();
        assert_eq!(a, b);
        assert_eq!(a, SelectionSet::build(&forward, "Note", GET, &options).unwrap().to_string());
    }

    #[test]
    fn test_custom_types_are_recursed() {
        let registry = SchemaRegistry::new();
        registry
            .register_custom_type(
                "Geo",
                CustomTypeSchema::new(
                    "Geo",
                    [CustomTypeField::new("lat", "Float"), CustomTypeField::new("lng", "Float")],
                )
                .unwrap(),
            )
            .unwrap();
        registry
            .register_custom_type(
                "Address",
                CustomTypeSchema::new(
                    "Address",
                    [
                        CustomTypeField::new("city", "String"),
                        CustomTypeField::new("geo", "Geo").custom_type(),
                    ],
                )
                .unwrap(),
            )
            .unwrap();
        registry
            .register(
                ModelSchema::builder("Store")
                    .field(ModelField::id("id"))
                    .field(ModelField::new("address", "Address").custom_type())
                    .build()
                    .unwrap(),
            )
            .unwrap();

        let options = GraphQLRequestOptions::default().with_max_depth(0);
        let selection = SelectionSet::build(&registry, "Store", GET, &options).unwrap();
        assert_eq!(
            selection.to_string(),
            "{\n  address {\n    city\n    geo {\n      lat\n      lng\n    }\n  }\n  id\n}"
        );
    }

    #[test]
    fn test_recursive_custom_type_field_is_skipped() {
        let registry = SchemaRegistry::new();
        registry
            .register_custom_type(
                "Category",
                CustomTypeSchema::new(
                    "Category",
                    [
                        CustomTypeField::new("label", "String"),
                        CustomTypeField::new("parent", "Category").custom_type(),
                    ],
                )
                .unwrap(),
            )
            .unwrap();
        registry
            .register(
                ModelSchema::builder("Product")
                    .field(ModelField::id("id"))
                    .field(ModelField::new("category", "Category").custom_type())
                    .build()
                    .unwrap(),
            )
            .unwrap();

        let options = GraphQLRequestOptions::default();
        let selection = SelectionSet::build(&registry, "Product", GET, &options).unwrap();
        let category = selection.child("category").unwrap();
        assert!(category.child("label").is_some());
        assert!(category.child("parent").is_none());
    }

    #[test]
    fn test_unregistered_relationship_target_is_schema_error() {
        let registry = SchemaRegistry::new();
        registry
            .register(
                ModelSchema::builder("Orphan")
                    .field(ModelField::id("id"))
                    .belongs_to("parent", "Missing", ["parentId"])
                    .build()
                    .unwrap(),
            )
            .unwrap();

        let options = GraphQLRequestOptions::default();
        let err = SelectionSet::build(&registry, "Orphan", GET, &options).unwrap_err();
        assert!(err.is_schema_error());
        assert!(SelectionSet::build(&registry, "Nobody", GET, &options).is_err());
    }

    #[test]
    fn test_owner_field_follows_rule_operations() {
        let registry = SchemaRegistry::new();
        registry
            .register(
                ModelSchema::builder("Draft")
                    .field(ModelField::id("id"))
                    .auth_rule(
                        AuthRule::owner()
                            .with_owner_field("author")
                            .with_operations([ModelOperation::Create]),
                    )
                    .build()
                    .unwrap(),
            )
            .unwrap();
        let options = GraphQLRequestOptions::default();

        let read = SelectionSet::build(&registry, "Draft", GET, &options).unwrap();
        assert!(read.child("author").is_none());

        let on_create = SelectionSet::build(
            &registry,
            "Draft",
            OperationType::Subscription(SubscriptionType::OnCreate),
            &options,
        )
        .unwrap();
        assert!(on_create.child("author").is_some());
    }

    #[test]
    fn test_insert_merges_same_name() {
        let selection = SelectionSet::root()
            .with_child(SelectionSet::field("a").with_child(SelectionSet::field("x")))
            .with_child(SelectionSet::field("a").with_child(SelectionSet::field("y")));
        assert_eq!(selection.to_string(), "{\n  a {\n    x\n    y\n  }\n}");
    }
}
