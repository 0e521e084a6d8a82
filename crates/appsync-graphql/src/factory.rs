//! Standard AppSync requests for a registered model.
//!
//! The factory knows the argument conventions of the generated AppSync API:
//! `get` takes an `ID!`, `list` and `sync` take a `Model{Type}FilterInput`,
//! mutations take a `{Verb}{Type}Input!` and an optional condition.

use std::sync::Arc;

use appsync_core::{AssociationKind, ModelSchema, SchemaRegistry};
use serde_json::{Map, Value};
use tracing::debug;

use crate::Result;
use crate::config::GraphQLRequestOptions;
use crate::error::GraphQLError;
use crate::operation::{MutationType, OperationType, QueryType, SubscriptionType};
use crate::predicate::{GroupType, QueryPredicate};
use crate::request::{GraphQLRequest, GraphQLRequestBuilder};
use crate::variables::VariableValue;

/// Conflict-resolution version passed through delete inputs.
const VERSION_FIELD: &str = "_version";

/// Builds requests against one registry.
#[derive(Debug, Clone)]
pub struct AppSyncRequestFactory {
    registry: Arc<SchemaRegistry>,
    options: GraphQLRequestOptions,
    sync_options: GraphQLRequestOptions,
}

impl AppSyncRequestFactory {
    /// Factory with API options for ordinary requests and sync options for `sync`.
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self {
            registry,
            options: GraphQLRequestOptions::api(),
            sync_options: GraphQLRequestOptions::sync(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: GraphQLRequestOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_sync_options(mut self, options: GraphQLRequestOptions) -> Self {
        self.sync_options = options;
        self
    }

    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    /// `query GetPost($id: ID!)`
    pub fn get(&self, model_type: &str, id: &str) -> Result<GraphQLRequest> {
        self.builder(model_type, QueryType::Get, &self.options)
            .with_variable("id", "ID!", id)
            .build()
    }

    /// `query ListPosts($filter: ModelPostFilterInput, $limit: Int[, $nextToken: String])`
    ///
    /// Filter and limit are always declared and sent as `null` when absent.
    pub fn list(
        &self,
        model_type: &str,
        filter: &QueryPredicate,
        limit: Option<i64>,
        next_token: Option<&str>,
    ) -> Result<GraphQLRequest> {
        let mut builder = self
            .builder(model_type, QueryType::List, &self.options)
            .with_variable("filter", filter_input_type(model_type), filter_value(filter))
            .with_variable("limit", "Int", limit);
        if let Some(token) = next_token {
            builder = builder.with_variable("nextToken", "String", token);
        }
        builder.build()
    }

    /// `query SyncPosts(...)`: a base sync without `last_sync`, a delta sync with it.
    ///
    /// Only the arguments that are given are declared. A filter that is not
    /// already a group is wrapped in an `and` group.
    pub fn sync(
        &self,
        model_type: &str,
        last_sync: Option<i64>,
        filter: &QueryPredicate,
        limit: Option<i64>,
        next_token: Option<&str>,
    ) -> Result<GraphQLRequest> {
        let mut builder = self.builder(model_type, QueryType::Sync, &self.sync_options);
        if let Some(last_sync) = last_sync {
            builder = builder.with_variable("lastSync", "AWSTimestamp", last_sync);
        }
        if let Some(limit) = limit {
            builder = builder.with_variable("limit", "Int", limit);
        }
        if let Some(token) = next_token {
            builder = builder.with_variable("nextToken", "String", token);
        }
        if !filter.is_all() {
            let filter = match filter {
                QueryPredicate::Group { .. } => filter.clone(),
                other => QueryPredicate::Group {
                    kind: GroupType::And,
                    predicates: vec![other.clone()],
                },
            };
            builder = builder.with_variable(
                "filter",
                filter_input_type(model_type),
                filter_value(&filter),
            );
        }
        builder.build()
    }

    /// `mutation CreatePost($input: CreatePostInput![, $condition: ModelPostConditionInput])`
    ///
    /// Delete inputs keep only the primary-index fields and `_version`. Create
    /// and update inputs drop read-only fields and null owner fields, and a
    /// `belongs_to` value given as an object is replaced by its key fields.
    ///
    /// # Errors
    ///
    /// Returns `GraphQLError::InvalidVariables` when `input` is not an object.
    pub fn mutation(
        &self,
        model_type: &str,
        mutation: MutationType,
        input: Value,
        condition: &QueryPredicate,
    ) -> Result<GraphQLRequest> {
        let schema = self.registry.model_schema(model_type)?;
        let Value::Object(input) = input else {
            return Err(GraphQLError::InvalidVariables(format!(
                "{} input for {model_type} must be a JSON object",
                OperationType::from(mutation)
            )));
        };

        let input = match mutation {
            MutationType::Delete => delete_input(&schema, input),
            MutationType::Create | MutationType::Update => {
                self.write_input(&schema, mutation, input)?
            }
        };

        let input_type = format!("{}{}Input!", OperationType::from(mutation).verb(), model_type);
        let mut builder = self
            .builder(model_type, mutation, &self.options)
            .with_model_schema(Arc::clone(&schema))
            .with_variable("input", input_type, Value::Object(input));
        if let Some(condition) = condition.to_filter_json() {
            builder = builder.with_variable(
                "condition",
                format!("Model{model_type}ConditionInput"),
                condition,
            );
        }
        builder.build()
    }

    /// `subscription OnCreatePost[($owner: String!)]`
    ///
    /// # Errors
    ///
    /// Returns `GraphQLError::MissingField("owner")` when an owner rule
    /// requires the argument and none was given.
    pub fn subscription(
        &self,
        model_type: &str,
        subscription: SubscriptionType,
        owner: Option<&str>,
    ) -> Result<GraphQLRequest> {
        let mut builder = self.builder(model_type, subscription, &self.options);
        if let Some(owner) = owner {
            builder = builder.with_owner(owner);
        }
        let request = builder.build()?;
        if request.is_owner_argument_required() && owner.is_none() {
            return Err(GraphQLError::MissingField("owner"));
        }
        Ok(request)
    }

    fn builder(
        &self,
        model_type: &str,
        operation: impl Into<OperationType>,
        options: &GraphQLRequestOptions,
    ) -> GraphQLRequestBuilder {
        GraphQLRequest::builder()
            .with_registry(Arc::clone(&self.registry))
            .with_model_type(model_type)
            .with_operation(operation)
            .with_request_options(options.clone())
    }

    fn write_input(
        &self,
        schema: &ModelSchema,
        mutation: MutationType,
        input: Map<String, Value>,
    ) -> Result<Map<String, Value>> {
        let owner_fields: Vec<&str> = schema
            .auth_rules()
            .iter()
            .filter(|rule| rule.is_owner_rule())
            .map(|rule| rule.owner_field_or_default())
            .collect();

        let mut out = Map::with_capacity(input.len());
        for (name, value) in input {
            if schema.field(&name).is_some_and(|field| field.is_read_only) {
                debug!(type_name = %schema.name(), field = %name, ?mutation, "Dropping read-only field");
                continue;
            }
            if value.is_null() && owner_fields.contains(&name.as_str()) {
                continue;
            }
            match (schema.association(&name), value) {
                (Some(association), Value::Object(related))
                    if association.kind == AssociationKind::BelongsTo =>
                {
                    let target = self.registry.model_schema(&association.associated_type)?;
                    for (target_name, key) in association
                        .target_names
                        .iter()
                        .zip(target.primary_index_fields())
                    {
                        let key_value = related.get(key).cloned().unwrap_or(Value::Null);
                        out.insert(target_name.clone(), key_value);
                    }
                }
                (_, value) => {
                    out.insert(name, value);
                }
            }
        }
        Ok(out)
    }
}

fn delete_input(schema: &ModelSchema, input: Map<String, Value>) -> Map<String, Value> {
    let keys = schema.primary_index_fields();
    input
        .into_iter()
        .filter(|(name, _)| name == VERSION_FIELD || keys.contains(&name.as_str()))
        .collect()
}

fn filter_input_type(model_type: &str) -> String {
    format!("Model{model_type}FilterInput")
}

fn filter_value(filter: &QueryPredicate) -> VariableValue {
    filter
        .to_filter_json()
        .map_or(VariableValue::Null, VariableValue::Object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::QueryField;
    use appsync_core::{AuthRule, ModelField, ModelOperation};
    use serde_json::json;

    fn factory() -> AppSyncRequestFactory {
        let registry = SchemaRegistry::new();
        registry
            .register(
                ModelSchema::builder("Blog")
                    .field(ModelField::id("id"))
                    .field(ModelField::new("name", "String").required())
                    .build()
                    .unwrap(),
            )
            .unwrap();
        registry
            .register(
                ModelSchema::builder("Post")
                    .field(ModelField::id("id"))
                    .field(ModelField::new("title", "String").required())
                    .field(ModelField::new("createdAt", "AWSDateTime").read_only())
                    .belongs_to("blog", "Blog", ["blogId"])
                    .auth_rule(AuthRule::owner())
                    .build()
                    .unwrap(),
            )
            .unwrap();
        registry
            .register(
                ModelSchema::builder("Note")
                    .field(ModelField::id("id"))
                    .field(ModelField::new("body", "String"))
                    .auth_rule(AuthRule::private())
                    .build()
                    .unwrap(),
            )
            .unwrap();
        AppSyncRequestFactory::new(Arc::new(registry))
    }

    #[test]
    fn test_get() {
        let request = factory().get("Note", "n-1").unwrap();
        assert!(request.query().starts_with("query GetNote($id: ID!) {\n  getNote(id: $id) {\n"));
        assert_eq!(request.variable("id"), Some(&VariableValue::String("n-1".into())));
    }

    #[test]
    fn test_list_declares_filter_and_limit() {
        let request = factory()
            .list("Note", &QueryPredicate::All, None, Some("tok"))
            .unwrap();
        assert!(request.query().starts_with(
            "query ListNotes($filter: ModelNoteFilterInput, $limit: Int, $nextToken: String) {\n  listNotes(filter: $filter, limit: $limit, nextToken: $nextToken) {\n"
        ));
        assert_eq!(request.variable("filter"), Some(&VariableValue::Null));
        assert_eq!(request.variable("limit"), Some(&VariableValue::Null));
    }

    #[test]
    fn test_sync_wraps_filter_in_and() {
        let filter = QueryField::field("body").contains("rust");
        let request = factory()
            .sync("Note", Some(1_600_000_000_000), &filter, Some(100), None)
            .unwrap();
        assert!(request.query().starts_with(
            "query SyncNotes($filter: ModelNoteFilterInput, $lastSync: AWSTimestamp, $limit: Int) {\n"
        ));
        assert_eq!(
            request.variable("filter").map(VariableValue::to_json),
            Some(json!({"and": [{"body": {"contains": "rust"}}]}))
        );
        assert!(request.query().contains("_version"));
        assert!(request.query().contains("startedAt"));
    }

    #[test]
    fn test_base_sync_has_no_arguments() {
        let request = factory()
            .sync("Note", None, &QueryPredicate::All, None, None)
            .unwrap();
        assert!(request.query().starts_with("query SyncNotes {\n  syncNotes {\n"));
    }

    #[test]
    fn test_create_input_cleanup() {
        let input = json!({
            "id": "p-1",
            "title": "Hello",
            "createdAt": "2020-01-15T10:00:00Z",
            "owner": null,
            "blog": {"id": "b-1", "name": "Rust"}
        });
        let request = factory()
            .mutation("Post", MutationType::Create, input, &QueryPredicate::All)
            .unwrap();

        assert!(request.query().starts_with(
            "mutation CreatePost($input: CreatePostInput!) {\n  createPost(input: $input) {\n"
        ));
        assert_eq!(
            request.variable("input").map(VariableValue::to_json),
            Some(json!({"id": "p-1", "title": "Hello", "blogId": "b-1"}))
        );
    }

    #[test]
    fn test_delete_keeps_keys_and_version() {
        let input = json!({"id": "p-1", "title": "Hello", "_version": 3});
        let condition = QueryField::field("title").eq("Hello");
        let request = factory()
            .mutation("Post", MutationType::Delete, input, &condition)
            .unwrap();

        assert!(request.query().starts_with(
            "mutation DeletePost($condition: ModelPostConditionInput, $input: DeletePostInput!) {\n"
        ));
        assert_eq!(
            request.variable("input").map(VariableValue::to_json),
            Some(json!({"id": "p-1", "_version": 3}))
        );
    }

    #[test]
    fn test_mutation_requires_object_input() {
        let err = factory()
            .mutation("Note", MutationType::Update, json!("nope"), &QueryPredicate::All)
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_VARIABLES");
    }

    #[test]
    fn test_subscription_owner() {
        let factory = factory();
        let err = factory
            .subscription("Post", SubscriptionType::OnCreate, None)
            .unwrap_err();
        assert_eq!(err.error_code(), "MISSING_FIELD");

        let request = factory
            .subscription("Post", SubscriptionType::OnCreate, Some("johndoe"))
            .unwrap();
        assert!(request.is_owner_argument_required());
        assert_eq!(request.variable("owner").and_then(VariableValue::as_str), Some("johndoe"));

        let request = factory
            .subscription("Note", SubscriptionType::OnDelete, None)
            .unwrap();
        assert!(!request.is_owner_argument_required());
        assert!(
            factory
                .registry()
                .model_schema("Note")
                .unwrap()
                .owner_rules_for(ModelOperation::Delete)
                .next()
                .is_none()
        );
    }
}
