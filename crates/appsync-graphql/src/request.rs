//! GraphQL requests and their builder.
//!
//! A [`GraphQLRequest`] is immutable once built. Its document text is rendered
//! at build time, so two requests built from the same inputs carry the same
//! bytes. [`GraphQLRequest::new_builder`] hands back every input, which makes
//! a rebuilt request equal to the one it came from.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use appsync_core::{ModelSchema, SchemaRegistry};
use tracing::debug;

use crate::Result;
use crate::config::GraphQLRequestOptions;
use crate::error::GraphQLError;
use crate::operation::OperationType;
use crate::selection::{SelectionSet, SelectionSetBuilder};
use crate::variables::{Variable, VariableValue};

const INDENT: &str = "  ";

/// GraphQL type of the owner argument.
const OWNER_ARGUMENT_TYPE: &str = "String!";

/// Name of the type the response is decoded into.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResponseType(String);

impl ResponseType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// `PaginatedResult<Post>` for list and sync queries, `Post` otherwise.
    pub fn for_operation(schema: &ModelSchema, operation: OperationType) -> Self {
        if operation.is_paginated() {
            Self(format!("PaginatedResult<{}>", schema.name()))
        } else {
            Self(schema.name().to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A fully rendered GraphQL request against one model type.
#[derive(Debug, Clone)]
pub struct GraphQLRequest {
    registry: Arc<SchemaRegistry>,
    model_type: String,
    model_schema: Arc<ModelSchema>,
    operation: OperationType,
    response_type: ResponseType,
    options: GraphQLRequestOptions,
    selection_set: SelectionSet,
    variables: BTreeMap<String, Variable>,
    fragments: Vec<String>,
    owner: Option<String>,
    query: String,
}

impl GraphQLRequest {
    #[must_use]
    pub fn builder() -> GraphQLRequestBuilder {
        GraphQLRequestBuilder::default()
    }

    /// A builder pre-populated with every input of this request.
    #[must_use]
    pub fn new_builder(&self) -> GraphQLRequestBuilder {
        // Owner arguments are re-derived by `build` for whatever operation
        // the rebuilt request ends up with.
        let mut variables = self.variables.clone();
        if let Some(owner) = &self.owner {
            let injected = Variable::new(OWNER_ARGUMENT_TYPE, owner.as_str());
            for field in owner_argument_fields(&self.model_schema, self.operation) {
                if variables.get(field) == Some(&injected) {
                    variables.remove(field);
                }
            }
        }

        GraphQLRequestBuilder {
            registry: Some(Arc::clone(&self.registry)),
            model_type: Some(self.model_type.clone()),
            model_schema: Some(Arc::clone(&self.model_schema)),
            operation: Some(self.operation),
            response_type: Some(self.response_type.clone()),
            options: Some(self.options.clone()),
            variables,
            fragments: self.fragments.clone(),
            owner: self.owner.clone(),
        }
    }

    /// Rebuild the request with an owner value.
    ///
    /// # Errors
    ///
    /// Propagates any error of [`GraphQLRequestBuilder::build`].
    pub fn with_owner(&self, owner: impl Into<String>) -> Result<Self> {
        self.new_builder().with_owner(owner).build()
    }

    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    pub fn model_type(&self) -> &str {
        &self.model_type
    }

    pub fn model_schema(&self) -> &ModelSchema {
        &self.model_schema
    }

    pub fn operation(&self) -> OperationType {
        self.operation
    }

    pub fn response_type(&self) -> &ResponseType {
        &self.response_type
    }

    pub fn options(&self) -> &GraphQLRequestOptions {
        &self.options
    }

    pub fn selection_set(&self) -> &SelectionSet {
        &self.selection_set
    }

    /// The GraphQL document, followed by any fragment definitions.
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn variables(&self) -> &BTreeMap<String, Variable> {
        &self.variables
    }

    pub fn variable(&self, name: &str) -> Option<&VariableValue> {
        self.variables.get(name).map(|variable| &variable.value)
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    /// True when an OWNER rule covers the CRUD operation behind this
    /// subscription. Queries and mutations never take the argument.
    pub fn is_owner_argument_required(&self) -> bool {
        !owner_argument_fields(&self.model_schema, self.operation).is_empty()
    }

    /// Wire envelope: `{"query":"...","variables":null|{...}}`.
    ///
    /// # Errors
    ///
    /// Returns `GraphQLError::InvalidVariables` when a value has no JSON form.
    pub fn content(&self) -> Result<String> {
        let query = escape_query(&self.query);
        let variables = if self.variables.is_empty() {
            "null".to_string()
        } else {
            let mut out = String::from("{");
            for (i, (name, variable)) in self.variables.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&serde_json::to_string(name)?);
                out.push(':');
                out.push_str(&variable.value.to_wire()?);
            }
            out.push('}');
            out
        };
        Ok(format!(r#"{{"query":"{query}","variables":{variables}}}"#))
    }

    /// Parse the document to check it is syntactically valid GraphQL.
    ///
    /// # Errors
    ///
    /// Returns `GraphQLError::InvalidDocument` with the parser message.
    pub fn validate_document(&self) -> Result<()> {
        async_graphql_parser::parse_query(&self.query)
            .map(|_| ())
            .map_err(|e| GraphQLError::InvalidDocument(e.to_string()))
    }
}

/// Equality covers every request input except the registry handle.
impl PartialEq for GraphQLRequest {
    fn eq(&self, other: &Self) -> bool {
        self.model_type == other.model_type
            && self.model_schema == other.model_schema
            && self.operation == other.operation
            && self.response_type == other.response_type
            && self.options == other.options
            && self.selection_set == other.selection_set
            && self.variables == other.variables
            && self.fragments == other.fragments
            && self.owner == other.owner
            && self.query == other.query
    }
}

/// Builder for [`GraphQLRequest`].
///
/// Only the operation and either a model type or a schema override are
/// required. The registry defaults to [`SchemaRegistry::global`] and the
/// options to [`GraphQLRequestOptions::api`].
#[derive(Debug, Clone, Default)]
pub struct GraphQLRequestBuilder {
    registry: Option<Arc<SchemaRegistry>>,
    model_type: Option<String>,
    model_schema: Option<Arc<ModelSchema>>,
    operation: Option<OperationType>,
    response_type: Option<ResponseType>,
    options: Option<GraphQLRequestOptions>,
    variables: BTreeMap<String, Variable>,
    fragments: Vec<String>,
    owner: Option<String>,
}

impl GraphQLRequestBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_registry(mut self, registry: Arc<SchemaRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    #[must_use]
    pub fn with_model_type(mut self, model_type: impl Into<String>) -> Self {
        self.model_type = Some(model_type.into());
        self
    }

    /// Use this schema instead of resolving the model type through the registry.
    #[must_use]
    pub fn with_model_schema(mut self, schema: impl Into<Arc<ModelSchema>>) -> Self {
        self.model_schema = Some(schema.into());
        self
    }

    #[must_use]
    pub fn with_operation(mut self, operation: impl Into<OperationType>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    #[must_use]
    pub fn with_response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = Some(response_type);
        self
    }

    #[must_use]
    pub fn with_request_options(mut self, options: GraphQLRequestOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Declare a variable. A later declaration of the same name replaces it.
    #[must_use]
    pub fn with_variable(
        mut self,
        name: impl Into<String>,
        type_name: impl Into<String>,
        value: impl Into<VariableValue>,
    ) -> Self {
        self.variables
            .insert(name.into(), Variable::new(type_name, value));
        self
    }

    /// Append a fragment definition, e.g. `fragment PostParts on Post { id }`.
    #[must_use]
    pub fn with_fragment(mut self, fragment: impl Into<String>) -> Self {
        self.fragments.push(fragment.into());
        self
    }

    /// Owner value injected when the operation takes an owner argument.
    #[must_use]
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Builds the request.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation or model is missing, if the options
    /// are invalid, or if a type reachable from the model is not registered.
    pub fn build(self) -> Result<GraphQLRequest> {
        let Self {
            registry,
            model_type,
            model_schema,
            operation,
            response_type,
            options,
            mut variables,
            fragments,
            owner,
        } = self;

        let operation = operation.ok_or(GraphQLError::MissingField("operation"))?;
        let registry = registry.unwrap_or_else(SchemaRegistry::global);

        let model_schema = match model_schema {
            Some(schema) => schema,
            None => {
                let model_type = model_type
                    .as_deref()
                    .ok_or(GraphQLError::MissingField("model_type"))?;
                registry.model_schema(model_type)?
            }
        };
        let model_type = model_type.unwrap_or_else(|| model_schema.name().to_string());

        let options = options.unwrap_or_else(GraphQLRequestOptions::api);
        options.validate().map_err(GraphQLError::InvalidOptions)?;

        let selection_set =
            SelectionSetBuilder::new(&registry, &options).build_for_schema(&model_schema, operation)?;

        if let Some(owner) = &owner {
            for field in owner_argument_fields(&model_schema, operation) {
                debug!(
                    type_name = %model_schema.name(),
                    operation = %operation,
                    field,
                    "Injecting owner argument"
                );
                variables.insert(
                    field.to_string(),
                    Variable::new(OWNER_ARGUMENT_TYPE, owner.as_str()),
                );
            }
        }

        let response_type =
            response_type.unwrap_or_else(|| ResponseType::for_operation(&model_schema, operation));

        let mut query = render_document(&model_schema, operation, &variables, &selection_set);
        for fragment in &fragments {
            query.push_str(fragment.trim_end());
            query.push('\n');
        }

        Ok(GraphQLRequest {
            registry,
            model_type,
            model_schema,
            operation,
            response_type,
            options,
            selection_set,
            variables,
            fragments,
            owner,
            query,
        })
    }
}

/// Owner fields that must be passed as arguments, in rule declaration order.
fn owner_argument_fields(schema: &ModelSchema, operation: OperationType) -> Vec<&str> {
    let Some(model_operation) = operation.owner_argument_operation() else {
        return Vec::new();
    };
    let mut fields: Vec<&str> = Vec::new();
    for rule in schema.owner_rules_for(model_operation) {
        let field = rule.owner_field_or_default();
        if !fields.contains(&field) {
            fields.push(field);
        }
    }
    fields
}

/// ```text
/// subscription OnCreatePost($owner: String!) {
///   onCreatePost(owner: $owner) {
///     id
///   }
/// }
/// ```
fn render_document(
    schema: &ModelSchema,
    operation: OperationType,
    variables: &BTreeMap<String, Variable>,
    selection_set: &SelectionSet,
) -> String {
    let (declarations, arguments) = if variables.is_empty() {
        (String::new(), String::new())
    } else {
        let declarations: Vec<String> = variables
            .iter()
            .map(|(name, variable)| format!("${name}: {}", variable.type_name))
            .collect();
        let arguments: Vec<String> = variables
            .keys()
            .map(|name| format!("{name}: ${name}"))
            .collect();
        (
            format!("({})", declarations.join(", ")),
            format!("({})", arguments.join(", ")),
        )
    };

    format!(
        "{keyword} {name}{declarations} {{\n{INDENT}{field}{arguments}{selection}\n}}\n",
        keyword = operation.keyword(),
        name = operation.operation_name(schema),
        field = operation.field_name(schema),
        selection = selection_set.render_block(INDENT),
    )
}

/// Escapes quotes and control characters for embedding in the envelope,
/// then collapses doubled backslashes.
fn escape_query(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c if c.is_control() => escaped.push_str(&format!("\\u{:04x}", u32::from(c))),
            c => escaped.push(c),
        }
    }
    escaped.replace("\\\\", "\\")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{MutationType, QueryType, SubscriptionType};
    use appsync_core::{AuthRule, ModelField, ModelOperation};

    fn todo_registry() -> Arc<SchemaRegistry> {
        let registry = SchemaRegistry::new();
        registry
            .register(
                ModelSchema::builder("Todo")
                    .field(ModelField::id("id"))
                    .field(ModelField::new("name", "String").required())
                    .field(ModelField::new("description", "String"))
                    .build()
                    .unwrap(),
            )
            .unwrap();
        Arc::new(registry)
    }

    #[test]
    fn test_get_document_and_content() {
        let request = GraphQLRequest::builder()
            .with_registry(todo_registry())
            .with_model_type("Todo")
            .with_operation(QueryType::Get)
            .with_variable("id", "ID!", "abc")
            .build()
            .unwrap();

        assert_eq!(
            request.query(),
            "query GetTodo($id: ID!) {\n  getTodo(id: $id) {\n    description\n    id\n    name\n  }\n}\n"
        );
        assert_eq!(
            request.content().unwrap(),
            r#"{"query":"query GetTodo($id: ID!) {\n  getTodo(id: $id) {\n    description\n    id\n    name\n  }\n}\n","variables":{"id":"abc"}}"#
        );
        assert_eq!(request.response_type().as_str(), "Todo");
        assert!(request.validate_document().is_ok());
    }

    #[test]
    fn test_no_variables_is_null() {
        let request = GraphQLRequest::builder()
            .with_registry(todo_registry())
            .with_model_type("Todo")
            .with_operation(SubscriptionType::OnCreate)
            .build()
            .unwrap();

        assert!(request.query().starts_with("subscription OnCreateTodo {\n  onCreateTodo {\n"));
        assert!(request.content().unwrap().ends_with(r#","variables":null}"#));
    }

    #[test]
    fn test_paginated_response_type() {
        let request = GraphQLRequest::builder()
            .with_registry(todo_registry())
            .with_model_type("Todo")
            .with_operation(QueryType::List)
            .build()
            .unwrap();
        assert_eq!(request.response_type().to_string(), "PaginatedResult<Todo>");
        assert!(request.query().starts_with("query ListTodos {\n  listTodos {\n    items {\n"));
    }

    #[test]
    fn test_missing_fields() {
        let err = GraphQLRequest::builder()
            .with_registry(todo_registry())
            .with_model_type("Todo")
            .build()
            .unwrap_err();
        assert_eq!(err.error_code(), "MISSING_FIELD");

        let err = GraphQLRequest::builder()
            .with_registry(todo_registry())
            .with_operation(QueryType::Get)
            .build()
            .unwrap_err();
        assert_eq!(err.to_string(), "Request builder is missing required field: model_type");
    }

    #[test]
    fn test_unregistered_model() {
        let err = GraphQLRequest::builder()
            .with_registry(todo_registry())
            .with_model_type("Ghost")
            .with_operation(QueryType::Get)
            .build()
            .unwrap_err();
        assert!(err.is_schema_error());
    }

    #[test]
    fn test_schema_override_skips_registry() {
        let schema = ModelSchema::builder("Note")
            .field(ModelField::id("id"))
            .build()
            .unwrap();
        let request = GraphQLRequest::builder()
            .with_registry(Arc::new(SchemaRegistry::new()))
            .with_model_schema(schema)
            .with_operation(MutationType::Delete)
            .build()
            .unwrap();
        assert_eq!(request.model_type(), "Note");
        assert!(request.query().starts_with("mutation DeleteNote {"));
    }

    #[test]
    fn test_invalid_options_rejected() {
        let mut options = GraphQLRequestOptions::default();
        options.list_items_field_name = String::new();
        let err = GraphQLRequest::builder()
            .with_registry(todo_registry())
            .with_model_type("Todo")
            .with_operation(QueryType::Get)
            .with_request_options(options)
            .build()
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_OPTIONS");
    }

    #[test]
    fn test_owner_ignored_when_not_required() {
        let registry = SchemaRegistry::new();
        registry
            .register(
                ModelSchema::builder("Post")
                    .field(ModelField::id("id"))
                    .auth_rule(AuthRule::owner().with_operations([ModelOperation::Delete]))
                    .build()
                    .unwrap(),
            )
            .unwrap();
        let request = GraphQLRequest::builder()
            .with_registry(Arc::new(registry))
            .with_model_type("Post")
            .with_operation(SubscriptionType::OnCreate)
            .with_owner("johndoe")
            .build()
            .unwrap();

        assert!(!request.is_owner_argument_required());
        assert!(request.variable("owner").is_none());
        assert_eq!(request.owner(), Some("johndoe"));
    }

    #[test]
    fn test_custom_owner_field() {
        let registry = SchemaRegistry::new();
        registry
            .register(
                ModelSchema::builder("Post")
                    .field(ModelField::id("id"))
                    .auth_rule(AuthRule::owner().with_owner_field("author"))
                    .build()
                    .unwrap(),
            )
            .unwrap();
        let request = GraphQLRequest::builder()
            .with_registry(Arc::new(registry))
            .with_model_type("Post")
            .with_operation(SubscriptionType::OnUpdate)
            .with_owner("jane")
            .build()
            .unwrap();

        assert_eq!(request.variable("author").and_then(VariableValue::as_str), Some("jane"));
        assert!(request
            .query()
            .starts_with("subscription OnUpdatePost($author: String!) {\n  onUpdatePost(author: $author) {\n"));
    }

    #[test]
    fn test_fragments_appended() {
        let request = GraphQLRequest::builder()
            .with_registry(todo_registry())
            .with_model_type("Todo")
            .with_operation(QueryType::Get)
            .with_fragment("fragment TodoParts on Todo { id }\n")
            .build()
            .unwrap();
        assert!(request.query().ends_with("}\nfragment TodoParts on Todo { id }\n"));
        assert!(request.validate_document().is_ok());
    }

    #[test]
    fn test_escape_query() {
        assert_eq!(escape_query("a\n\"b\""), r#"a\n\"b\""#);
        assert_eq!(escape_query(r"c\\d"), r"c\d");
    }

    #[test]
    fn test_escape_query_control_characters() {
        assert_eq!(escape_query("a\tb\r\n"), r"a\tb\r\n");
        assert_eq!(escape_query("x\u{1}y"), r"x\u0001y");
    }

    #[test]
    fn test_content_with_tab_in_fragment_is_json() {
        let request = GraphQLRequest::builder()
            .with_registry(todo_registry())
            .with_model_type("Todo")
            .with_operation(QueryType::Get)
            .with_fragment("fragment TodoParts on Todo {\n\tid\n}\n")
            .build()
            .unwrap();

        let content: serde_json::Value = serde_json::from_str(&request.content().unwrap()).unwrap();
        assert_eq!(content["query"].as_str(), Some(request.query()));
    }

    #[test]
    fn test_new_builder_drops_injected_owner() {
        let registry = SchemaRegistry::new();
        registry
            .register(
                ModelSchema::builder("Post")
                    .field(ModelField::id("id"))
                    .auth_rule(AuthRule::owner())
                    .build()
                    .unwrap(),
            )
            .unwrap();
        let subscription = GraphQLRequest::builder()
            .with_registry(Arc::new(registry))
            .with_model_type("Post")
            .with_operation(SubscriptionType::OnCreate)
            .with_owner("johndoe")
            .build()
            .unwrap();
        assert!(subscription.variable("owner").is_some());
        assert_eq!(subscription.new_builder().build().unwrap(), subscription);

        let get = subscription
            .new_builder()
            .with_operation(QueryType::Get)
            .build()
            .unwrap();
        assert!(get.variable("owner").is_none());
        assert!(get.query().starts_with("query GetPost {\n  getPost {\n"));
        assert!(get.validate_document().is_ok());
    }
}
