//! GraphQL operation kinds and their naming conventions.

use std::fmt;
use std::str::FromStr;

use appsync_core::{ModelOperation, ModelSchema};

use crate::error::GraphQLError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryType {
    Get,
    List,
    Sync,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationType {
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriptionType {
    OnCreate,
    OnUpdate,
    OnDelete,
}

/// The requested GraphQL operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationType {
    Query(QueryType),
    Mutation(MutationType),
    Subscription(SubscriptionType),
}

impl OperationType {
    pub const ALL: [OperationType; 9] = [
        Self::Query(QueryType::Get),
        Self::Query(QueryType::List),
        Self::Query(QueryType::Sync),
        Self::Mutation(MutationType::Create),
        Self::Mutation(MutationType::Update),
        Self::Mutation(MutationType::Delete),
        Self::Subscription(SubscriptionType::OnCreate),
        Self::Subscription(SubscriptionType::OnUpdate),
        Self::Subscription(SubscriptionType::OnDelete),
    ];

    /// Document keyword: `query`, `mutation` or `subscription`.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Query(_) => "query",
            Self::Mutation(_) => "mutation",
            Self::Subscription(_) => "subscription",
        }
    }

    /// PascalCase verb used in operation names (`Get`, `OnCreate`, ...).
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Query(QueryType::Get) => "Get",
            Self::Query(QueryType::List) => "List",
            Self::Query(QueryType::Sync) => "Sync",
            Self::Mutation(MutationType::Create) => "Create",
            Self::Mutation(MutationType::Update) => "Update",
            Self::Mutation(MutationType::Delete) => "Delete",
            Self::Subscription(SubscriptionType::OnCreate) => "OnCreate",
            Self::Subscription(SubscriptionType::OnUpdate) => "OnUpdate",
            Self::Subscription(SubscriptionType::OnDelete) => "OnDelete",
        }
    }

    /// SCREAMING_SNAKE name (`GET`, `ON_CREATE`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Query(QueryType::Get) => "GET",
            Self::Query(QueryType::List) => "LIST",
            Self::Query(QueryType::Sync) => "SYNC",
            Self::Mutation(MutationType::Create) => "CREATE",
            Self::Mutation(MutationType::Update) => "UPDATE",
            Self::Mutation(MutationType::Delete) => "DELETE",
            Self::Subscription(SubscriptionType::OnCreate) => "ON_CREATE",
            Self::Subscription(SubscriptionType::OnUpdate) => "ON_UPDATE",
            Self::Subscription(SubscriptionType::OnDelete) => "ON_DELETE",
        }
    }

    /// Whether the result is a paginated list.
    pub fn is_paginated(&self) -> bool {
        matches!(self, Self::Query(QueryType::List | QueryType::Sync))
    }

    /// CRUD operation this request performs on the model.
    pub fn model_operation(&self) -> ModelOperation {
        match self {
            Self::Query(_) => ModelOperation::Read,
            Self::Mutation(MutationType::Create)
            | Self::Subscription(SubscriptionType::OnCreate) => ModelOperation::Create,
            Self::Mutation(MutationType::Update)
            | Self::Subscription(SubscriptionType::OnUpdate) => ModelOperation::Update,
            Self::Mutation(MutationType::Delete)
            | Self::Subscription(SubscriptionType::OnDelete) => ModelOperation::Delete,
        }
    }

    /// CRUD operation checked against owner rules to decide whether an owner
    /// argument is required. Only subscriptions take one.
    pub fn owner_argument_operation(&self) -> Option<ModelOperation> {
        match self {
            Self::Subscription(_) => Some(self.model_operation()),
            Self::Query(_) | Self::Mutation(_) => None,
        }
    }

    /// Type name as it appears in operation and field names; plural for lists.
    pub fn type_segment(&self, schema: &ModelSchema) -> String {
        if self.is_paginated() {
            schema.plural_name().into_owned()
        } else {
            schema.name().to_string()
        }
    }

    /// Operation name, e.g. `GetPost` or `ListPosts`.
    pub fn operation_name(&self, schema: &ModelSchema) -> String {
        format!("{}{}", self.verb(), self.type_segment(schema))
    }

    /// Root field name, e.g. `getPost` or `onCreatePost`.
    pub fn field_name(&self, schema: &ModelSchema) -> String {
        let verb = self.verb();
        let mut name = String::with_capacity(verb.len() + schema.name().len() + 1);
        let mut chars = verb.chars();
        if let Some(first) = chars.next() {
            name.extend(first.to_lowercase());
            name.push_str(chars.as_str());
        }
        name.push_str(&self.type_segment(schema));
        name
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationType {
    type Err = GraphQLError;

    /// Accepts `GET`, `get`, `on_create`, `ON-CREATE` and similar spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == normalized)
            .ok_or_else(|| GraphQLError::InvalidOptions(format!("unknown operation type: {s}")))
    }
}

impl From<QueryType> for OperationType {
    fn from(value: QueryType) -> Self {
        Self::Query(value)
    }
}

impl From<MutationType> for OperationType {
    fn from(value: MutationType) -> Self {
        Self::Mutation(value)
    }
}

impl From<SubscriptionType> for OperationType {
    fn from(value: SubscriptionType) -> Self {
        Self::Subscription(value)
    }
}
