//! # appsync-graphql
//!
//! GraphQL request synthesis for AppSync model APIs.
//!
//! Given a registered model schema and an operation, this crate produces a
//! complete, deterministic GraphQL request: operation header, variable
//! declarations, a bounded selection set and the JSON wire envelope. It also
//! answers which authorization modes the transport should try, in order.
//!
//! ## Overview
//!
//! ```ignore
//! use appsync_graphql::{GraphQLRequest, SubscriptionType};
//!
//! let request = GraphQLRequest::builder()
//!     .with_model_type("Post")
//!     .with_operation(SubscriptionType::OnCreate)
//!     .with_owner("johndoe")
//!     .build()?;
//!
//! let body = request.content()?;
//! ```
//!
//! Nothing here performs I/O. Every operation is synchronous and identical
//! inputs always yield byte-identical documents.
//!
//! ## Configuration
//!
//! Request options can be loaded from TOML:
//!
//! ```toml
//! max_depth = 2
//! leaf_serialization_behavior = "full"
//! include_paths = ["comments"]
//! ```
//!
//! ## Modules
//!
//! - [`config`] - Request options and presets
//! - [`operation`] - Query, mutation and subscription kinds
//! - [`selection`] - Selection-set construction over cyclic model graphs
//! - [`auth_mode`] - Authorization-mode strategies
//! - [`variables`] - Typed variables and their wire encoding
//! - [`request`] - Requests, the request builder and the wire envelope
//! - [`predicate`] - Filter and condition predicates
//! - [`factory`] - Standard get/list/sync/mutation/subscription requests
//! - [`error`] - Error types for request synthesis

pub mod auth_mode;
pub mod config;
pub mod error;
pub mod factory;
pub mod operation;
pub mod predicate;
pub mod request;
pub mod selection;
pub mod variables;

// Re-export main types
pub use auth_mode::{AuthModeStrategy, DefaultAuthModeStrategy, MultiAuthModeStrategy};
pub use config::{GraphQLRequestOptions, LeafSerializationBehavior};
pub use error::GraphQLError;
pub use factory::AppSyncRequestFactory;
pub use operation::{MutationType, OperationType, QueryType, SubscriptionType};
pub use predicate::{GroupType, QueryField, QueryOperator, QueryPredicate};
pub use request::{GraphQLRequest, GraphQLRequestBuilder, ResponseType};
pub use selection::{SelectionSet, SelectionSetBuilder};
pub use variables::{Variable, VariableValue};

/// Result type for request synthesis.
pub type Result<T> = std::result::Result<T, GraphQLError>;
