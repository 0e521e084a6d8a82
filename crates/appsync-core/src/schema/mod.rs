//! Structural schema model and its registry.

pub mod auth;
pub mod document;
pub mod field;
pub mod model;
pub mod registry;

pub use auth::{
    AuthProvider, AuthRule, AuthStrategy, AuthorizationType, DEFAULT_GROUP_CLAIM,
    DEFAULT_IDENTITY_CLAIM, DEFAULT_OWNER_FIELD, ModelOperation,
};
pub use document::SchemaDocument;
pub use field::{CustomTypeField, ModelField};
pub use model::{
    AssociationKind, CustomTypeSchema, DEFAULT_PRIMARY_KEY, ModelAssociation, ModelIndex,
    ModelSchema, ModelSchemaBuilder,
};
pub use registry::SchemaRegistry;
