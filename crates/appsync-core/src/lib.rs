pub mod error;
pub mod schema;
pub mod temporal;

pub use error::{CoreError, ErrorCategory, Result};
pub use schema::{
    AssociationKind, AuthProvider, AuthRule, AuthStrategy, AuthorizationType, CustomTypeField,
    CustomTypeSchema, ModelAssociation, ModelField, ModelIndex, ModelOperation, ModelSchema,
    SchemaDocument, SchemaRegistry,
};
pub use temporal::{AwsDate, AwsDateTime, AwsTime, AwsTimeZone};
