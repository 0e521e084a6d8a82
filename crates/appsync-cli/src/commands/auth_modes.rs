use anyhow::Result;
use appsync_core::ModelOperation;
use appsync_graphql::MultiAuthModeStrategy;
use colored::Colorize;

use super::load_registry;
use crate::cli::{AuthModesArgs, CrudOperation};

impl From<CrudOperation> for ModelOperation {
    fn from(value: CrudOperation) -> Self {
        match value {
            CrudOperation::Create => ModelOperation::Create,
            CrudOperation::Read => ModelOperation::Read,
            CrudOperation::Update => ModelOperation::Update,
            CrudOperation::Delete => ModelOperation::Delete,
        }
    }
}

pub fn run(args: &AuthModesArgs) -> Result<()> {
    let registry = load_registry(&args.target.schema)?;
    let schema = registry.model_schema(&args.target.model)?;
    let operation = ModelOperation::from(args.operation);
    let strategy = MultiAuthModeStrategy::instance();

    let types = match &args.field {
        Some(field) => {
            if schema.field(field).is_none() {
                anyhow::bail!("Model {} has no field named {field}", schema.name());
            }
            strategy.auth_types_for_field(&schema, field, operation)
        }
        None => strategy.auth_types_for(&schema, operation),
    };

    if types.is_empty() {
        println!(
            "{}",
            "No authorization requirement expressed for this operation".yellow()
        );
        return Ok(());
    }
    for (i, authorization_type) in types.iter().enumerate() {
        println!("{}. {}", i + 1, authorization_type.as_str().cyan());
    }
    Ok(())
}
