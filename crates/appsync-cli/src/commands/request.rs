use anyhow::{Context, Result};
use appsync_graphql::GraphQLRequest;
use colored::Colorize;
use serde_json::Value;

use super::{load_options, load_registry};
use crate::cli::{OutputFormat, RequestArgs};
use crate::output::print_success;

/// Splits `name:Type=value`. The value is parsed as JSON and falls back to a string.
fn parse_variable(input: &str) -> Result<(String, String, Value)> {
    let (declaration, raw) = input
        .split_once('=')
        .with_context(|| format!("Invalid variable \"{input}\". Expected name:Type=value"))?;
    let (name, type_name) = declaration
        .split_once(':')
        .with_context(|| format!("Invalid variable \"{input}\". Expected name:Type=value"))?;
    let (name, type_name) = (name.trim(), type_name.trim());
    if name.is_empty() || type_name.is_empty() {
        anyhow::bail!("Invalid variable \"{input}\". Name and type must not be empty");
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((name.to_string(), type_name.to_string(), value))
}

pub fn run(args: &RequestArgs) -> Result<()> {
    let registry = load_registry(&args.target.schema)?;
    let options = load_options(args.options.as_deref())?;

    let mut builder = GraphQLRequest::builder()
        .with_registry(registry)
        .with_model_type(&args.target.model)
        .with_operation(args.operation)
        .with_request_options(options);
    for input in &args.variables {
        let (name, type_name, value) = parse_variable(input)?;
        builder = builder.with_variable(name, type_name, value);
    }
    if let Some(owner) = &args.owner {
        builder = builder.with_owner(owner);
    }

    let request = builder.build()?;
    request.validate_document()?;

    if request.is_owner_argument_required() && request.owner().is_none() {
        eprintln!(
            "{} {} requires an owner argument, pass --owner",
            "!".yellow(),
            request.operation()
        );
    }

    match args.format {
        OutputFormat::Document => print!("{}", request.query()),
        OutputFormat::Raw => println!("{}", request.content()?),
        OutputFormat::Json => {
            let content: Value = serde_json::from_str(&request.content()?)?;
            println!("{}", serde_json::to_string_pretty(&content)?);
            print_success(&format!(
                "{} {} ({})",
                request.operation(),
                request.model_type().cyan(),
                request.response_type()
            ));
        }
    }
    Ok(())
}
