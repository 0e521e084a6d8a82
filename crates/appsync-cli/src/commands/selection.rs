use anyhow::Result;
use appsync_graphql::SelectionSetBuilder;

use super::{load_options, load_registry};
use crate::cli::SelectionArgs;

pub fn run(args: &SelectionArgs) -> Result<()> {
    let registry = load_registry(&args.target.schema)?;
    let options = load_options(args.options.as_deref())?;
    options
        .validate()
        .map_err(|msg| anyhow::anyhow!("Invalid request options: {msg}"))?;

    let selection = SelectionSetBuilder::new(&registry, &options)
        .build(&args.target.model, args.operation)?;
    println!("{selection}");
    Ok(())
}
