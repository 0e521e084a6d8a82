use std::path::PathBuf;

use appsync_graphql::OperationType;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "appsync-synth")]
#[command(about = "Synthesize AppSync GraphQL requests from model schemas")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    /// Pretty-printed wire envelope
    #[default]
    Json,
    /// The GraphQL document only
    Document,
    /// The wire envelope exactly as sent
    Raw,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a GraphQL request for a model
    Request(RequestArgs),
    /// Print the selection set for a model
    Selection(SelectionArgs),
    /// Print the authorization modes to try for an operation
    AuthModes(AuthModesArgs),
    /// Parse and normalize an AWSDate, AWSTime or AWSDateTime literal
    Temporal(TemporalArgs),
}

#[derive(clap::Args)]
pub struct SchemaArgs {
    /// Path to the schema document (JSON)
    #[arg(short, long, env = "APPSYNC_SCHEMA")]
    pub schema: PathBuf,
    /// Model type name (e.g. Post)
    #[arg(short, long)]
    pub model: String,
}

#[derive(clap::Args)]
pub struct RequestArgs {
    #[command(flatten)]
    pub target: SchemaArgs,
    /// Operation (get, list, sync, create, update, delete, on-create, on-update, on-delete)
    #[arg(short, long)]
    pub operation: OperationType,
    /// Path to request options (TOML)
    #[arg(long)]
    pub options: Option<PathBuf>,
    /// Owner value for owner-protected subscriptions
    #[arg(long)]
    pub owner: Option<String>,
    /// Variables as name:Type=value, value parsed as JSON when possible (e.g. id:ID!=p-1)
    #[arg(long = "var")]
    pub variables: Vec<String>,
    /// Output format
    #[arg(short, long, default_value = "json")]
    pub format: OutputFormat,
}

#[derive(clap::Args)]
pub struct SelectionArgs {
    #[command(flatten)]
    pub target: SchemaArgs,
    /// Operation the selection is built for
    #[arg(short, long, default_value = "get")]
    pub operation: OperationType,
    /// Path to request options (TOML)
    #[arg(long)]
    pub options: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum CrudOperation {
    Create,
    Read,
    Update,
    Delete,
}

#[derive(clap::Args)]
pub struct AuthModesArgs {
    #[command(flatten)]
    pub target: SchemaArgs,
    /// CRUD operation
    #[arg(short, long)]
    pub operation: CrudOperation,
    /// Resolve the rules of a single field instead of the model
    #[arg(long)]
    pub field: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum TemporalKind {
    Date,
    Time,
    DateTime,
}

#[derive(clap::Args)]
pub struct TemporalArgs {
    /// Scalar to parse as
    pub kind: TemporalKind,
    /// Literal (e.g. 2020-01-15T10:00:00-05:00)
    pub value: String,
}
