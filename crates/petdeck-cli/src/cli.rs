use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "petdeck",
    about = "petdeck — layered pet image library",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the global asset root from the configuration
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Act on this member's bucket instead of the offline bucket
    #[arg(short, long, global = true)]
    pub user: Option<i64>,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// List the pet types visible to a bucket
    Types,
    /// Upload a level image
    Upload(UploadArgs),
    /// Delete a level image
    Delete(LevelArgs),
    /// Create or restore a pet type
    CreateType(CreateTypeArgs),
    /// Delete or hide a pet type
    DeleteType(TypeArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// Address to bind, overriding the configuration
    #[arg(long)]
    pub bind: Option<String>,
    /// Force desktop mode (single shared offline bucket)
    #[arg(long)]
    pub desktop: bool,
}

#[derive(Args)]
pub struct TypeArgs {
    pub pet_type: String,
}

#[derive(Args)]
pub struct LevelArgs {
    pub pet_type: String,
    pub level: i64,
}

#[derive(Args)]
pub struct UploadArgs {
    pub pet_type: String,
    pub level: i64,
    pub file: PathBuf,
    /// Content type; guessed from the file extension when omitted
    #[arg(long)]
    pub content_type: Option<String>,
}

#[derive(Args)]
pub struct CreateTypeArgs {
    pub id: String,
    /// Display name
    #[arg(long)]
    pub name: Option<String>,
    /// Stage name, repeat once per level
    #[arg(long = "stage")]
    pub stages: Vec<String>,
}
