use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "authz-provision")]
#[command(about = "Provision applications, permissions, roles and groups into an authorization store")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Authorization store API base URL
    #[arg(long, global = true, env = "AUTHZ_API_URL")]
    pub api_url: Option<String>,

    /// Tenant domain hosting the token endpoint (e.g. tenant.eu.auth0.com)
    #[arg(long, global = true, env = "AUTH0_DOMAIN")]
    pub domain: Option<String>,

    /// OAuth client ID
    #[arg(long, global = true, env = "AUTH0_CLIENT_ID")]
    pub client_id: Option<String>,

    /// OAuth client secret
    #[arg(long, global = true, env = "AUTH0_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Token audience (default: urn:auth0-authz-api)
    #[arg(long, global = true, env = "AUTHZ_AUDIENCE")]
    pub audience: Option<String>,

    /// Config profile name
    #[arg(short, long, global = true, env = "AUTHZ_PROFILE", default_value = "default")]
    pub profile: String,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Per-request timeout in seconds
    #[arg(long, global = true, default_value_t = 30)]
    pub timeout_secs: u64,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create whatever the model declares that the store is missing
    Provision(ModelArgs),
    /// Parse a model file and report what it declares
    Validate(ModelArgs),
    /// Show what the store currently holds
    List(ListArgs),
    /// Manage CLI configuration
    Config(ConfigArgs),
}

#[derive(clap::Args)]
pub struct ModelArgs {
    /// Path to the model file (.json or .toml)
    pub file: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum EntityType {
    Permissions,
    Roles,
    Groups,
}

#[derive(clap::Args)]
pub struct ListArgs {
    /// Which entities to list
    pub entity: EntityType,
}

#[derive(clap::Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current config
    Show,
    /// Set config value
    Set(ConfigSetArgs),
}

#[derive(clap::Args)]
pub struct ConfigSetArgs {
    /// Key to set (api_url, domain, audience, client_id)
    pub key: String,
    /// Value
    pub value: String,
}
