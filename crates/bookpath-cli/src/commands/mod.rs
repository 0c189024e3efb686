//! CLI command definitions and dispatch.

pub mod config;
pub mod migrate;
pub mod user;

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};

use bookpath_auth::AuthService;
use bookpath_cache::memory::MemoryCacheProvider;
use bookpath_cache::provider::CacheManager;
use bookpath_core::config::AppConfig;
use bookpath_core::error::AppError;
use bookpath_database::{CredentialStore, DatabasePool, UserRepository};

use crate::output::OutputFormat;

/// BookPath administration
#[derive(Debug, Parser)]
#[command(name = "bookpath", version, about, long_about = None)]
pub struct Cli {
    /// Environment overlay to load (`config/{env}.toml`)
    #[arg(short, long, env = "BOOKPATH_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply database migrations
    Migrate,
    /// Account management
    User(user::UserArgs),
    /// Configuration checks
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate => migrate::execute(&self.env).await,
            Commands::User(args) => user::execute(args, &self.env, self.format).await,
            Commands::Config(args) => config::execute(args, &self.env),
        }
    }
}

/// Helper: load configuration for an environment
pub fn load_config(env: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(env)
}

/// Helper: connect to the credential store and build an [`AuthService`].
///
/// Account commands never read or write ephemeral state, so the service is
/// given an in-process cache instead of connecting to Redis.
pub async fn connect_auth(config: &AppConfig) -> Result<(DatabasePool, AuthService), AppError> {
    let pool = DatabasePool::connect(&config.database).await?;
    let store: Arc<dyn CredentialStore> = Arc::new(UserRepository::new(
        pool.pool().clone(),
        Duration::from_millis(config.database.operation_timeout_ms),
    ));
    let cache = Arc::new(CacheManager::from_provider(Arc::new(
        MemoryCacheProvider::new(&config.cache.memory),
    )));
    let auth = AuthService::new(&config.auth, store, cache)?;
    Ok((pool, auth))
}
