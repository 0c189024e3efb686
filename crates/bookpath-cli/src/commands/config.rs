//! Configuration checks.

use clap::{Args, Subcommand};

use bookpath_core::error::AppError;
use bookpath_database::connection::mask_password;

use crate::output;

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Load and validate the merged configuration
    Check,
}

/// Execute config commands
pub fn execute(args: &ConfigArgs, env: &str) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Check => match super::load_config(env) {
            Ok(config) => {
                output::print_success(&format!("Configuration for '{env}' is valid"));
                println!("  Server: {}", config.server.bind_address());
                println!("  Database: {}", mask_password(&config.database.url));
                println!("  Cache: {}", config.cache.provider);
                println!(
                    "  Lockout: {} attempts, {}s",
                    config.auth.max_failed_attempts, config.auth.lockout_duration_seconds
                );
                println!("  Logging: {} ({})", config.logging.level, config.logging.format);
            }
            Err(e) => {
                output::print_error(&format!("Configuration invalid: {e}"));
                return Err(e);
            }
        },
    }
    Ok(())
}
