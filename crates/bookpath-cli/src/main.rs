//! BookPath CLI entry point.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use bookpath_core::config::LoggingConfig;

mod commands;
mod output;

use commands::Cli;

/// Level used when `RUST_LOG` is unset; command output owns stdout.
const CLI_LOG_LEVEL: &str = "warn";

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // An unloadable config still gets reported by the command itself.
    let logging = commands::load_config(&cli.env)
        .map(|config| config.logging)
        .unwrap_or_default();
    init_logging(&logging);

    if let Err(e) = cli.execute().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Logs to stderr in the configured format so `--format json` output stays
/// parseable.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(CLI_LOG_LEVEL));

    match logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .compact()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .without_time()
                .init();
        }
    }
}
