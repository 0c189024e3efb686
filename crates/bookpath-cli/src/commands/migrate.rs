//! Database migration command.

use bookpath_core::error::AppError;
use bookpath_database::DatabasePool;

use crate::output;

/// Apply every pending migration.
pub async fn execute(env: &str) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    let pool = DatabasePool::connect(&config.database).await?;

    println!("Running database migrations...");
    let result = bookpath_database::migration::run_migrations(pool.pool()).await;
    pool.close().await;
    result?;

    output::print_success("All migrations applied successfully.");
    Ok(())
}
