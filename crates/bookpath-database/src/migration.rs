//! Embedded schema migrations.

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tracing::info;

use bookpath_core::error::{AppError, ErrorKind};

/// Migrations under `migrations/`, embedded at compile time.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Apply every pending migration. Safe to call on each startup.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    info!(
        available = MIGRATOR.iter().count(),
        "Applying credential store migrations"
    );

    MIGRATOR.run(pool).await.map_err(|e| {
        AppError::with_source(ErrorKind::Internal, format!("Migration failed: {e}"), e)
    })?;

    info!("Credential store schema is up to date");
    Ok(())
}
