//! Database migration command.

use deptadmin_core::config::AppConfig;
use deptadmin_core::error::AppError;
use deptadmin_database::DatabasePool;

use crate::output;

/// Run all pending migrations
pub async fn execute(config: &AppConfig) -> Result<(), AppError> {
    let pool = DatabasePool::connect(&config.database).await?;
    if !pool.health_check().await? {
        return Err(AppError::service_unavailable("Database did not answer the health check"));
    }

    println!("Running database migrations...");
    deptadmin_database::migration::run_migrations(pool.pool()).await?;
    output::print_success("All migrations applied successfully.");

    pool.close().await;
    Ok(())
}
