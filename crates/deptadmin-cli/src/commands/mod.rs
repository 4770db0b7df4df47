//! CLI command definitions and dispatch.

pub mod admin;
pub mod check;
pub mod logs;
pub mod migrate;
pub mod token;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use deptadmin_core::config::AppConfig;
use deptadmin_core::error::AppError;
use deptadmin_database::DatabasePool;
use deptadmin_database::repositories::{
    DepartmentRepository, OperationLogRepository, UserRepository,
};

use crate::output::OutputFormat;

/// DeptAdmin: department and user administration
#[derive(Debug, Parser)]
#[command(name = "deptadmin", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Create an administrator department and user
    CreateAdmin(admin::CreateAdminArgs),
    /// Issue tokens for an existing user
    IssueToken(token::IssueTokenArgs),
    /// Decode a token and print its claims
    InspectToken(token::InspectTokenArgs),
    /// Evaluate a permission for a user
    Check(check::CheckArgs),
    /// List a user's operation log
    Logs(logs::LogsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate => migrate::execute(config).await,
            Commands::CreateAdmin(args) => admin::execute(args, config, self.format).await,
            Commands::IssueToken(args) => token::issue(args, config, self.format).await,
            Commands::InspectToken(args) => token::inspect(args, config, self.format),
            Commands::Check(args) => check::execute(args, config).await,
            Commands::Logs(args) => logs::execute(args, config, self.format).await,
        }
    }
}

/// PostgreSQL-backed stores sharing one pool.
pub struct Backend {
    /// User store.
    pub users: Arc<UserRepository>,
    /// Department store.
    pub departments: Arc<DepartmentRepository>,
    /// Operation log store.
    pub logs: Arc<OperationLogRepository>,
}

/// Helper: connect to the database and build the repositories
pub async fn connect(config: &AppConfig) -> Result<Backend, AppError> {
    let pool = DatabasePool::connect(&config.database).await?;
    let timeout = pool.statement_timeout();
    let pg = pool.pool().clone();
    tracing::debug!(timeout_ms = timeout.as_millis() as u64, "Building repositories");

    Ok(Backend {
        users: Arc::new(UserRepository::new(pg.clone()).with_timeout(timeout)),
        departments: Arc::new(DepartmentRepository::new(pg.clone()).with_timeout(timeout)),
        logs: Arc::new(OperationLogRepository::new(pg).with_timeout(timeout)),
    })
}

/// Helper: map a prompt failure into an application error
pub fn input_error(e: dialoguer::Error) -> AppError {
    AppError::internal(format!("Input error: {e}"))
}
