//! Operation log listing command.

use chrono::NaiveDate;
use clap::Args;

use deptadmin_core::config::AppConfig;
use deptadmin_core::error::AppError;
use deptadmin_core::types::UserId;
use deptadmin_database::store::OperationLogStore;

use crate::output::{self, OutputFormat};

/// Arguments for `logs`
#[derive(Debug, Args)]
pub struct LogsArgs {
    /// Operator whose entries to list
    #[arg(long)]
    pub user_id: i64,
    /// Only entries recorded on this UTC day (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<NaiveDate>,
    /// Maximum number of entries to print
    #[arg(long, default_value_t = 20)]
    pub limit: usize,
}

/// List the newest operation log entries of one operator
pub async fn execute(
    args: &LogsArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let backend = super::connect(config).await?;
    let mut entries = backend
        .logs
        .find_operation_logs_by_operator(UserId::new(args.user_id), args.date)
        .await?;
    entries.truncate(args.limit);
    output::print_list(&entries, format);
    Ok(())
}
