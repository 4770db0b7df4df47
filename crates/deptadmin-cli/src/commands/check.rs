//! Permission check command.

use clap::Args;

use deptadmin_auth::{AuthError, PermissionEvaluator};
use deptadmin_core::config::AppConfig;
use deptadmin_core::error::AppError;
use deptadmin_core::types::UserId;
use deptadmin_database::store::UserStore;

use crate::output;

/// Arguments for `check`
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// User to evaluate
    #[arg(long)]
    pub user_id: i64,
    /// Resource name
    #[arg(long)]
    pub resource: String,
    /// Action name
    #[arg(long)]
    pub action: String,
}

/// Evaluate `(resource, action)` for a user and print the decision
pub async fn execute(args: &CheckArgs, config: &AppConfig) -> Result<(), AppError> {
    let backend = super::connect(config).await?;
    let user_id = UserId::new(args.user_id);
    let user = backend
        .users
        .find_user_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))?;

    let evaluator = PermissionEvaluator::new(backend.departments.clone());
    match evaluator.check(&user, &args.resource, &args.action).await {
        Ok(()) => {
            output::print_success(&format!(
                "'{}' may {} {}",
                user.username, args.action, args.resource
            ));
        }
        Err(e @ AuthError::MalformedPermissionData { .. }) => {
            output::print_warning("Department permission data is malformed; request denied");
            output::print_kv("reason", &e.to_string());
        }
        Err(e) => {
            output::print_kv("decision", "denied");
            output::print_kv("reason", &e.to_string());
        }
    }

    match evaluator.effective_permissions(&user).await {
        Ok(granted) => {
            println!("Effective permissions:");
            for resource in granted.resources() {
                let actions: Vec<&str> = granted
                    .actions(resource)
                    .map(|set| set.iter().map(String::as_str).collect())
                    .unwrap_or_default();
                output::print_kv(resource, &actions.join(", "));
            }
        }
        Err(e) => {
            output::print_warning("Effective permissions could not be listed");
            output::print_kv("reason", &e.to_string());
        }
    }
    Ok(())
}
