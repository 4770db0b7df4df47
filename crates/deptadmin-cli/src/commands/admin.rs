//! Administrator bootstrap command.

use clap::Args;

use deptadmin_auth::{AccountService, NewAccount};
use deptadmin_core::config::AppConfig;
use deptadmin_core::error::AppError;
use deptadmin_entity::department::PermissionSet;

use crate::output::{self, OutputFormat};

/// Permissions granted to the bootstrap department unless overridden.
const DEFAULT_ADMIN_PERMISSIONS: &str = r#"{
    "dept": ["add", "delete", "edit", "view"],
    "user": ["add", "delete", "edit", "view"],
    "operation": ["view"]
}"#;

/// Arguments for `create-admin`
#[derive(Debug, Args)]
pub struct CreateAdminArgs {
    /// Department to create for the administrator
    #[arg(long, default_value = "Administrators")]
    pub department: String,
    /// Permission set as JSON (`{"resource": ["action", ...]}`)
    #[arg(long)]
    pub permissions: Option<String>,
    /// Username
    #[arg(short, long)]
    pub username: Option<String>,
    /// Email
    #[arg(short, long)]
    pub email: Option<String>,
    /// Password (will prompt if not provided)
    #[arg(short, long)]
    pub password: Option<String>,
}

/// Create the department and its first user
pub async fn execute(
    args: &CreateAdminArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let permissions = PermissionSet::parse(
        args.permissions
            .as_deref()
            .unwrap_or(DEFAULT_ADMIN_PERMISSIONS),
    )
    .map_err(|e| AppError::validation(format!("Invalid permission set: {e}")))?;

    let username = match &args.username {
        Some(u) => u.clone(),
        None => dialoguer::Input::new()
            .with_prompt("Admin username")
            .interact_text()
            .map_err(super::input_error)?,
    };

    let email = match &args.email {
        Some(e) => e.clone(),
        None => dialoguer::Input::new()
            .with_prompt("Admin email")
            .interact_text()
            .map_err(super::input_error)?,
    };

    let password = match &args.password {
        Some(p) => p.clone(),
        None => dialoguer::Password::new()
            .with_prompt("Admin password")
            .with_confirmation("Confirm password", "Passwords do not match")
            .interact()
            .map_err(super::input_error)?,
    };

    let backend = super::connect(config).await?;
    let accounts = AccountService::new(
        backend.users.clone(),
        backend.departments.clone(),
        &config.auth,
    );

    let department = match backend.departments.find_by_name(&args.department).await? {
        Some(existing) => {
            output::print_warning(&format!(
                "Department '{}' already exists; adding the admin to it",
                existing.name
            ));
            existing
        }
        None => {
            accounts
                .create_department(&args.department, &args.department, permissions)
                .await?
        }
    };
    let user = accounts
        .create_user(NewAccount {
            name: username.clone(),
            username,
            email,
            password,
            department_id: Some(department.id),
            remark: String::new(),
        })
        .await?;

    output::print_success(&format!(
        "Admin user '{}' created (id: {}) in department '{}' (id: {})",
        user.username, user.id, department.name, department.id
    ));
    output::print_item(&user, format);
    Ok(())
}
