//! Token issuance and inspection commands.

use clap::{Args, ValueEnum};

use deptadmin_auth::{JwtDecoder, JwtEncoder};
use deptadmin_core::config::AppConfig;
use deptadmin_core::error::AppError;
use deptadmin_core::types::UserId;
use deptadmin_database::store::UserStore;

use crate::output::{self, OutputFormat};

/// Which token form to issue or decode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum TokenForm {
    /// Access + refresh pair
    #[default]
    Pair,
    /// Legacy single session token
    Session,
}

/// Arguments for `issue-token`
#[derive(Debug, Args)]
pub struct IssueTokenArgs {
    /// User to issue the token for
    #[arg(long)]
    pub user_id: i64,
    /// Token form
    #[arg(long, value_enum, default_value = "pair")]
    pub form: TokenForm,
}

/// Arguments for `inspect-token`
#[derive(Debug, Args)]
pub struct InspectTokenArgs {
    /// The encoded token
    pub token: String,
    /// Token form
    #[arg(long, value_enum, default_value = "pair")]
    pub form: TokenForm,
}

/// Issue tokens for an existing user
pub async fn issue(
    args: &IssueTokenArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let backend = super::connect(config).await?;
    let user_id = UserId::new(args.user_id);
    let user = backend
        .users
        .find_user_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))?;

    let encoder = JwtEncoder::new(&config.auth);
    match args.form {
        TokenForm::Pair => {
            let pair = encoder
                .issue_pair(user.id)
                .map_err(|e| AppError::internal(e.to_string()))?;
            output::print_item(&pair, format);
        }
        TokenForm::Session => {
            let token = encoder
                .issue_default_session(&user)
                .map_err(|e| AppError::internal(e.to_string()))?;
            println!("{token}");
        }
    }
    Ok(())
}

/// Decode a token and print its claims, or why it was rejected
pub fn inspect(
    args: &InspectTokenArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let decoder = JwtDecoder::new(&config.auth);
    let result = match args.form {
        TokenForm::Pair => decoder
            .decode_access(&args.token)
            .map(|claims| output::print_item(&claims, format)),
        TokenForm::Session => decoder
            .decode_session(&args.token)
            .map(|claims| output::print_item(&claims, format)),
    };

    result.map_err(|e| AppError::authentication(format!("Token rejected: {e}")))
}
