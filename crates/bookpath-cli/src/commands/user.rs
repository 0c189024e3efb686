//! Account management CLI commands.

use chrono::Utc;
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use uuid::Uuid;

use bookpath_auth::service::RegisterUser;
use bookpath_core::error::AppError;
use bookpath_entity::user::{SubscriptionTier, User, UserRole};

use crate::output::{self, OutputFormat};

/// Arguments for user commands
#[derive(Debug, Args)]
pub struct UserArgs {
    /// User subcommand
    #[command(subcommand)]
    pub command: UserCommand,
}

/// User subcommands
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Create an account, prompting for the password
    Create {
        /// Email address
        #[arg(long)]
        email: String,
        /// Username
        #[arg(long)]
        username: String,
        /// Role: user or chefaodacasa
        #[arg(long, default_value = "user")]
        role: UserRole,
        /// Subscription tier: free or pro
        #[arg(long, default_value = "free")]
        tier: SubscriptionTier,
    },
    /// Show an account by email
    Show {
        /// Email address
        email: String,
    },
    /// Invalidate every token issued to an account
    RevokeSessions {
        /// User ID
        user_id: Uuid,
    },
}

/// User display row for table output
#[derive(Debug, Serialize, Tabled)]
struct UserRow {
    /// User ID
    id: String,
    /// Email
    email: String,
    /// Username
    username: String,
    /// Role
    role: String,
    /// Tier
    tier: String,
    /// Token version
    token_version: i64,
    /// Locked until
    locked_until: String,
}

impl From<&User> for UserRow {
    fn from(u: &User) -> Self {
        Self {
            id: u.id.to_string(),
            email: u.email.clone(),
            username: u.username.clone(),
            role: u.role.to_string(),
            tier: u.subscription_tier.to_string(),
            token_version: u.token_version,
            locked_until: u
                .locked_until_at(Utc::now())
                .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

fn prompt_password() -> Result<String, AppError> {
    dialoguer::Password::new()
        .with_prompt("Password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()
        .map_err(|e| AppError::internal(format!("Input error: {e}")))
}

/// Execute user commands
pub async fn execute(args: &UserArgs, env: &str, format: OutputFormat) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    let (pool, auth) = super::connect_auth(&config).await?;

    let result = run(&args.command, &auth, format).await;
    pool.close().await;
    if let Err(e) = &result {
        output::print_error(&e.message);
    }
    result
}

async fn run(
    command: &UserCommand,
    auth: &bookpath_auth::AuthService,
    format: OutputFormat,
) -> Result<(), AppError> {
    match command {
        UserCommand::Create {
            email,
            username,
            role,
            tier,
        } => {
            let password = prompt_password()?;
            let user = auth
                .register(RegisterUser {
                    email: email.clone(),
                    username: username.clone(),
                    password,
                    role: *role,
                    subscription_tier: *tier,
                })
                .await?;
            output::print_success(&format!("User '{}' created", user.username));
            output::print_rows(&[UserRow::from(&user)], format);
        }
        UserCommand::Show { email } => {
            let user = auth
                .store()
                .find_by_email(email)
                .await?
                .ok_or_else(|| AppError::not_found(format!("User '{email}' not found")))?;
            output::print_rows(&[UserRow::from(&user)], format);
        }
        UserCommand::RevokeSessions { user_id } => {
            let version = auth.revoke_sessions(None, *user_id).await?;
            output::print_success(&format!(
                "Sessions revoked for {user_id}; token version is now {version}"
            ));
        }
    }
    Ok(())
}
