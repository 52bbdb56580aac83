// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cognito-Session CLI
//!
//! Signs in against a Cognito user pool, keeps the session in a local file
//! and refreshes it when it expires.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use cognito_session::{
    config::Config,
    models::{SignUpRequest, UserAttributesUpdate},
    open_session,
    services::{validate_confirmation_code, validate_password_policy, ApiClient},
    time_utils::format_epoch_rfc3339,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(clap::ValueEnum, Clone, Debug, Default)]
enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "cognito-session", about = "Cognito user pool session client")]
struct Args {
    /// Log output format
    #[arg(short, long, default_value = "pretty", global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "COGNITO_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Report whether the session is usable, refreshing it if needed
    Status,
    /// Exchange the refresh token for new tokens
    Refresh,
    /// Sign out on every device and clear the local session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Change the password of the signed-in user
    ChangePassword {
        #[arg(long, env = "COGNITO_OLD_PASSWORD", hide_env_values = true)]
        old: String,
        #[arg(long, env = "COGNITO_NEW_PASSWORD", hide_env_values = true)]
        new: String,
    },
    /// Register a new account
    SignUp {
        #[arg(long)]
        email: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long, env = "COGNITO_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, default_value = "")]
        recaptcha_token: String,
    },
    /// Confirm a new account with the emailed code
    Confirm {
        #[arg(long)]
        email: String,
        #[arg(long)]
        code: String,
    },
    /// Send the account confirmation code again
    ResendCode {
        #[arg(long)]
        email: String,
    },
    /// Request a password reset code
    ForgotPassword {
        #[arg(long)]
        email: String,
    },
    /// Set a new password with a reset code
    ResetPassword {
        #[arg(long)]
        email: String,
        #[arg(long)]
        code: String,
        #[arg(long, env = "COGNITO_NEW_PASSWORD", hide_env_values = true)]
        new_password: String,
    },
    /// Update profile names
    UpdateProfile {
        #[arg(long)]
        given_name: Option<String>,
        #[arg(long)]
        family_name: Option<String>,
    },
    /// GET an API endpoint with the session's identity token
    ApiGet { endpoint: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args.log_format);

    let config = Config::from_env().context("Failed to load configuration")?;
    let session = open_session(&config).context("Failed to open session store")?;
    tracing::debug!(file = %config.session_file.display(), "Session store opened");

    match args.command {
        Command::Login { email, password } => {
            session.login(&email, &password).await?;
            println!("Logged in as {}", email);
        }
        Command::Status => {
            if session.check_auth_status().await {
                println!("authenticated");
            } else {
                println!("not authenticated");
                std::process::exit(1);
            }
        }
        Command::Refresh => {
            session.refresh_session().await?;
            println!("Session refreshed");
        }
        Command::Logout => {
            session.logout().await?;
            println!("Logged out");
        }
        Command::Whoami => {
            let claims = session.user_attributes().await?;
            println!("{} <{}> [{}]", claims.display_name(), claims.email, claims.initials());
            if let Some(exp) = claims.exp {
                println!("identity token expires {}", format_epoch_rfc3339(exp));
            }
        }
        Command::ChangePassword { old, new } => {
            validate_password_policy(&new)?;
            session.change_password(&old, &new).await?;
            println!("Password changed");
        }
        Command::SignUp {
            email,
            first_name,
            last_name,
            password,
            recaptcha_token,
        } => {
            validate_password_policy(&password)?;
            let request = SignUpRequest {
                email,
                first_name,
                last_name,
                password,
            };
            session.sign_up(&request, &recaptcha_token).await?;
            println!("Check {} for a confirmation code", request.email);
        }
        Command::Confirm { email, code } => {
            validate_confirmation_code(&code)?;
            session.confirm_sign_up(&email, &code).await?;
            println!("Account confirmed");
        }
        Command::ResendCode { email } => {
            session.resend_verification_code(&email).await?;
            println!("Confirmation code sent");
        }
        Command::ForgotPassword { email } => {
            session.forgot_password(&email).await?;
            println!("Password reset code sent");
        }
        Command::ResetPassword {
            email,
            code,
            new_password,
        } => {
            validate_confirmation_code(&code)?;
            validate_password_policy(&new_password)?;
            session
                .confirm_forgot_password(&email, &code, &new_password)
                .await?;
            println!("Password reset; you can now log in");
        }
        Command::UpdateProfile {
            given_name,
            family_name,
        } => {
            let mut update = UserAttributesUpdate::new();
            if let Some(v) = given_name {
                update = update.given_name(v);
            }
            if let Some(v) = family_name {
                update = update.family_name(v);
            }
            let claims = session.update_user_attributes(&update).await?;
            println!("Profile updated: {}", claims.display_name());
        }
        Command::ApiGet { endpoint } => {
            let Some(base_url) = config.api_base_url.as_deref() else {
                bail!("API_BASE_URL is not set");
            };
            if !session.check_auth_status().await {
                bail!("Not authenticated; log in first");
            }
            let api = ApiClient::new(base_url);
            let body: serde_json::Value = api.get(&endpoint, session.id_token().as_deref()).await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
    }

    Ok(())
}

/// Initialize structured logging to stderr.
fn init_logging(format: &LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("cognito_session=info,warn"));

    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .with_current_span(true)
                    .flatten_event(true)
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}
