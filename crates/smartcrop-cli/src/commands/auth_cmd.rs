use smartcrop_core::account::{SessionState, SignUpForm};
use smartcrop_core::auth::SignUpOutcome;

use crate::cli::AuthCommands;
use crate::commands::common::AppContext;
use crate::error::CliError;

pub async fn run_auth(context: &AppContext, command: AuthCommands) -> Result<(), CliError> {
    let store = context.open_store().await?;
    let mut account = context.require_account(&store).await?;

    match command {
        AuthCommands::Login { email, password } => {
            let profile = account.sign_in(&email, &password).await?;
            let name = profile.name.clone();
            let email_label = signed_in_email(account.state());
            println!("Signed in as {email_label} ({name})");
        }
        AuthCommands::Signup {
            name,
            email,
            password,
            confirm_password,
            accept_terms,
        } => {
            let form = SignUpForm {
                name,
                email,
                password,
                confirm_password,
                accepted_terms: accept_terms,
            };
            match account.sign_up(&form).await? {
                SignUpOutcome::SignedIn(session) => {
                    let email_label = session.user.email.as_deref().unwrap_or("(no email)");
                    println!("Account created. Signed in as {email_label}");
                }
                SignUpOutcome::ConfirmationRequired(user) => {
                    let email_label = user.email.as_deref().unwrap_or("your inbox");
                    println!(
                        "Account created. Check {email_label} to verify your email, \
                         then run `smartcrop auth login`."
                    );
                }
            }
        }
        AuthCommands::Logout => {
            account.sign_out().await?;
            println!("Signed out");
        }
        AuthCommands::Status => match account.state() {
            SessionState::Authenticated { session, profile } => {
                let email_label = session.user.email.as_deref().unwrap_or("(no email)");
                let verified = if session.user.email_confirmed {
                    "verified"
                } else {
                    "not verified"
                };
                println!(
                    "Signed in as {email_label} ({}, email {verified}, expires_at={})",
                    profile.name, session.expires_at
                );
            }
            SessionState::Unauthenticated => println!("Not signed in."),
        },
        AuthCommands::ResetPassword { email } => {
            account.request_password_reset(&email).await?;
            println!("Password reset email sent. Check your inbox.");
        }
        AuthCommands::ResendVerification => {
            account.resend_verification().await?;
            println!("Verification email sent.");
        }
        AuthCommands::Reload => {
            if account.reload_user().await? {
                println!("Email verified.");
            } else {
                println!("Email not verified yet.");
            }
        }
        AuthCommands::Refresh => {
            account.refresh_session().await?;
            let expires_at = account.session().map_or(0, |session| session.expires_at);
            println!("Session refreshed (expires_at={expires_at})");
        }
    }
    Ok(())
}

pub fn signed_in_email(state: &SessionState) -> &str {
    match state {
        SessionState::Authenticated { session, .. } => {
            session.user.email.as_deref().unwrap_or("(no email)")
        }
        SessionState::Unauthenticated => "(signed out)",
    }
}
