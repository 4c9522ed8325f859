use std::sync::Arc;

use clap::Subcommand;
use impause_core::auth::{AuthClient, AuthSession, AuthStatus, KeyringTokenStore, TokenStore};
use impause_core::Config;

use super::{http_client, CmdResult};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Sign in and store the session token in the OS keyring
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
    },
    /// Sign out (the local token is always removed)
    Logout,
    /// Check authentication status
    Status,
    /// Show the signed-in profile
    Me,
    /// Change password
    Password {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
    },
}

fn print_status(status: &AuthStatus) {
    match status {
        AuthStatus::SignedIn { email, role, .. } => println!("signed in as {email} ({role})"),
        AuthStatus::SignedOut => println!("signed out"),
    }
}

pub async fn run(action: AuthAction) -> CmdResult {
    let config = Config::load_or_default();
    let tokens: Arc<dyn TokenStore> = Arc::new(KeyringTokenStore);
    let client = AuthClient::new(
        http_client(&config)?,
        config.endpoints.auth_base_url.clone(),
        tokens.clone(),
    );
    let session = AuthSession::new(tokens)?;
    session.subscribe(|status| tracing::debug!(?status, "auth status"));

    match action {
        AuthAction::Login { email, password } => {
            client.login(&email, &password).await?;
            print_status(&session.notify_changed()?);
        }
        AuthAction::Register {
            email,
            password,
            first_name,
            last_name,
        } => {
            client
                .register(&email, &password, &first_name, &last_name)
                .await?;
            println!("account created");
            print_status(&session.notify_changed()?);
        }
        AuthAction::Logout => {
            client.logout().await?;
            print_status(&session.notify_changed()?);
        }
        AuthAction::Status => print_status(&session.status()),
        AuthAction::Me => {
            let profile = client.me().await?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
        AuthAction::Password { current, new } => {
            client.update_password(&current, &new).await?;
            println!("password updated");
        }
    }
    Ok(())
}
