// session-client/src/main.rs
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use common::models::PrivyUser;
use common::{setup_tracing, AuthError, Config};
use serde::Serialize;
use session_client::flow::log_body;
use session_client::{BackendEndpoints, FileTokenStore, SessionFlow, StaticAccessToken};

#[derive(Debug, Parser)]
#[command(
    name = "session-client",
    about = "Exchange a Privy access token for an application session"
)]
struct Cli {
    /// Current Privy access token
    #[arg(long, env = "PRIVY_ACCESS_TOKEN")]
    access_token: Option<String>,

    /// Cookie string to inspect for the privy-token cookie
    #[arg(long, env = "PRIVY_COOKIE")]
    cookie: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the cookie token and the access token
    Tokens,
    /// Pretty-print the user object sent to the backend
    Body {
        #[arg(long)]
        user: PathBuf,
    },
    /// Check the access token against the verification endpoint
    Verify,
    /// Exchange the access token for an application token
    Exchange {
        #[arg(long)]
        user: PathBuf,
    },
    /// Log the tokens, then run the exchange
    Start {
        #[arg(long)]
        user: PathBuf,
    },
    /// Fetch the profile with the application token
    Profile,
    /// Forget the stored application token
    Clear,
}

#[tokio::main]
async fn main() -> ExitCode {
    setup_tracing();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", pretty(&e.to_error_body()));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), AuthError> {
    let config = Config::from_env();
    let endpoints = BackendEndpoints::from_config(&config)?;
    let store = FileTokenStore::new(&config.client.storage_path);
    let access_tokens = StaticAccessToken::new(cli.access_token);

    let mut flow = SessionFlow::new(
        endpoints,
        store,
        access_tokens,
        config.client.storage_key.clone(),
    );
    let cookie = cli.cookie.as_deref();

    match cli.command {
        Command::Tokens => {
            let report = flow.log_auth_tokens(cookie).await;
            println!("{}", pretty(&report));
        }
        Command::Body { user } => {
            let user = read_user(&user)?;
            let body = log_body(&user)
                .map_err(|e| AuthError::Configuration(format!("Unprintable user object: {}", e)))?;
            println!("{}", body);
        }
        Command::Verify => {
            let result = flow.verify_token().await?;
            println!("{}", pretty(&result));
        }
        Command::Exchange { user } => {
            let user = read_user(&user)?;
            let response = flow.exchange(&user).await?;
            println!("{}", pretty(&response));
        }
        Command::Start { user } => {
            let user = read_user(&user)?;
            let response = flow.start_session(&user, cookie).await?;
            println!("{}", pretty(&response));
        }
        Command::Profile => {
            let profile = flow.fetch_profile().await?;
            println!("{}", pretty(&profile));
        }
        Command::Clear => {
            flow.clear_session()?;
            println!("Application token cleared");
        }
    }

    Ok(())
}

fn read_user(path: &Path) -> Result<PrivyUser, AuthError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        AuthError::Configuration(format!("Failed to read user object {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&contents).map_err(|e| {
        AuthError::Configuration(format!("Invalid user object {}: {}", path.display(), e))
    })
}

fn pretty<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "<unprintable>".to_string())
}
