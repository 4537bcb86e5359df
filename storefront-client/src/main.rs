use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use common_auth::Role;
use common_session::{select_credential, RouteDecision};
use storefront_client::{ClientConfig, ClientError, FixedNavigator, Navigator, Storefront};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "storefront-session", about = "Inspect and drive storefront credentials")]
struct Cli {
    /// Credential file; overrides STOREFRONT_CREDENTIALS_PATH.
    #[arg(long, global = true)]
    store: Option<std::path::PathBuf>,

    /// Current page path used as navigation context.
    #[arg(long, global = true, default_value = "/")]
    path: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Store a token for a role.
    Login {
        #[arg(long)]
        role: Role,
        #[arg(long, env = "STOREFRONT_TOKEN", hide_env_values = true)]
        token: String,
    },
    /// Clear a role's token, or every token with --all.
    Logout {
        #[arg(long, required_unless_present = "all")]
        role: Option<Role>,
        #[arg(long)]
        all: bool,
    },
    /// Show the session for --path and every active role.
    Whoami,
    /// Show which credential a request from --path would carry.
    Select {
        #[arg(long)]
        request: String,
    },
    /// Evaluate the route guards for --path.
    Guard {
        #[arg(long = "allow", value_delimiter = ',')]
        allowed: Vec<Role>,
    },
    /// GET an API path and print the JSON body.
    Get {
        request: String,
        /// Print client metrics after the request.
        #[arg(long)]
        metrics: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env()?;
    if let Some(store) = cli.store {
        config.credentials_path = store;
    }

    let navigator = Arc::new(FixedNavigator::new(cli.path.clone()));
    let app = Storefront::from_config(config, navigator.clone())?;
    let nav = navigator.current();

    match cli.command {
        Command::Login { role, token } => {
            app.sessions.login(role, &token)?;
            match app.sessions.resolver().decode(&token) {
                Some(claims) if claims.role.is_some_and(|claimed| claimed != role) => {
                    let claimed = claims.role.map(|r| r.to_string()).unwrap_or_default();
                    println!("stored {role} token (token claims role {claimed})");
                }
                Some(_) => println!("stored {role} token"),
                None => println!("stored {role} token (not decodable; guards will reject it)"),
            }
        }
        Command::Logout { role, all } => {
            if all {
                app.sessions.logout_all()?;
                println!("cleared all credentials");
            } else if let Some(role) = role {
                app.sessions.logout(role)?;
                println!("cleared {role} credential");
            }
        }
        Command::Whoami => {
            match app.sessions.current(&nav) {
                Some(session) => {
                    let role = session
                        .role()
                        .map(|r| r.to_string())
                        .unwrap_or_else(|| "unknown role".into());
                    let subject = session.claims.subject.as_deref().unwrap_or("-");
                    println!("{}: {role} via {} (subject {subject})", nav.path(), session.slot);
                }
                None => println!("{}: not signed in", nav.path()),
            }
            for session in app.sessions.active_sessions() {
                let expires = session
                    .claims
                    .expires_at
                    .map(|at| at.to_rfc3339())
                    .unwrap_or_else(|| "never".into());
                println!("active {} (expires {expires})", session.slot);
            }
        }
        Command::Select { request } => {
            match select_credential(&nav, &request, app.store.as_ref()) {
                Some(selection) => println!("{} via {}", selection.slot, selection.step.as_str()),
                None => println!("anonymous"),
            }
        }
        Command::Guard { allowed } => match app.guards().evaluate(&nav, &allowed) {
            RouteDecision::Render(session) => println!("render as {}", session.slot),
            RouteDecision::Redirect { to, reason } => println!("redirect to {to} ({reason:?})"),
        },
        Command::Get { request, metrics } => {
            let base_url = app.config.require_api_base_url()?.to_string();
            let client = app.api_client(&base_url)?;
            match client.get_json::<serde_json::Value>(&request).await {
                Ok(body) => println!("{}", serde_json::to_string_pretty(&body)?),
                Err(ClientError::Unauthorized { evicted }) => {
                    match evicted {
                        Some(slot) => println!(
                            "unauthorized; cleared {slot} (reloads requested: {})",
                            navigator.reloads()
                        ),
                        None => println!("unauthorized; no credential cleared"),
                    }
                }
                Err(err) => return Err(err).context(format!("GET {request} failed")),
            }
            if metrics {
                print!("{}", app.metrics.render()?);
            }
        }
    }

    Ok(())
}
