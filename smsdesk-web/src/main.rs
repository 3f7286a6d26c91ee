//! smsdesk-web: admin dashboard for SMS sender-identity requests
//!
//! Serves the login, dashboard and history pages against the sender-data
//! backend, and carries a few operational subcommands for configuration
//! and connectivity checks.

mod cli;
mod config;
mod routes;
mod session;
mod templates;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use smsdesk_client::{
    ApiClient, AuthProvider, BackendAuthProvider, DateRange, NotificationPoller, PollerConfig,
};
use tokio::net::TcpListener;
use tracing::info;

use cli::{Cli, Command};
use config::Config;
use routes::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli::init_logging(&cli)?;

    let config = Config::load(cli.config.clone()).context("Failed to load configuration")?;
    let client =
        ApiClient::new(&config.backend.url).context("Failed to create backend client")?;

    match cli.command {
        Some(Command::DumpConfig {
            show_sensitive,
            save,
        }) => {
            if save {
                let path = cli.config.unwrap_or_else(Config::default_path);
                config.save(&path)?;
            }
            dump_config(&config, show_sensitive)
        }
        Some(Command::CheckBackend { email, password }) => {
            check_backend(&client, email.as_deref(), password.as_deref()).await
        }
        Some(Command::Watch {
            email,
            password,
            interval,
        }) => watch(client, &email, &password, interval).await,
        None => serve(config, client).await,
    }
}

/// Print the effective configuration as TOML
fn dump_config(config: &Config, show_sensitive: bool) -> Result<()> {
    let mut printable = config.clone();
    if !show_sensitive {
        printable.session.secret = "<redacted>".into();
    }
    let rendered =
        toml::to_string_pretty(&printable).context("Failed to render configuration")?;
    println!("{rendered}");
    Ok(())
}

/// Probe the backend's public endpoint; with credentials, verify the full
/// login path and fetch the profile
async fn check_backend(
    client: &ApiClient,
    email: Option<&str>,
    password: Option<&str>,
) -> Result<()> {
    info!(url = client.base_url(), "checking backend");
    let senders = client
        .available_senders(&DateRange::default())
        .await
        .context("Backend probe failed")?;
    println!("Backend OK: {} sender rows available", senders.len());

    if let (Some(email), Some(password)) = (email, password) {
        let auth = BackendAuthProvider::new(client.clone());
        let session = auth
            .login(email, password)
            .await
            .context("Login against backend failed")?;
        let account = client
            .me(&session)
            .await
            .context("Profile fetch against backend failed")?;
        println!(
            "Login OK: {} <{}> (role: {})",
            account.name,
            account.email,
            account.role.as_deref().unwrap_or("none")
        );
    }
    Ok(())
}

/// Run the notification poller against a real account and print each
/// snapshot as it arrives, until Ctrl-C
async fn watch(client: ApiClient, email: &str, password: &str, interval: u64) -> Result<()> {
    let auth = BackendAuthProvider::new(client.clone());
    let session = auth
        .login(email, password)
        .await
        .context("Login against backend failed")?;
    info!(email = %session.account().email, interval, "watching notifications");

    let handle = NotificationPoller::spawn(
        client,
        session,
        PollerConfig {
            interval: Duration::from_secs(interval),
        },
    );
    let mut snapshots = handle.subscribe();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                println!(
                    "{} notifications, {} unread",
                    snapshot.notifications.len(),
                    snapshot.unread_count()
                );
                for notification in &snapshot.notifications {
                    let marker = if notification.is_read { " " } else { "*" };
                    println!(
                        "  {marker} [{}] {} {}",
                        notification.thai_date, notification.request_id, notification.status
                    );
                }
            }
        }
    }

    handle.stop().await;
    Ok(())
}

/// Start the dashboard server
async fn serve(config: Config, client: ApiClient) -> Result<()> {
    let auth: Arc<dyn AuthProvider> = Arc::new(BackendAuthProvider::new(client.clone()));
    let state = Arc::new(AppState::new(&config, client, auth));
    let app = routes::router(state);

    let listener = TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_addr))?;
    info!(
        addr = %config.server.bind_addr,
        backend = %config.backend.url,
        "dashboard listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await
        .context("Server error")?;
    Ok(())
}
