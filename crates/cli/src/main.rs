//! Coral CLI - Database migrations, sync runs, and webhook management.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! coral migrate
//!
//! # Run a full catalog sync
//! coral sync run
//!
//! # Show the latest sync log per entity type
//! coral sync status
//!
//! # Converge webhook subscriptions to the configured base URL
//! coral webhooks reconcile
//!
//! # Persist a new base URL and re-point all webhooks at it
//! coral webhooks set-url https://app.example.com
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `sync run` - Run a full catalog sync for the configured store
//! - `sync status` - Show the latest sync log per entity type
//! - `webhooks reconcile` - Converge remote webhook subscriptions
//! - `webhooks set-url` - Persist a new base URL, then converge

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "coral")]
#[command(author, version, about = "Coral CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Catalog sync operations
    Sync {
        #[command(subcommand)]
        action: SyncAction,
    },
    /// Webhook subscription management
    Webhooks {
        #[command(subcommand)]
        action: WebhooksAction,
    },
}

#[derive(Subcommand)]
enum SyncAction {
    /// Run a full catalog sync for the configured store
    Run,
    /// Show the latest sync log per entity type
    Status,
}

#[derive(Subcommand)]
enum WebhooksAction {
    /// Converge remote webhook subscriptions to the configured base URL
    Reconcile,
    /// Persist a new base URL and re-point all webhooks at it
    SetUrl {
        /// The new base URL (e.g., <https://app.example.com>)
        url: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Error tracking (no-op when SENTRY_DSN is unset)
    let _sentry = std::env::var("SENTRY_DSN").ok().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Sync { action } => match action {
            SyncAction::Run => commands::sync::run().await?,
            SyncAction::Status => commands::sync::status().await?,
        },
        Commands::Webhooks { action } => match action {
            WebhooksAction::Reconcile => commands::webhooks::reconcile().await?,
            WebhooksAction::SetUrl { url } => commands::webhooks::set_url(&url).await?,
        },
    }
    Ok(())
}
