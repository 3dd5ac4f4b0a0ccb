use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::app::{self, AppState, Stores};
use crate::config::{AppConfig, ReminderConfig};
use crate::database::{DatabaseManager, MemoryStore};
use crate::services::{gateway_from_config, ReminderService};

#[derive(Parser)]
#[command(name = "diary-api")]
#[command(about = "Diary API - personal diary backend with daily push reminders")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve,

    #[command(about = "Create the database schema and exit")]
    Migrate,

    #[command(about = "Send the daily reminder to every subscribed user")]
    Remind {
        #[arg(
            long,
            value_name = "SECS",
            value_parser = clap::value_parser!(u64).range(1..),
            help = "Dispatch every SECS seconds (default: REMINDER_INTERVAL_SECS)"
        )]
        every: Option<u64>,

        #[arg(long, conflicts_with = "every", help = "Dispatch a single time and exit")]
        once: bool,
    },
}

pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Migrate => migrate(config).await,
        Commands::Remind { every, once } => {
            let schedule = reminder_schedule(&config.reminder, every, once);
            remind(config, schedule).await
        }
    }
}

/// Postgres when `DATABASE_URL` is set, else the in-memory store.
async fn open_stores(config: &AppConfig) -> anyhow::Result<Stores> {
    if config.database.url.is_none() {
        tracing::warn!("DATABASE_URL not set, using the in-memory store (data is lost on exit)");
        return Ok(Stores::memory(MemoryStore::new()));
    }

    let pool = DatabaseManager::connect(&config.database).await?;
    DatabaseManager::migrate(&pool).await?;
    Ok(Stores::postgres(pool))
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    tracing::info!("Starting Diary API in {:?} mode", config.environment);

    let bind_addr = config.bind_address();
    let stores = open_stores(&config).await?;
    let state = AppState::new(config, stores)?;
    let app = app::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Diary API listening on http://{}", bind_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn migrate(config: AppConfig) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(&config.database).await?;
    DatabaseManager::migrate(&pool).await?;
    DatabaseManager::close(&pool).await;
    tracing::info!("Schema is up to date");
    Ok(())
}

/// `None` means a single dispatch; otherwise the period between dispatches.
fn reminder_schedule(config: &ReminderConfig, every: Option<u64>, once: bool) -> Option<Duration> {
    if once {
        return None;
    }
    Some(Duration::from_secs(every.unwrap_or(config.interval_secs)))
}

async fn remind(config: AppConfig, schedule: Option<Duration>) -> anyhow::Result<()> {
    let stores = open_stores(&config).await?;
    let gateway = gateway_from_config(&config.reminder)?;
    let reminders = ReminderService::new(Arc::clone(&stores.users), gateway);

    match schedule {
        Some(period) => {
            tracing::info!("Dispatching reminders every {}s", period.as_secs());
            tokio::select! {
                _ = reminders.run_every(period) => {}
                _ = shutdown_signal() => {}
            }
        }
        None => {
            let summary = reminders.dispatch().await?;
            tracing::info!(
                "Reminded {} of {} subscribers",
                summary.delivered,
                summary.subscribers
            );
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
