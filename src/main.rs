//! botwatch-alerts - alerting engine service
//!
//! Loads configuration, prepares the database and runs the alert manager
//! until interrupted.

#![allow(missing_docs)]

use botwatch_alerts::config::Config;
use botwatch_alerts::utils::logging::init_tracing;
use botwatch_alerts::{
    AlertManager, ChannelRegistry, ChannelType, MonitorEvent, Result, SeaOrmAlertStore,
};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

/// Alerting engine for bot, strategy and runner monitoring
#[derive(Debug, Parser)]
#[command(name = "botwatch-alerts", version, about)]
struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, env = "BOTWATCH_CONFIG", default_value = "config/alerts.yaml")]
    config: PathBuf,

    /// Run database migrations and exit
    #[arg(long)]
    migrate: bool,

    /// Send a test email and exit; without a value it goes to the sender address
    #[arg(long, value_name = "RECIPIENT", num_args = 0..=1, default_missing_value = "")]
    test_email: Option<String>,

    /// Read JSON monitor events, one per line, from standard input
    #[arg(long)]
    stdin_events: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is not an error
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Print error using Display (not Debug) to preserve newlines
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let config = Config::from_file(&args.config).await?;
    init_tracing(&config.logging)?;

    let store = SeaOrmAlertStore::connect(&config.database).await?;
    store.migrate().await?;
    if args.migrate {
        return Ok(());
    }

    let channel = ChannelRegistry::from_config(&config)?.get(ChannelType::Email)?;
    let manager = Arc::new(AlertManager::new(
        config.alerting.clone(),
        Arc::new(store),
        channel,
    )?);

    if let Some(recipient) = args.test_email {
        manager.test_channel(&recipient).await?;
        info!("Test email sent");
        return Ok(());
    }

    manager.start().await?;
    info!("botwatch-alerts {} started", botwatch_alerts::VERSION);

    let served = if args.stdin_events {
        tokio::select! {
            result = consume_stdin(&manager) => result,
            _ = shutdown_signal() => Ok(()),
        }
    } else {
        shutdown_signal().await;
        Ok(())
    };

    manager.stop().await?;
    served
}

async fn consume_stdin(manager: &AlertManager) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let event: MonitorEvent = match serde_json::from_str(&line) {
            Ok(event) => event,
            Err(e) => {
                warn!("Ignoring malformed event: {}", e);
                continue;
            }
        };

        if let Err(e) = manager.handle_event(event).await {
            warn!("Alert dispatch reported errors: {}", e);
        }
    }
    info!("Event stream closed");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
