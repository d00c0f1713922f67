//! # autoapplyd — autoapply daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Initialize logging
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct repository and collaborator implementations (adapters)
//! - Construct the services and the automation engine, injecting adapters
//!   via port traits
//! - Start the background scheduler
//! - Build the axum router, bind to a TCP port and serve
//! - Handle graceful shutdown (SIGTERM/SIGINT), then stop the scheduler
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use autoapply_adapter_http_axum::state::AppState;
use autoapply_adapter_storage_sqlite_sqlx::{
    SqliteAutomationRuleRepository, SqliteOutcomeStore, SqliteScheduleRepository,
};
use autoapply_adapter_webhook::{HttpSubmitter, KeyRotation, WebhookNotifier};
use autoapply_app::automation_engine::AutomationEngine;
use autoapply_app::scheduler::Scheduler;
use autoapply_app::services::{AutomationRuleService, ScheduleService};

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();

    // Database
    let db = autoapply_adapter_storage_sqlite_sqlx::Config {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await?;
    let pool = db.pool().clone();

    // Repositories
    let schedule_repo = Arc::new(SqliteScheduleRepository::new(pool.clone()));
    let rule_repo = Arc::new(SqliteAutomationRuleRepository::new(pool.clone()));
    let outcome_store = Arc::new(SqliteOutcomeStore::new(pool));

    // Outbound collaborators
    let engine_config = config.engine();
    let submitter = HttpSubmitter::new(
        config.submission.endpoint.clone(),
        KeyRotation::new(config.submission.api_keys.clone()),
        engine_config.submission_timeout,
    )?;
    let notifier = WebhookNotifier::new(
        config.notification.webhook_url.clone(),
        engine_config.submission_timeout,
    )?;
    if !notifier.is_delivering() {
        tracing::info!("no notification webhook configured, reminders are only logged");
    }

    // Engine and scheduler
    let engine = AutomationEngine::new(
        Arc::clone(&schedule_repo),
        Arc::clone(&rule_repo),
        Arc::clone(&outcome_store),
        submitter,
        notifier,
        engine_config,
    );
    let scheduler = Scheduler::new(Arc::new(engine), config.sweep_interval());
    scheduler.start().await;

    // HTTP
    let state = AppState::new(
        ScheduleService::new(schedule_repo, outcome_store),
        AutomationRuleService::new(rule_repo),
        scheduler.status(),
    );
    let app = autoapply_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, "autoapplyd listening");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    scheduler.stop().await;
    tracing::info!("autoapplyd stopped");

    served?;
    Ok(())
}

/// Resolve on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    tracing::info!("shutdown requested");
}
