//! Merge board client binary.
//!
//! Composition root: loads `.env`, sets up logging, builds the runtime via
//! `client_bootstrap` and runs the scripted drag session. Set
//! `MERGE_BACKEND_URL` to play against a REST backend; otherwise the offline
//! demo backend is used.
use std::path::PathBuf;

use anyhow::{Context, Result};
use client_bootstrap::{BootstrapConfig, RuntimeBuilder};
use merge_client::Client;
use merge_client::demo::ScriptedFrontend;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = BootstrapConfig::from_env();
    setup_logging(config.session_id.as_deref())?;

    tracing::info!(
        rest = config.uses_rest_backend(),
        session = ?config.session_id,
        "starting merge board"
    );

    let setup = RuntimeBuilder::new(config).build().await?;
    let frontend = ScriptedFrontend::new(
        setup.config.frontend.clone(),
        setup.config.runtime.board.clone(),
    );

    let client = Client::builder()
        .runtime(setup.runtime)
        .frontend(frontend)
        .build()?;
    client.run().await?;

    tracing::info!("merge board shut down");
    Ok(())
}

/// Logs to stderr and to `<cache dir>/logs/<session>/client.log`.
fn setup_logging(session_id: Option<&str>) -> Result<()> {
    let session_id = session_id
        .map(str::to_string)
        .unwrap_or_else(|| format!("session_{}", chrono::Utc::now().timestamp()));

    let session_log_dir = log_directory().join(session_id);
    std::fs::create_dir_all(&session_log_dir)
        .with_context(|| format!("failed to create {}", session_log_dir.display()))?;

    let file_appender = tracing_appender::rolling::never(&session_log_dir, "client.log");
    let (non_blocking_file, _guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    // Leak the guard to keep file writer alive
    std::mem::forget(_guard);

    Ok(())
}

fn log_directory() -> PathBuf {
    directories::ProjectDirs::from("", "", "merge-board")
        .map(|dirs| dirs.cache_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}
