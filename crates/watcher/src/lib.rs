#![forbid(unsafe_code)]

//! Polls the homework review API and reports status changes to a Telegram chat.

use anyhow::{Context, Result};
use tracing::info;

pub mod api;
pub mod config;
pub mod notify;
pub mod poll;

pub use config::{Cli, Settings};
pub use poll::{CycleOutcome, CycleReport, Watcher};

/// Validate configuration, build the clients and drive the poll loop.
///
/// Returns early with [`homework_core::WatchError::ConfigMissing`] (wrapped in
/// `anyhow`) before any network client exists when credentials are absent. With
/// `--once` it returns after a single cycle, carrying that cycle's error if it
/// failed, so the process exit code reflects the outcome. Otherwise it returns
/// only on Ctrl-C.
pub async fn launch(cli: Cli) -> Result<()> {
    let settings = Settings::from_cli(cli)?;
    info!(
        endpoint = %settings.endpoint,
        retry_period_s = settings.retry_period.as_secs(),
        track_by = %settings.track_by,
        cursor = %settings.cursor,
        "starting homework watcher"
    );

    let http = reqwest::Client::builder()
        .timeout(settings.request_timeout)
        .build()
        .context("build http client")?;

    let source = api::PracticumClient::new(
        http.clone(),
        settings.endpoint.clone(),
        settings.practicum_token.clone(),
    );
    let notifier = notify::TelegramNotifier::new(
        http,
        settings.telegram_api.clone(),
        settings.telegram_token.clone(),
        settings.telegram_chat_id.clone(),
    );

    let once = settings.once;
    let mut watcher = Watcher::new(source, notifier, &settings);
    if once {
        watcher.run_once().await?;
    } else {
        watcher.run(shutdown_signal()).await;
    }
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
