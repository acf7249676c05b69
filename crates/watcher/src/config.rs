use std::time::Duration;

use clap::Parser;
use homework_core::{CursorMode, TrackBy, WatchError};
use tracing::error;

const DAY_SECS: u64 = 24 * 60 * 60;
const MAX_LOOKBACK_DAYS: u64 = 36_500;

#[derive(Debug, Parser)]
#[command(
    name = "homework-watcher",
    version,
    about = "Watch homework review statuses and report changes to Telegram"
)]
pub struct Cli {
    /// OAuth token for the homework status API.
    #[arg(long, env = "PRACTICUM_TOKEN", hide_env_values = true)]
    pub practicum_token: Option<String>,

    /// Telegram bot token.
    #[arg(long, env = "TELEGRAM_TOKEN", hide_env_values = true)]
    pub telegram_token: Option<String>,

    /// Chat that receives notifications.
    #[arg(long, env = "TELEGRAM_CHAT_ID")]
    pub telegram_chat_id: Option<String>,

    /// Homework status endpoint.
    #[arg(
        long,
        default_value = "https://practicum.yandex.ru/api/user_api/homework_statuses/"
    )]
    pub endpoint: String,

    /// Telegram Bot API base URL.
    #[arg(long, default_value = "https://api.telegram.org")]
    pub telegram_api: String,

    /// Pause between poll cycles, whether or not the cycle succeeded.
    #[arg(long, default_value_t = 600)]
    pub retry_period_seconds: u64,

    /// How far back each fetch looks, in days (1 to 36500).
    #[arg(
        long,
        default_value_t = 20,
        value_parser = clap::value_parser!(u64).range(1..=MAX_LOOKBACK_DAYS)
    )]
    pub lookback_days: u64,

    /// Timeout for every outgoing HTTP request.
    #[arg(long, default_value_t = 30)]
    pub request_timeout_seconds: u64,

    /// What counts as "already seen": status | homework
    #[arg(long, default_value_t = TrackBy::Status)]
    pub track_by: TrackBy,

    /// How the fetch window is chosen: lookback | advance
    #[arg(long, default_value_t = CursorMode::Lookback)]
    pub cursor: CursorMode,

    /// Run a single poll cycle, then exit.
    #[arg(long)]
    pub once: bool,

    /// Log level (env-filter syntax). RUST_LOG takes precedence when set.
    #[arg(long, default_value = "info")]
    pub log: String,
}

/// Validated runtime configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    pub practicum_token: String,
    pub telegram_token: String,
    pub telegram_chat_id: String,
    pub endpoint: String,
    pub telegram_api: String,
    pub retry_period: Duration,
    pub lookback: Duration,
    pub request_timeout: Duration,
    pub track_by: TrackBy,
    pub cursor: CursorMode,
    pub once: bool,
}

impl Settings {
    /// Check that every credential is present and non-empty.
    ///
    /// All missing names are reported together so one restart fixes them all.
    pub fn from_cli(cli: Cli) -> Result<Self, WatchError> {
        let mut missing = Vec::new();
        let practicum_token = required(cli.practicum_token, "PRACTICUM_TOKEN", &mut missing);
        let telegram_token = required(cli.telegram_token, "TELEGRAM_TOKEN", &mut missing);
        let telegram_chat_id = required(cli.telegram_chat_id, "TELEGRAM_CHAT_ID", &mut missing);

        if !missing.is_empty() {
            error!(missing = ?missing, "required configuration is absent; refusing to start");
            return Err(WatchError::ConfigMissing(missing));
        }

        let lookback = cli
            .lookback_days
            .checked_mul(DAY_SECS)
            .filter(|secs| i64::try_from(*secs).is_ok())
            .map(Duration::from_secs)
            .ok_or_else(|| WatchError::InvalidConfig {
                name: "lookback-days",
                reason: format!("{} days does not fit a unix timestamp", cli.lookback_days),
            })?;

        Ok(Self {
            practicum_token,
            telegram_token,
            telegram_chat_id,
            endpoint: cli.endpoint,
            telegram_api: cli.telegram_api.trim_end_matches('/').to_string(),
            retry_period: Duration::from_secs(cli.retry_period_seconds),
            lookback,
            request_timeout: Duration::from_secs(cli.request_timeout_seconds),
            track_by: cli.track_by,
            cursor: cli.cursor,
            once: cli.once,
        })
    }
}

fn required(value: Option<String>, name: &'static str, missing: &mut Vec<&'static str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => {
            missing.push(name);
            String::new()
        }
    }
}
