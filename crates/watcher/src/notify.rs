use async_trait::async_trait;
use homework_core::WatchError;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, error};

/// Delivers plain-text messages to a fixed destination.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<(), WatchError>;
}

/// Telegram Bot API `sendMessage` client bound to one chat.
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    token: String,
    chat_id: String,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

impl TelegramNotifier {
    pub fn new(client: Client, api_base: String, token: String, chat_id: String) -> Self {
        Self {
            client,
            api_base,
            token,
            chat_id,
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<(), WatchError> {
        // The token is part of the path, so errors are stripped of their url.
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.token);
        let resp = self
            .client
            .post(&url)
            .json(&SendMessage {
                chat_id: &self.chat_id,
                text,
            })
            .send()
            .await
            .map_err(|e| WatchError::NotifyFailure(e.without_url().to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(WatchError::NotifyFailure(format!(
                "telegram returned {status}: {body}"
            )));
        }
        Ok(())
    }
}

/// Best-effort delivery: failures are logged and swallowed.
///
/// Returns whether the message went out.
pub async fn send_message<N: Notifier + ?Sized>(notifier: &N, text: &str) -> bool {
    match notifier.send(text).await {
        Ok(()) => {
            debug!(text, "message sent");
            true
        }
        Err(e) => {
            error!(kind = e.kind(), "could not send message: {e}");
            false
        }
    }
}
