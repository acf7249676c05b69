use async_trait::async_trait;
use homework_core::WatchError;
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::{debug, error};

/// Where homework statuses come from.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Fetch the raw status payload for everything updated since `from_date`
    /// (unix seconds). The payload is returned unvalidated.
    async fn fetch(&self, from_date: i64) -> Result<Value, WatchError>;
}

/// HTTP client for the homework status endpoint.
#[derive(Debug, Clone)]
pub struct PracticumClient {
    client: Client,
    endpoint: String,
    token: String,
}

impl PracticumClient {
    pub fn new(client: Client, endpoint: String, token: String) -> Self {
        Self {
            client,
            endpoint,
            token,
        }
    }

    fn url(&self, from_date: i64) -> Result<Url, WatchError> {
        let mut url = Url::parse(&self.endpoint).map_err(|e| WatchError::RequestFailure {
            url: self.endpoint.clone(),
            reason: format!("invalid endpoint url: {e}"),
        })?;
        url.query_pairs_mut()
            .append_pair("from_date", &from_date.to_string());
        Ok(url)
    }
}

#[async_trait]
impl StatusSource for PracticumClient {
    async fn fetch(&self, from_date: i64) -> Result<Value, WatchError> {
        let url = self.url(from_date)?;
        debug!(%url, from_date, "requesting homework statuses");

        let resp = self
            .client
            .get(url.clone())
            .header(reqwest::header::AUTHORIZATION, format!("OAuth {}", self.token))
            .send()
            .await
            .map_err(|e| {
                error!(%url, "status request failed: {e}");
                WatchError::RequestFailure {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            error!(%url, status = status.as_u16(), "status endpoint rejected the request");
            return Err(WatchError::ResponseError {
                status: status.as_u16(),
                url: resp.url().to_string(),
            });
        }

        let body = resp.bytes().await.map_err(|e| WatchError::RequestFailure {
            url: url.to_string(),
            reason: format!("read body: {e}"),
        })?;

        serde_json::from_slice(&body).map_err(|e| {
            error!(%url, "status response is not json: {e}");
            WatchError::Decode {
                url: url.to_string(),
                reason: e.to_string(),
            }
        })
    }
}
