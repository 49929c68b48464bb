//! HTTP client for the bot control API.
//!
//! Every endpoint answers JSON. A non-success status is an error carrying
//! the response body text; acknowledgements are parsed but otherwise unused.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use algodash_core::{BotStatus, Settings, SettingsPayload};
use algodash_telemetry::Metrics;

use crate::error::{ApiError, ApiResult};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// Control API endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Tickers,
    Selection,
    SettingsRead,
    SettingsWrite,
    BotStatus,
    BotStart,
    BotStop,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Tickers => "/api/tickers",
            Self::Selection => "/api/selection",
            Self::SettingsRead | Self::SettingsWrite => "/api/settings",
            Self::BotStatus => "/api/bot/status",
            Self::BotStart => "/api/bot/start",
            Self::BotStop => "/api/bot/stop",
        }
    }

    /// Metrics label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tickers => "tickers",
            Self::Selection => "selection",
            Self::SettingsRead => "settings_read",
            Self::SettingsWrite => "settings_write",
            Self::BotStatus => "bot_status",
            Self::BotStart => "bot_start",
            Self::BotStop => "bot_stop",
        }
    }
}

/// Remote operations used by the control panel.
///
/// Implemented over HTTP by [`ControlClient`] and in memory by
/// [`crate::MockControlApi`].
pub trait ControlApi: Send + Sync {
    /// Fetch the symbol universe. A missing `symbols` field yields an empty list.
    fn fetch_tickers(&self) -> BoxFuture<'_, ApiResult<Vec<String>>>;

    /// Persist the chosen symbols.
    fn save_selection(&self, symbols: Vec<String>) -> BoxFuture<'_, ApiResult<()>>;

    fn fetch_settings(&self) -> BoxFuture<'_, ApiResult<Settings>>;

    fn post_settings(&self, payload: SettingsPayload) -> BoxFuture<'_, ApiResult<()>>;

    fn bot_status(&self) -> BoxFuture<'_, ApiResult<BotStatus>>;

    fn start_bot(&self) -> BoxFuture<'_, ApiResult<()>>;

    fn stop_bot(&self) -> BoxFuture<'_, ApiResult<()>>;
}

/// Arc wrapper for ControlApi trait objects.
pub type DynControlApi = Arc<dyn ControlApi>;

#[derive(Debug, Deserialize)]
struct TickersResponse {
    #[serde(default)]
    symbols: Option<Vec<serde_json::Value>>,
}

impl TickersResponse {
    /// Symbols as strings; non-string entries keep their JSON text.
    fn into_symbols(self) -> Vec<String> {
        self.symbols
            .unwrap_or_default()
            .into_iter()
            .map(|v| match v {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
            .collect()
    }
}

#[derive(Debug, Serialize)]
struct SelectionRequest<'a> {
    symbols: &'a [String],
}

/// HTTP implementation of [`ControlApi`].
#[derive(Debug, Clone)]
pub struct ControlClient {
    client: Client,
    base_url: String,
}

impl ControlClient {
    /// Create a client with the default request timeout.
    ///
    /// # Arguments
    /// * `base_url` - Origin of the control API (e.g., "http://127.0.0.1:8000")
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::HttpClient(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: Endpoint) -> ApiResult<T> {
        let url = self.url(endpoint);
        debug!(%url, "GET");
        let result = async {
            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| ApiError::HttpClient(format!("HTTP request failed: {e}")))?;
            read_json(response).await
        }
        .await;
        Metrics::api_call(endpoint.as_str(), result.is_ok());
        result
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        endpoint: Endpoint,
        body: Option<&B>,
    ) -> ApiResult<serde_json::Value> {
        let url = self.url(endpoint);
        debug!(%url, "POST");
        let result = async {
            let mut request = self.client.post(&url);
            if let Some(body) = body {
                request = request.json(body);
            }
            let response = request
                .send()
                .await
                .map_err(|e| ApiError::HttpClient(format!("HTTP request failed: {e}")))?;
            read_json(response).await
        }
        .await;
        Metrics::api_call(endpoint.as_str(), result.is_ok());
        result
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = match response.text().await {
            Ok(text) => text,
            Err(_) => status.canonical_reason().unwrap_or_default().to_string(),
        };
        return Err(ApiError::Status {
            status: status.as_u16(),
            body,
        });
    }
    response
        .json()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

impl ControlApi for ControlClient {
    fn fetch_tickers(&self) -> BoxFuture<'_, ApiResult<Vec<String>>> {
        Box::pin(async move {
            let body: TickersResponse = self.get_json(Endpoint::Tickers).await?;
            let symbols = body.into_symbols();
            info!(count = symbols.len(), "Fetched tickers");
            Ok(symbols)
        })
    }

    fn save_selection(&self, symbols: Vec<String>) -> BoxFuture<'_, ApiResult<()>> {
        Box::pin(async move {
            let request = SelectionRequest { symbols: &symbols };
            self.post_json(Endpoint::Selection, Some(&request)).await?;
            info!(count = symbols.len(), "Selection saved");
            Ok(())
        })
    }

    fn fetch_settings(&self) -> BoxFuture<'_, ApiResult<Settings>> {
        Box::pin(async move { self.get_json(Endpoint::SettingsRead).await })
    }

    fn post_settings(&self, payload: SettingsPayload) -> BoxFuture<'_, ApiResult<()>> {
        Box::pin(async move {
            self.post_json(Endpoint::SettingsWrite, Some(&payload)).await?;
            Ok(())
        })
    }

    fn bot_status(&self) -> BoxFuture<'_, ApiResult<BotStatus>> {
        Box::pin(async move { self.get_json(Endpoint::BotStatus).await })
    }

    fn start_bot(&self) -> BoxFuture<'_, ApiResult<()>> {
        Box::pin(async move {
            self.post_json::<()>(Endpoint::BotStart, None).await?;
            Ok(())
        })
    }

    fn stop_bot(&self) -> BoxFuture<'_, ApiResult<()>> {
        Box::pin(async move {
            self.post_json::<()>(Endpoint::BotStop, None).await?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_paths() {
        assert_eq!(Endpoint::Tickers.path(), "/api/tickers");
        assert_eq!(Endpoint::SettingsRead.path(), Endpoint::SettingsWrite.path());
        assert_eq!(Endpoint::BotStop.path(), "/api/bot/stop");
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = ControlClient::new("http://localhost:8000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(
            client.url(Endpoint::BotStatus),
            "http://localhost:8000/api/bot/status"
        );
    }

    #[test]
    fn test_tickers_response_missing_or_null() {
        let a: TickersResponse = serde_json::from_str("{}").unwrap();
        let b: TickersResponse = serde_json::from_str(r#"{"symbols":null}"#).unwrap();
        assert!(a.into_symbols().is_empty());
        assert!(b.into_symbols().is_empty());
    }

    #[test]
    fn test_tickers_response_coerces_non_strings() {
        let body: TickersResponse =
            serde_json::from_str(r#"{"symbols":["AAPL",500325,1.5,true]}"#).unwrap();
        assert_eq!(body.into_symbols(), vec!["AAPL", "500325", "1.5", "true"]);
    }

    #[test]
    fn test_selection_request_shape() {
        let symbols = vec!["AAPL".to_string(), "MSFT".to_string()];
        let json = serde_json::to_string(&SelectionRequest { symbols: &symbols }).unwrap();
        assert_eq!(json, r#"{"symbols":["AAPL","MSFT"]}"#);
    }
}
