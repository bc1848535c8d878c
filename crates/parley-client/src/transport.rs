use async_trait::async_trait;
use parley_llm::Message;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Covers the server's own 60s request bound
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(90);

/// Body of `POST /api/chat`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub conversation_history: Vec<Message>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub conversation_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub timestamp: String,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Error)]
pub enum TransportError {
    /// Non-2xx reply; `message` is the server's `error` text when present
    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("Failed to reach server: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),
}

/// How a front end talks to `parley-api`
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn post_chat(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError>;

    /// `Ok` only for a 2xx health reply
    async fn health(&self) -> Result<HealthReport, TransportError>;
}

/// [`ChatTransport`] over HTTP
pub struct HttpTransport {
    http_client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Result<Self, TransportError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let http_client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            http_client,
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Turn a non-2xx response into [`TransportError::Server`]
async fn check_status(response: Response) -> Result<Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()));

    Err(TransportError::Server {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn post_chat(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError> {
        tracing::debug!(history_len = request.conversation_history.len(), "Posting chat message");

        let response = self
            .http_client
            .post(self.url("/api/chat"))
            .json(request)
            .send()
            .await?;
        let response = check_status(response).await?;

        response
            .json::<ChatResponse>()
            .await
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))
    }

    async fn health(&self) -> Result<HealthReport, TransportError> {
        let response = self.http_client.get(self.url("/api/health")).send().await?;
        let response = check_status(response).await?;

        response
            .json::<HealthReport>()
            .await
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))
    }
}
