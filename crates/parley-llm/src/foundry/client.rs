// Azure AI Foundry / Azure OpenAI chat-completion client

use crate::config::{AuthStyle, UpstreamConfig, DEFAULT_TIMEOUT};
use crate::error::UpstreamError;
use crate::payload::CompletionPayload;
use crate::traits::CompletionClient;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use std::time::Duration;

/// Chat-completion client (HTTP direct, no SDK)
///
/// The configured endpoint is the complete URL of a deployment or model
/// endpoint, e.g.
/// `https://{resource}.openai.azure.com/openai/deployments/{deployment}/chat/completions?api-version=...`
/// or a serverless model URL. Each call is a single POST bounded by the
/// client timeout; failures are never retried.
#[derive(Debug)]
pub struct FoundryClient {
    http_client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl FoundryClient {
    pub fn builder() -> FoundryClientBuilder {
        FoundryClientBuilder::default()
    }

    pub fn from_config(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        Self::builder()
            .endpoint(config.endpoint.clone())
            .api_key(config.api_key.clone())
            .auth_style(config.auth_style)
            .timeout(config.timeout())
            .build()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn classify(&self, error: reqwest::Error) -> UpstreamError {
        if error.is_timeout() {
            UpstreamError::Timeout(self.timeout)
        } else {
            UpstreamError::Transport(error)
        }
    }
}

/// Builder for FoundryClient
#[derive(Default)]
pub struct FoundryClientBuilder {
    api_key: Option<String>,
    endpoint: Option<String>,
    auth_style: AuthStyle,
    timeout: Option<Duration>,
}

impl FoundryClientBuilder {
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Full URL the payload is POSTed to
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn auth_style(mut self, auth_style: AuthStyle) -> Self {
        self.auth_style = auth_style;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<FoundryClient, UpstreamError> {
        let api_key = self
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| UpstreamError::Configuration("API key is required".to_string()))?;
        let endpoint = self
            .endpoint
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .ok_or_else(|| UpstreamError::Configuration("Endpoint is required".to_string()))?;
        reqwest::Url::parse(&endpoint).map_err(|e| {
            UpstreamError::Configuration(format!("Endpoint is not a valid URL: {}", e))
        })?;

        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);

        let (header_name, header_value) = match self.auth_style.resolve(&endpoint) {
            AuthStyle::ApiKey => (
                HeaderName::from_static("api-key"),
                HeaderValue::from_str(&api_key),
            ),
            _ => (AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", api_key))),
        };
        let mut header_value = header_value
            .map_err(|_| UpstreamError::Configuration("Invalid API key format".to_string()))?;
        header_value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(header_name, header_value);

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| {
                UpstreamError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(FoundryClient {
            http_client,
            endpoint,
            timeout,
        })
    }
}

// ============================================================================
// TRAIT IMPLEMENTATION
// ============================================================================

#[async_trait]
impl CompletionClient for FoundryClient {
    async fn send(&self, payload: &CompletionPayload) -> Result<String, UpstreamError> {
        tracing::debug!(
            endpoint = %self.endpoint,
            messages = payload.messages.len(),
            retrieval = !payload.data_sources.is_empty(),
            "Sending completion request"
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(payload)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::from_status(status.as_u16(), body));
        }

        let raw: CompletionResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                UpstreamError::Timeout(self.timeout)
            } else {
                UpstreamError::MalformedResponse(e.to_string())
            }
        })?;

        raw.into_text()
    }
}

// ============================================================================
// RESPONSE TYPES (only the fields the proxy reads)
// ============================================================================

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl CompletionResponse {
    /// Text of the first choice; empty or missing content is malformed
    fn into_text(self) -> Result<String, UpstreamError> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.is_empty())
            .ok_or_else(|| {
                UpstreamError::MalformedResponse("completion contained no text".to_string())
            })
    }
}
