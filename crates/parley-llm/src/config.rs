// Connection settings for the upstream completion endpoint

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-request timeout applied when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const AZURE_OPENAI_HOST_SUFFIX: &str = ".openai.azure.com";

/// How the API key is presented to the endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthStyle {
    /// `api-key` for Azure OpenAI resource hosts, bearer token otherwise
    #[default]
    Auto,
    /// `Authorization: Bearer <key>` (direct model endpoints)
    Bearer,
    /// `api-key: <key>` (Azure OpenAI deployments)
    ApiKey,
}

impl AuthStyle {
    /// Resolve `Auto` against the endpoint URL. Never returns `Auto`.
    pub fn resolve(self, endpoint: &str) -> AuthStyle {
        match self {
            Self::Auto => {
                let is_azure_openai = reqwest::Url::parse(endpoint)
                    .ok()
                    .and_then(|url| url.host_str().map(|h| h.ends_with(AZURE_OPENAI_HOST_SUFFIX)))
                    .unwrap_or(false);
                if is_azure_openai {
                    Self::ApiKey
                } else {
                    Self::Bearer
                }
            }
            explicit => explicit,
        }
    }
}

/// Everything needed to reach the completion endpoint
#[derive(Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Full URL the payload is POSTed to
    pub endpoint: String,
    pub api_key: String,
    #[serde(default)]
    pub auth_style: AuthStyle,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

impl UpstreamConfig {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            auth_style: AuthStyle::Auto,
            timeout_secs: default_timeout_secs(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl std::fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("auth_style", &self.auth_style)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
