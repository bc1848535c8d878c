use serde::{Deserialize, Serialize};

use crate::types::Message;

/// Sampling parameters sent with every completion request.
///
/// The proxy always uses [`SamplingParams::default`]; callers cannot override
/// them per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    pub frequency_penalty: f64,
    pub presence_penalty: f64,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            max_tokens: 1000,
            temperature: 0.7,
            top_p: 0.95,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
        }
    }
}

/// Retrieval source the upstream model searches before answering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DataSource {
    AzureSearch { parameters: SearchParameters },
}

impl DataSource {
    /// Azure AI Search index authenticated with an admin/query key
    pub fn azure_search(
        endpoint: impl Into<String>,
        index_name: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self::AzureSearch {
            parameters: SearchParameters {
                endpoint: endpoint.into(),
                index_name: index_name.into(),
                authentication: SearchAuthentication::ApiKey { key: key.into() },
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchParameters {
    pub endpoint: String,
    pub index_name: String,
    pub authentication: SearchAuthentication,
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SearchAuthentication {
    ApiKey { key: String },
}

impl std::fmt::Debug for SearchAuthentication {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiKey { .. } => f.write_str("ApiKey { key: <redacted> }"),
        }
    }
}

/// Request body for a chat-completion endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionPayload {
    pub messages: Vec<Message>,

    #[serde(flatten)]
    pub sampling: SamplingParams,

    /// Omitted from the wire format when empty
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_sources: Vec<DataSource>,
}

impl CompletionPayload {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            sampling: SamplingParams::default(),
            data_sources: Vec::new(),
        }
    }

    pub fn with_data_source(mut self, source: DataSource) -> Self {
        self.data_sources.push(source);
        self
    }
}
