use chrono::Utc;
use parley_llm::{CompletionClient, CompletionPayload, DataSource, Message, UpstreamError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::Config;
use crate::prompts;

/// Per-process settings that shape every upstream request
#[derive(Debug, Clone)]
pub struct ProxySettings {
    pub system_prompt: String,
    pub data_source: Option<DataSource>,
}

impl ProxySettings {
    pub fn from_config(config: &Config) -> Self {
        let data_source = config.search.as_ref().map(|search| search.data_source());
        Self {
            system_prompt: prompts::system_prompt(data_source.is_some()).to_string(),
            data_source,
        }
    }
}

/// Body returned to the browser on success
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    /// Timestamp-derived token; nothing is stored under it
    pub conversation_id: String,
}

/// Relays one chat turn to the completion endpoint.
///
/// Holds no per-conversation state: the client sends the history with every
/// request and the proxy forwards it unchanged.
pub struct ChatProxy {
    client: Arc<dyn CompletionClient>,
    settings: ProxySettings,
}

impl ChatProxy {
    pub fn new(client: Arc<dyn CompletionClient>, settings: ProxySettings) -> Self {
        Self { client, settings }
    }

    pub fn retrieval_enabled(&self) -> bool {
        self.settings.data_source.is_some()
    }

    /// System prompt, then the supplied history as-is, then the new message
    pub fn build_payload(&self, message: &str, history: Vec<Message>) -> CompletionPayload {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(self.settings.system_prompt.clone()));
        messages.extend(history);
        messages.push(Message::user(message));

        let payload = CompletionPayload::new(messages);
        match &self.settings.data_source {
            Some(source) => payload.with_data_source(source.clone()),
            None => payload,
        }
    }

    /// Single upstream attempt; failures are returned, never retried
    pub async fn complete(
        &self,
        message: &str,
        history: Vec<Message>,
    ) -> Result<ChatReply, UpstreamError> {
        let payload = self.build_payload(message, history);
        let response = self.client.send(&payload).await?;

        Ok(ChatReply {
            response,
            conversation_id: new_conversation_id(),
        })
    }
}

fn new_conversation_id() -> String {
    Utc::now().timestamp_millis().to_string()
}
