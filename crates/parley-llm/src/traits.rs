use async_trait::async_trait;

use crate::error::UpstreamError;
use crate::payload::CompletionPayload;

/// A hosted chat-completion endpoint.
///
/// Implementors perform exactly one request per call and return the text of
/// the first completion choice. Tests substitute canned implementations.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn send(&self, payload: &CompletionPayload) -> Result<String, UpstreamError>;
}
