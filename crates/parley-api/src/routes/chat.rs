use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use parley_llm::Message;
use serde_json::Value;
use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    proxy::ChatReply,
    state::AppState,
};

/// Validated body of `POST /api/chat`
#[derive(Debug, Clone, PartialEq)]
pub struct SendMessageRequest {
    pub message: String,
    pub conversation_history: Vec<Message>,
}

impl SendMessageRequest {
    /// `message` must be a non-empty string. `conversation_history` may be
    /// absent or null; otherwise it must be an array of `{role, content}`.
    pub fn from_value(body: Value) -> ApiResult<Self> {
        let message = match body.get("message") {
            Some(Value::String(message)) if !message.is_empty() => message.clone(),
            _ => return Err(ApiError::InvalidMessage),
        };

        let conversation_history = match body.get("conversation_history") {
            None | Some(Value::Null) => Vec::new(),
            Some(history) => serde_json::from_value(history.clone()).map_err(|e| {
                ApiError::BadRequest(format!(
                    "conversation_history must be an array of {{role, content}} messages ({})",
                    e
                ))
            })?,
        };

        Ok(Self {
            message,
            conversation_history,
        })
    }
}

/// Relay one chat turn to the completion endpoint
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<ChatReply>> {
    let Json(body) = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge
        } else {
            ApiError::BadRequest(rejection.body_text())
        }
    })?;
    let request = SendMessageRequest::from_value(body)?;

    tracing::info!(
        message_chars = request.message.chars().count(),
        history_len = request.conversation_history.len(),
        "Relaying chat message"
    );

    let reply = state
        .proxy
        .complete(&request.message, request.conversation_history)
        .await?;

    Ok(Json(reply))
}
