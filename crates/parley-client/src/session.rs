use thiserror::Error;

use crate::history::HistoryBuffer;
use crate::transcript::{Transcript, TranscriptEntry};
use crate::transport::{ChatRequest, ChatResponse, ChatTransport, TransportError};

/// Where the session is in a send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendState {
    Idle,
    Sending,
    /// Last send failed; behaves like `Idle` for the next send
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Unknown,
    Online,
    Offline,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Message is empty")]
    EmptyInput,

    #[error("A message is already being sent")]
    Busy,

    #[error("No message is being sent")]
    NotSending,
}

/// State of one chat window.
///
/// Transitions are `Idle → Sending → Idle | Failed`. At most one request is
/// in flight; the history only grows when a reply arrives.
#[derive(Debug)]
pub struct ChatSession {
    history: HistoryBuffer,
    transcript: Transcript,
    state: SendState,
    status: ConnectionStatus,
    pending: Option<String>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self::with_history(HistoryBuffer::new())
    }

    pub fn with_history(history: HistoryBuffer) -> Self {
        Self {
            history,
            transcript: Transcript::new(),
            state: SendState::Idle,
            status: ConnectionStatus::Unknown,
            pending: None,
        }
    }

    pub fn state(&self) -> SendState {
        self.state
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Whether the send control should be enabled
    pub fn can_send(&self, input: &str) -> bool {
        self.state != SendState::Sending && !input.trim().is_empty()
    }

    pub fn typing_indicator_visible(&self) -> bool {
        self.state == SendState::Sending
    }

    /// Start a send: shows the message right away and returns the request
    /// carrying the history as it was before this message
    pub fn begin(&mut self, input: &str) -> Result<ChatRequest, SessionError> {
        if self.state == SendState::Sending {
            return Err(SessionError::Busy);
        }
        let message = input.trim();
        if message.is_empty() {
            return Err(SessionError::EmptyInput);
        }

        self.transcript.push(TranscriptEntry::user(message));
        self.pending = Some(message.to_string());
        self.state = SendState::Sending;

        Ok(ChatRequest {
            message: message.to_string(),
            conversation_history: self.history.messages(),
        })
    }

    /// Complete the send started by [`ChatSession::begin`]; returns the
    /// entry appended to the transcript (the reply or an error notice)
    pub fn finish(
        &mut self,
        outcome: Result<ChatResponse, TransportError>,
    ) -> Result<&TranscriptEntry, SessionError> {
        let message = self.pending.take().ok_or(SessionError::NotSending)?;

        let entry = match outcome {
            Ok(reply) => {
                self.history.record_exchange(message, reply.response.clone());
                self.state = SendState::Idle;
                TranscriptEntry::bot(reply.response)
            }
            Err(e) => {
                tracing::warn!("Chat request failed: {}", e);
                self.state = SendState::Failed;
                TranscriptEntry::error(e.to_string())
            }
        };

        Ok(self.transcript.push(entry))
    }

    /// [`begin`](Self::begin), one transport call, [`finish`](Self::finish)
    pub async fn send<T>(&mut self, transport: &T, input: &str) -> Result<&TranscriptEntry, SessionError>
    where
        T: ChatTransport + ?Sized,
    {
        let request = self.begin(input)?;
        let outcome = transport.post_chat(&request).await;
        self.finish(outcome)
    }

    pub async fn refresh_status<T>(&mut self, transport: &T) -> ConnectionStatus
    where
        T: ChatTransport + ?Sized,
    {
        self.status = match transport.health().await {
            Ok(_) => ConnectionStatus::Online,
            Err(e) => {
                tracing::warn!("Health check failed: {}", e);
                ConnectionStatus::Offline
            }
        };
        self.status
    }
}
