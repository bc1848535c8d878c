use parley_llm::Message;
use std::collections::VecDeque;

/// Most recent messages (not exchanges) kept for context
pub const HISTORY_LIMIT: usize = 20;

/// Rolling conversation history, oldest first.
///
/// Only completed exchanges are recorded, so the buffer always holds
/// user/assistant pairs.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    messages: VecDeque<Message>,
    limit: usize,
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryBuffer {
    pub fn new() -> Self {
        Self::with_limit(HISTORY_LIMIT)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            messages: VecDeque::with_capacity(limit + 2),
            limit,
        }
    }

    /// Append a user message and its reply, dropping the oldest entries
    /// beyond the limit
    pub fn record_exchange(&mut self, user: impl Into<String>, assistant: impl Into<String>) {
        self.messages.push_back(Message::user(user));
        self.messages.push_back(Message::assistant(assistant));

        while self.messages.len() > self.limit {
            self.messages.pop_front();
        }
    }

    /// Snapshot sent as `conversation_history` with the next request
    pub fn messages(&self) -> Vec<Message> {
        self.messages.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
