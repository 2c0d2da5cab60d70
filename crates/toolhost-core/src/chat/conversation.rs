//! Append-only conversation history

use crate::types::Message;

/// Ordered message history shared across turns
///
/// Grows without bound; nothing is trimmed or summarized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Append the messages of one completed turn
    pub fn commit(&mut self, turn: Vec<Message>) {
        self.messages.extend(turn);
    }

    /// History followed by the uncommitted messages of the current turn
    pub(crate) fn with_pending(&self, pending: &[Message]) -> Vec<Message> {
        self.messages.iter().chain(pending).cloned().collect()
    }
}
