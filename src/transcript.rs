use crate::models::ChatMessage;

/// Ordered, append-only list of chat messages backing the visible transcript.
///
/// Entries are never reordered, replaced or removed.
#[derive(Debug, Default)]
pub struct TranscriptStore {
    messages: Vec<ChatMessage>,
}

impl TranscriptStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message and returns its index.
    pub fn append(&mut self, message: ChatMessage) -> usize {
        self.messages.push(message);
        self.messages.len() - 1
    }

    /// Read-only view for rendering and export.
    pub fn snapshot(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Messages appended at or after `index`.
    pub fn since(&self, index: usize) -> &[ChatMessage] {
        self.messages.get(index..).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
