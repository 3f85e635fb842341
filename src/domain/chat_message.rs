use chrono::{DateTime, Utc};

use super::{Message, MessageId, MessageRole};

/// Entry of the client-side message log.
///
/// `streaming` only exists in memory: it is true for the single assistant
/// placeholder whose content is still arriving.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: Option<MessageId>,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub streaming: bool,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: None,
            role: MessageRole::User,
            content: content.into(),
            timestamp: Utc::now(),
            streaming: false,
        }
    }

    pub fn assistant_placeholder() -> Self {
        Self {
            id: None,
            role: MessageRole::Assistant,
            content: String::new(),
            timestamp: Utc::now(),
            streaming: true,
        }
    }
}

impl From<&Message> for ChatMessage {
    fn from(message: &Message) -> Self {
        Self {
            id: Some(message.id),
            role: message.role,
            content: message.content.clone(),
            timestamp: message.created_at,
            streaming: false,
        }
    }
}

/// Ordered, append-only log; only the open placeholder is mutated in place.
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    messages: Vec<ChatMessage>,
    open_placeholder: Option<usize>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_history(messages: &[Message]) -> Self {
        Self {
            messages: messages.iter().map(ChatMessage::from).collect(),
            open_placeholder: None,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn has_open_placeholder(&self) -> bool {
        self.open_placeholder.is_some()
    }

    pub fn placeholder(&self) -> Option<&ChatMessage> {
        self.open_placeholder.map(|index| &self.messages[index])
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::user(content));
    }

    /// Appends an empty streaming assistant message. Returns false if one is already open.
    pub fn open_placeholder(&mut self) -> bool {
        if self.open_placeholder.is_some() {
            return false;
        }
        self.messages.push(ChatMessage::assistant_placeholder());
        self.open_placeholder = Some(self.messages.len() - 1);
        true
    }

    /// Appends text to the open placeholder. Returns false once it has been closed.
    pub fn append_to_placeholder(&mut self, chunk: &str) -> bool {
        match self.open_placeholder {
            Some(index) => {
                self.messages[index].content.push_str(chunk);
                true
            }
            None => false,
        }
    }

    /// Marks the placeholder as no longer streaming, keeping whatever content arrived.
    pub fn close_placeholder(&mut self) -> Option<&ChatMessage> {
        let index = self.open_placeholder.take()?;
        let message = &mut self.messages[index];
        message.streaming = false;
        Some(message)
    }
}
