use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::Stream;

use crate::domain::{Conversation, ConversationWithMessages, Credentials, NewConversation, SendMessage};

pub type ByteStream =
    Pin<Box<dyn Stream<Item = Result<Bytes, ConversationClientError>> + Send + 'static>>;

/// Response of the backend message-send endpoint once it has answered with 2xx.
pub struct UpstreamStream {
    /// Raw `Set-Cookie` values to hand back to the caller unchanged.
    pub set_cookies: Vec<String>,
    pub body: ByteStream,
}

/// Backend conversation API, called with the caller's credentials.
#[async_trait]
pub trait ConversationClient: Send + Sync {
    async fn create_conversation(
        &self,
        credentials: &Credentials,
        request: &NewConversation,
    ) -> Result<Conversation, ConversationClientError>;

    /// `Ok(None)` when the user has no conversation yet.
    async fn latest_conversation(
        &self,
        credentials: &Credentials,
    ) -> Result<Option<ConversationWithMessages>, ConversationClientError>;

    async fn send_message(
        &self,
        credentials: &Credentials,
        message: &SendMessage,
    ) -> Result<UpstreamStream, ConversationClientError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ConversationClientError {
    #[error("backend returned HTTP {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("transport failed: {0}")]
    Transport(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ConversationClientError {
    /// Message suitable for an end user, without the HTTP framing.
    pub fn user_message(&self) -> String {
        match self {
            ConversationClientError::Rejected { message, .. } => message.clone(),
            ConversationClientError::Transport(message) => message.clone(),
            ConversationClientError::InvalidResponse(message) => message.clone(),
        }
    }
}
