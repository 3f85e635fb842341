use std::pin::Pin;

use async_trait::async_trait;
use futures::stream::Stream;

use crate::domain::{
    Conversation, ConversationId, ConversationWithMessages, NewConversation, StreamFrame,
};

/// Lazy, finite, non-restartable sequence of decoded frames.
///
/// Dropping it releases the underlying connection.
pub type FrameStream =
    Pin<Box<dyn Stream<Item = Result<StreamFrame, FrameStreamError>> + Send + 'static>>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameStreamError {
    #[error("stream transport failed: {0}")]
    Transport(String),
    #[error("stream ended without a done frame")]
    UnexpectedEnd,
}

/// Client-side view of the edge: what a chat view needs to run a turn.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn create_conversation(
        &self,
        request: &NewConversation,
    ) -> Result<Conversation, ChatTransportError>;

    async fn latest_conversation(&self)
    -> Result<Option<ConversationWithMessages>, ChatTransportError>;

    async fn open_stream(
        &self,
        conversation_id: ConversationId,
        content: &str,
    ) -> Result<FrameStream, ChatTransportError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ChatTransportError {
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("{0}")]
    Rejected(String),
    #[error("redirected to {0}, session expired")]
    Unauthenticated(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
