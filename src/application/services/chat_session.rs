use std::sync::Arc;

use futures::stream::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{ChatTransport, ChatTransportError, FrameStreamError};
use crate::domain::{
    ChatMessage, ConversationId, ConversationWithMessages, MessageLog, NewConversation,
    StreamFrame,
};
use crate::infrastructure::observability::sanitize_content;

const CANCELLED_MESSAGE: &str = "Cancelled";

/// Lifecycle of one submitted message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    ResolvingConversation,
    Streaming,
    Completed,
    Errored,
}

impl TurnState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TurnState::Completed | TurnState::Errored)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Completed,
    Errored { message: String },
}

/// Submissions refused before any state change.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChatSessionError {
    #[error("message content is empty")]
    EmptyMessage,
    #[error("an assistant reply is still streaming")]
    Busy,
}

/// Values used when the first message implicitly creates a conversation.
#[derive(Debug, Clone)]
pub struct ConversationDefaults {
    pub project_id: i64,
    pub provider: String,
    pub model: String,
}

/// One conversation view: its message log and the turn currently in flight.
pub struct ChatSession<T>
where
    T: ChatTransport + ?Sized,
{
    transport: Arc<T>,
    defaults: ConversationDefaults,
    conversation_id: Option<ConversationId>,
    title: Option<String>,
    log: MessageLog,
    state: TurnState,
    last_error: Option<String>,
}

impl<T> ChatSession<T>
where
    T: ChatTransport + ?Sized,
{
    pub fn new(transport: Arc<T>, defaults: ConversationDefaults) -> Self {
        Self {
            transport,
            defaults,
            conversation_id: None,
            title: None,
            log: MessageLog::new(),
            state: TurnState::Idle,
            last_error: None,
        }
    }

    /// Seeds the view with a conversation loaded from history.
    pub fn resume(
        transport: Arc<T>,
        defaults: ConversationDefaults,
        history: Option<ConversationWithMessages>,
    ) -> Self {
        let mut session = Self::new(transport, defaults);
        if let Some(history) = history {
            session.conversation_id = Some(history.conversation.id);
            session.title = Some(history.conversation.title);
            session.log = MessageLog::from_history(&history.messages);
        }
        session
    }

    pub async fn load_latest(
        transport: Arc<T>,
        defaults: ConversationDefaults,
    ) -> Result<Self, ChatTransportError> {
        let history = transport.latest_conversation().await?;
        Ok(Self::resume(transport, defaults, history))
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn conversation_id(&self) -> Option<ConversationId> {
        self.conversation_id
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.log.messages()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Input stays disabled while this is true.
    pub fn is_streaming(&self) -> bool {
        self.log.has_open_placeholder()
    }

    /// Runs one turn to a terminal state.
    ///
    /// `on_update` sees the assistant placeholder after every appended chunk
    /// and once more when it stops streaming.
    pub async fn send<F>(
        &mut self,
        content: &str,
        cancel: &CancellationToken,
        mut on_update: F,
    ) -> Result<TurnOutcome, ChatSessionError>
    where
        F: FnMut(&ChatMessage),
    {
        if content.is_empty() {
            return Err(ChatSessionError::EmptyMessage);
        }
        if self.is_streaming() {
            return Err(ChatSessionError::Busy);
        }

        self.last_error = None;
        self.state = TurnState::ResolvingConversation;

        let conversation_id = match self.resolve_conversation(content, cancel).await {
            Ok(id) => id,
            Err(message) => {
                tracing::warn!(error = %message, "Failed to create conversation");
                self.state = TurnState::Errored;
                self.last_error = Some(message.clone());
                return Ok(TurnOutcome::Errored { message });
            }
        };

        self.log.push_user(content);
        self.log.open_placeholder();
        self.state = TurnState::Streaming;

        tracing::debug!(
            conversation_id = %conversation_id,
            content = %sanitize_content(content),
            "Streaming assistant reply"
        );

        let opened = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            opened = self.transport.open_stream(conversation_id, content) => Some(opened),
        };
        let mut frames = match opened {
            None => return Ok(self.fail(CANCELLED_MESSAGE.to_string(), &mut on_update)),
            Some(Err(e)) => return Ok(self.fail(e.to_string(), &mut on_update)),
            Some(Ok(frames)) => frames,
        };

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    drop(frames);
                    return Ok(self.fail(CANCELLED_MESSAGE.to_string(), &mut on_update));
                }
                next = frames.next() => next,
            };

            match next {
                Some(Ok(StreamFrame::Data(chunk))) => {
                    if self.log.append_to_placeholder(&chunk) {
                        if let Some(placeholder) = self.log.placeholder() {
                            on_update(placeholder);
                        }
                    }
                }
                Some(Ok(StreamFrame::Done)) => {
                    if let Some(message) = self.log.close_placeholder() {
                        on_update(message);
                    }
                    self.state = TurnState::Completed;
                    return Ok(TurnOutcome::Completed);
                }
                Some(Ok(StreamFrame::Error(message))) => {
                    return Ok(self.fail(message, &mut on_update));
                }
                Some(Err(e)) => return Ok(self.fail(e.to_string(), &mut on_update)),
                None => {
                    let message = FrameStreamError::UnexpectedEnd.to_string();
                    return Ok(self.fail(message, &mut on_update));
                }
            }
        }
    }

    /// Closes a placeholder left open by a turn whose future was dropped.
    pub fn abandon_turn(&mut self) {
        if self.log.close_placeholder().is_some() {
            self.state = TurnState::Errored;
            self.last_error = Some(CANCELLED_MESSAGE.to_string());
        }
    }

    async fn resolve_conversation(
        &mut self,
        content: &str,
        cancel: &CancellationToken,
    ) -> Result<ConversationId, String> {
        if let Some(id) = self.conversation_id {
            return Ok(id);
        }

        let request = NewConversation {
            initial_message: content.to_string(),
            model: self.defaults.model.clone(),
            provider: self.defaults.provider.clone(),
            project_id: self.defaults.project_id,
        };

        let created = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(CANCELLED_MESSAGE.to_string()),
            created = self.transport.create_conversation(&request) => created,
        };

        let conversation = created.map_err(|e| e.to_string())?;
        tracing::info!(conversation_id = %conversation.id, "Conversation created");
        self.conversation_id = Some(conversation.id);
        self.title = Some(conversation.title);
        Ok(conversation.id)
    }

    fn fail<F>(&mut self, message: String, on_update: &mut F) -> TurnOutcome
    where
        F: FnMut(&ChatMessage),
    {
        tracing::warn!(error = %message, "Assistant reply ended abnormally");
        if let Some(placeholder) = self.log.close_placeholder() {
            on_update(placeholder);
        }
        self.state = TurnState::Errored;
        self.last_error = Some(message.clone());
        TurnOutcome::Errored { message }
    }
}
