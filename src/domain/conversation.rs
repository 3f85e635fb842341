use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ConversationId, Message};

/// Conversation record as owned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub user_id: i64,
    pub title: String,
    pub provider: String,
    pub model: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationWithMessages {
    pub conversation: Conversation,
    pub messages: Vec<Message>,
}

/// Payload for the non-streaming create call that precedes a first message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewConversation {
    pub initial_message: String,
    pub model: String,
    pub provider: String,
    pub project_id: i64,
}
