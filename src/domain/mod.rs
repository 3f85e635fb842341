mod chat_message;
mod conversation;
mod conversation_id;
mod credentials;
mod message;
mod message_id;
mod message_role;
mod stream_frame;

pub use chat_message::{ChatMessage, MessageLog};
pub use conversation::{Conversation, ConversationWithMessages, NewConversation};
pub use conversation_id::ConversationId;
pub use credentials::{ACCESS_TOKEN_COOKIE, Credentials, REFRESH_TOKEN_COOKIE, set_cookie_name};
pub use message::{Message, SendMessage};
pub use message_id::MessageId;
pub use message_role::MessageRole;
pub use stream_frame::StreamFrame;
