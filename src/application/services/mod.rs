mod chat_session;
mod conversation_relay;
mod session_guard;

pub use chat_session::{
    ChatSession, ChatSessionError, ConversationDefaults, TurnOutcome, TurnState,
};
pub use conversation_relay::{ConversationRelay, RelayResponse, RelayStream};
pub use session_guard::{DenyReason, GuardDecision, SessionGuard};
