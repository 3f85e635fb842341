mod conversations;
mod error_response;
mod health;
mod send_message;

pub use conversations::{create_conversation_handler, latest_conversation_handler};
pub use error_response::{ErrorResponse, error_response};
pub use health::health_handler;
pub use send_message::{SendMessageBody, send_message_handler};
