mod acacia_api_client;
mod edge_chat_client;

pub use acacia_api_client::AcaciaApiClient;
pub use edge_chat_client::{
    CONVERSATIONS_PATH, EdgeChatClient, LATEST_CONVERSATION_PATH, SEND_MESSAGE_PATH,
};
