mod chat_transport;
mod conversation_client;
mod identity_client;

pub use chat_transport::{ChatTransport, ChatTransportError, FrameStream, FrameStreamError};
pub use conversation_client::{
    ByteStream, ConversationClient, ConversationClientError, UpstreamStream,
};
pub use identity_client::{IdentityClient, IdentityClientError, SessionRefresh};
