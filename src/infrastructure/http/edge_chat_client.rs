use async_trait::async_trait;
use reqwest::header::{ACCEPT, COOKIE, LOCATION};
use reqwest::{Client, RequestBuilder, Response, StatusCode, redirect};
use serde::Deserialize;

use crate::application::ports::{ChatTransport, ChatTransportError, FrameStream};
use crate::domain::{
    Conversation, ConversationId, ConversationWithMessages, Credentials, NewConversation,
    SendMessage,
};
use crate::infrastructure::codec::decode_frames;

pub const SEND_MESSAGE_PATH: &str = "/api/chat/send-message";
pub const CONVERSATIONS_PATH: &str = "/api/chat/conversations";
pub const LATEST_CONVERSATION_PATH: &str = "/api/chat/conversations/latest";

/// Chat client talking to the edge the way a browser view does.
///
/// Redirects are not followed: a redirect from the session guard means the
/// session is gone and is reported as such.
pub struct EdgeChatClient {
    client: Client,
    base_url: String,
    credentials: Credentials,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

impl EdgeChatClient {
    pub fn new(base_url: &str, credentials: Credentials) -> Result<Self, reqwest::Error> {
        let client = Client::builder().redirect(redirect::Policy::none()).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.credentials.cookie_header() {
            Some(cookie) => request.header(COOKIE, cookie),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ChatTransportError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| ChatTransportError::RequestFailed(e.to_string()))?;

        if response.status().is_redirection() {
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("/login")
                .to_string();
            return Err(ChatTransportError::Unauthenticated(location));
        }

        Ok(response)
    }
}

async fn rejection(action: &str, response: Response) -> ChatTransportError {
    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.message)
        .unwrap_or_else(|| "Unknown error".to_string());
    ChatTransportError::Rejected(format!("Failed to {}. {}", action, message))
}

#[async_trait]
impl ChatTransport for EdgeChatClient {
    async fn create_conversation(
        &self,
        request: &NewConversation,
    ) -> Result<Conversation, ChatTransportError> {
        let response = self
            .send(self.client.post(self.url(CONVERSATIONS_PATH)).json(request))
            .await?;

        if !response.status().is_success() {
            return Err(rejection("create conversation", response).await);
        }

        response
            .json::<Conversation>()
            .await
            .map_err(|e| ChatTransportError::InvalidResponse(e.to_string()))
    }

    async fn latest_conversation(
        &self,
    ) -> Result<Option<ConversationWithMessages>, ChatTransportError> {
        let response = self
            .send(self.client.get(self.url(LATEST_CONVERSATION_PATH)))
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(rejection("get latest conversation", response).await);
        }

        response
            .json::<ConversationWithMessages>()
            .await
            .map(Some)
            .map_err(|e| ChatTransportError::InvalidResponse(e.to_string()))
    }

    async fn open_stream(
        &self,
        conversation_id: ConversationId,
        content: &str,
    ) -> Result<FrameStream, ChatTransportError> {
        let payload = SendMessage::new(conversation_id, content);
        let request = self
            .client
            .post(self.url(SEND_MESSAGE_PATH))
            .header(ACCEPT, "text/event-stream")
            .json(&payload);
        let response = self.send(request).await?;

        if !response.status().is_success() {
            return Err(rejection("send message", response).await);
        }

        Ok(decode_frames(response.bytes_stream()))
    }
}
