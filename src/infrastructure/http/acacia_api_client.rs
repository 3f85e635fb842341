use std::time::Duration;

use async_trait::async_trait;
use futures::stream::StreamExt;
use reqwest::header::{COOKIE, HeaderMap, SET_COOKIE};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;

use crate::application::ports::{
    ConversationClient, ConversationClientError, IdentityClient, IdentityClientError,
    SessionRefresh, UpstreamStream,
};
use crate::domain::{
    Conversation, ConversationWithMessages, Credentials, NewConversation, REFRESH_TOKEN_COOKIE,
    SendMessage,
};
use crate::presentation::config::BackendSettings;

/// `reqwest` adapter for the backend conversation and identity endpoints.
pub struct AcaciaApiClient {
    client: Client,
    base_url: String,
    identity_path: String,
    identity_timeout: Duration,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

impl AcaciaApiClient {
    pub fn new(
        base_url: &str,
        identity_path: &str,
        identity_timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().connect_timeout(connect_timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            identity_path: identity_path.to_string(),
            identity_timeout,
        })
    }

    pub fn from_settings(settings: &BackendSettings) -> Result<Self, reqwest::Error> {
        Self::new(
            &settings.base_url,
            &settings.identity_path,
            Duration::from_millis(settings.identity_timeout_ms),
            Duration::from_millis(settings.connect_timeout_ms),
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn with_credentials(request: RequestBuilder, credentials: &Credentials) -> RequestBuilder {
        match credentials.cookie_header() {
            Some(cookie) => request.header(COOKIE, cookie),
            None => request,
        }
    }

    async fn rejection(response: Response) -> ConversationClientError {
        let status = response.status().as_u16();
        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| "Unknown error".to_string());
        ConversationClientError::Rejected { status, message }
    }
}

fn set_cookie_values(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .map(String::from)
        .collect()
}

fn transport_error(e: reqwest::Error) -> ConversationClientError {
    ConversationClientError::Transport(e.to_string())
}

#[async_trait]
impl ConversationClient for AcaciaApiClient {
    async fn create_conversation(
        &self,
        credentials: &Credentials,
        request: &NewConversation,
    ) -> Result<Conversation, ConversationClientError> {
        let builder = self.client.post(self.url("/conversations")).json(request);
        let response = Self::with_credentials(builder, credentials)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        response
            .json::<Conversation>()
            .await
            .map_err(|e| ConversationClientError::InvalidResponse(e.to_string()))
    }

    async fn latest_conversation(
        &self,
        credentials: &Credentials,
    ) -> Result<Option<ConversationWithMessages>, ConversationClientError> {
        let builder = self.client.get(self.url("/conversations/latest"));
        let response = Self::with_credentials(builder, credentials)
            .send()
            .await
            .map_err(transport_error)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        response
            .json::<ConversationWithMessages>()
            .await
            .map(Some)
            .map_err(|e| ConversationClientError::InvalidResponse(e.to_string()))
    }

    async fn send_message(
        &self,
        credentials: &Credentials,
        message: &SendMessage,
    ) -> Result<UpstreamStream, ConversationClientError> {
        let builder = self
            .client
            .post(self.url("/conversations/messages"))
            .json(message);
        let response = Self::with_credentials(builder, credentials)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let set_cookies = set_cookie_values(response.headers());
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(transport_error));

        Ok(UpstreamStream {
            set_cookies,
            body: Box::pin(body),
        })
    }
}

#[async_trait]
impl IdentityClient for AcaciaApiClient {
    async fn refresh_session(
        &self,
        refresh_token: &str,
    ) -> Result<SessionRefresh, IdentityClientError> {
        let response = self
            .client
            .get(self.url(&self.identity_path))
            .header(COOKIE, format!("{}={}", REFRESH_TOKEN_COOKIE, refresh_token))
            .timeout(self.identity_timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    IdentityClientError::Timeout
                } else {
                    IdentityClientError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Ok(SessionRefresh::Rejected);
        }
        if !status.is_success() {
            return Err(IdentityClientError::UnexpectedStatus(status.as_u16()));
        }

        Ok(SessionRefresh::Accepted {
            set_cookies: set_cookie_values(response.headers()),
        })
    }
}
