use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::header::{CACHE_CONTROL, CONNECTION, CONTENT_TYPE, SET_COOKIE};
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::Response;
use serde::Deserialize;

use crate::application::ports::ConversationClient;
use crate::domain::{ConversationId, Credentials, SendMessage};
use crate::infrastructure::observability::sanitize_content;
use crate::presentation::state::AppState;

use super::error_response::error_response;

const MISSING_FIELDS_MESSAGE: &str = "Missing conversation_id or content";

#[derive(Debug, Deserialize)]
pub struct SendMessageBody {
    #[serde(default)]
    pub conversation_id: Option<i64>,
    #[serde(default)]
    pub content: Option<String>,
}

impl SendMessageBody {
    fn validate(self) -> Option<SendMessage> {
        let conversation_id = self.conversation_id.filter(|id| *id != 0)?;
        let content = self.content.filter(|c| !c.is_empty())?;
        Some(SendMessage::new(ConversationId::new(conversation_id), content))
    }
}

/// Relays one chat submission as an event stream.
///
/// After validation the response is always `200 text/event-stream`; backend
/// failures arrive as an `error` frame inside the stream.
#[tracing::instrument(skip_all)]
pub async fn send_message_handler<C>(
    State(state): State<AppState<C>>,
    credentials: Credentials,
    payload: Result<Json<SendMessageBody>, JsonRejection>,
) -> Response
where
    C: ConversationClient + 'static,
{
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            tracing::warn!(error = %rejection.body_text(), "Rejected send-message body");
            return error_response(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };

    let Some(message) = body.validate() else {
        tracing::warn!("Send-message request without conversation_id or content");
        return error_response(StatusCode::BAD_REQUEST, MISSING_FIELDS_MESSAGE);
    };

    tracing::debug!(
        conversation_id = %message.conversation_id,
        content = %sanitize_content(&message.content),
        "Relaying chat message"
    );

    let relay = state.relay.open(&credentials, &message).await;

    let mut response = Response::new(Body::from_stream(relay.body));
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/event-stream"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(
        HeaderName::from_static("x-accel-buffering"),
        HeaderValue::from_static("no"),
    );
    for set_cookie in &relay.set_cookies {
        if let Ok(value) = HeaderValue::from_str(set_cookie) {
            headers.append(SET_COOKIE, value);
        }
    }

    response
}
