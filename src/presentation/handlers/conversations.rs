use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::application::ports::ConversationClient;
use crate::domain::{Credentials, NewConversation};
use crate::presentation::state::AppState;

use super::error_response::{error_response, upstream_error_response};

#[tracing::instrument(skip_all)]
pub async fn create_conversation_handler<C>(
    State(state): State<AppState<C>>,
    credentials: Credentials,
    payload: Result<Json<NewConversation>, JsonRejection>,
) -> Response
where
    C: ConversationClient + 'static,
{
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    match state
        .conversation_client
        .create_conversation(&credentials, &request)
        .await
    {
        Ok(conversation) => {
            tracing::info!(
                conversation_id = %conversation.id,
                project_id = request.project_id,
                "Conversation created"
            );
            (StatusCode::CREATED, Json(conversation)).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to create conversation");
            upstream_error_response("create conversation", &e)
        }
    }
}

#[tracing::instrument(skip_all)]
pub async fn latest_conversation_handler<C>(
    State(state): State<AppState<C>>,
    credentials: Credentials,
) -> Response
where
    C: ConversationClient + 'static,
{
    match state
        .conversation_client
        .latest_conversation(&credentials)
        .await
    {
        Ok(Some(conversation)) => (StatusCode::OK, Json(conversation)).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "No conversations found"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to get latest conversation");
            upstream_error_response("get latest conversation", &e)
        }
    }
}
