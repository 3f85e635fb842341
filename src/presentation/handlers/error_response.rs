use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::application::ports::ConversationClientError;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            message: message.into(),
        }),
    )
        .into_response()
}

/// Backend rejections keep their status; anything else is a bad gateway.
pub fn upstream_error_response(action: &str, error: &ConversationClientError) -> Response {
    match error {
        ConversationClientError::Rejected { status, message } => {
            let status = StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY);
            error_response(status, format!("Failed to {}. {}", action, message))
        }
        other => error_response(
            StatusCode::BAD_GATEWAY,
            format!("Failed to {}. {}", action, other.user_message()),
        ),
    }
}
