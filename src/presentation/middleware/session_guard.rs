use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::HeaderValue;
use axum::http::header::SET_COOKIE;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

use crate::application::services::{GuardDecision, SessionGuard};
use crate::domain::set_cookie_name;
use crate::presentation::config::SessionSettings;

use super::credentials_from_headers;

#[derive(Clone)]
pub struct GuardState {
    pub guard: Arc<SessionGuard>,
    pub session: SessionSettings,
}

/// Gates protected paths; everything else passes straight through.
pub async fn session_guard_middleware(
    State(state): State<GuardState>,
    mut request: Request,
    next: Next,
) -> Response {
    if !state.session.is_protected(request.uri().path()) {
        return next.run(request).await;
    }

    let credentials = credentials_from_headers(request.headers());

    match state.guard.evaluate(&credentials).await {
        GuardDecision::Forward => next.run(request).await,
        GuardDecision::ForwardWithRotatedCredentials { set_cookies } => {
            let rotated = credentials.rotated(set_cookies.iter().map(String::as_str));
            request.extensions_mut().insert(rotated);

            let mut response = next.run(request).await;
            for set_cookie in &set_cookies {
                match HeaderValue::from_str(set_cookie) {
                    Ok(value) => {
                        response.headers_mut().append(SET_COOKIE, value);
                    }
                    Err(_) => {
                        tracing::warn!(
                            cookie = set_cookie_name(set_cookie),
                            "Dropping Set-Cookie value that is not a valid header"
                        );
                    }
                }
            }
            response
        }
        GuardDecision::Deny { reason } => {
            tracing::info!(
                reason = reason.as_str(),
                login_path = %state.session.login_path,
                "Session guard redirecting to login"
            );
            Redirect::temporary(&state.session.login_path).into_response()
        }
    }
}
