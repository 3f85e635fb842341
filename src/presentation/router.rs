use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::application::ports::ConversationClient;
use crate::infrastructure::http::{CONVERSATIONS_PATH, LATEST_CONVERSATION_PATH, SEND_MESSAGE_PATH};
use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::handlers::{
    create_conversation_handler, health_handler, latest_conversation_handler,
    send_message_handler,
};
use crate::presentation::middleware::{GuardState, session_guard_middleware};
use crate::presentation::state::AppState;

pub fn create_router<C>(state: AppState<C>) -> Router
where
    C: ConversationClient + 'static,
{
    let guard_state = GuardState {
        guard: state.session_guard.clone(),
        session: state.settings.session.clone(),
    };

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/health", get(health_handler))
        .route(SEND_MESSAGE_PATH, post(send_message_handler::<C>))
        .route(CONVERSATIONS_PATH, post(create_conversation_handler::<C>))
        .route(LATEST_CONVERSATION_PATH, get(latest_conversation_handler::<C>))
        .layer(middleware::from_fn_with_state(
            guard_state,
            session_guard_middleware,
        ))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .with_state(state)
}
