mod helpers;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use bytes::Bytes;
use futures::stream::StreamExt;

use acacia_edge::application::services::SessionGuard;
use acacia_edge::infrastructure::http::AcaciaApiClient;
use acacia_edge::presentation::{AppState, create_router};

use helpers::{IdentityBehavior, MockIdentityClient, spawn_server, test_settings};

#[derive(Clone, Default)]
struct Upstream {
    released: Arc<AtomicBool>,
    chunks_sent: Arc<AtomicUsize>,
}

struct ReleaseOnDrop(Arc<AtomicBool>);

impl Drop for ReleaseOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Backend that streams forever until its connection goes away.
async fn endless_reply(State(upstream): State<Upstream>) -> Response {
    let released = ReleaseOnDrop(upstream.released.clone());
    let chunks_sent = upstream.chunks_sent.clone();

    let body = async_stream::stream! {
        let _released = released;
        let mut ticks = tokio::time::interval(Duration::from_millis(50));
        loop {
            ticks.tick().await;
            chunks_sent.fetch_add(1, Ordering::SeqCst);
            yield Ok::<_, std::io::Error>(Bytes::from_static(b"data: tick\n\n"));
        }
    };

    ([(CONTENT_TYPE, "text/event-stream")], Body::from_stream(body)).into_response()
}

async fn spawn_edge(upstream: Upstream) -> String {
    let backend = Router::new()
        .route("/conversations/messages", post(endless_reply))
        .with_state(upstream);
    let backend_addr = spawn_server(backend).await;

    let mut settings = test_settings();
    settings.backend.base_url = format!("http://{}", backend_addr);

    let api_client = Arc::new(AcaciaApiClient::from_settings(&settings.backend).unwrap());
    let identity = Arc::new(MockIdentityClient::new(IdentityBehavior::Reject));
    let guard = Arc::new(SessionGuard::new(identity));
    let edge_addr = spawn_server(create_router(AppState::new(api_client, guard, settings))).await;

    format!("http://{}", edge_addr)
}

#[tokio::test]
async fn given_browser_disconnects_mid_stream_when_relaying_then_backend_stream_is_released() {
    let upstream = Upstream::default();
    let edge_url = spawn_edge(upstream.clone()).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/chat/send-message", edge_url))
        .header("cookie", "access-token=a1; refresh-token=r1")
        .json(&serde_json::json!({"conversation_id": 42, "content": "hi"}))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let mut body = response.bytes_stream();
    let first = body.next().await.unwrap().unwrap();
    assert!(first.starts_with(b"data: tick"));
    assert!(!upstream.released.load(Ordering::SeqCst));

    drop(body);

    let released = tokio::time::timeout(Duration::from_secs(3), async {
        while !upstream.released.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await;
    assert!(released.is_ok(), "backend stream still open after disconnect");

    let sent_at_release = upstream.chunks_sent.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(upstream.chunks_sent.load(Ordering::SeqCst), sent_at_release);
}
