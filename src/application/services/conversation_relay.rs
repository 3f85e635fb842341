use std::convert::Infallible;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};

use crate::application::ports::{ByteStream, ConversationClient};
use crate::domain::{ConversationId, Credentials, SendMessage, StreamFrame};

pub type RelayStream = Pin<Box<dyn Stream<Item = Result<Bytes, Infallible>> + Send + 'static>>;

/// Event-stream body handed to the browser, plus cookies the backend rotated.
pub struct RelayResponse {
    pub set_cookies: Vec<String>,
    pub body: RelayStream,
}

/// Bridges one browser submission to one streaming backend call.
///
/// Chunks are forwarded as they arrive without being inspected. The relay
/// always produces a well-formed event stream: failures are turned into a
/// single `error` frame instead of an HTTP error.
pub struct ConversationRelay<C>
where
    C: ConversationClient + ?Sized,
{
    client: Arc<C>,
}

impl<C> ConversationRelay<C>
where
    C: ConversationClient + ?Sized,
{
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    pub async fn open(&self, credentials: &Credentials, message: &SendMessage) -> RelayResponse {
        match self.client.send_message(credentials, message).await {
            Ok(upstream) => {
                tracing::debug!(
                    conversation_id = %message.conversation_id,
                    "Backend stream opened"
                );
                RelayResponse {
                    set_cookies: upstream.set_cookies,
                    body: pass_through(message.conversation_id, upstream.body),
                }
            }
            Err(e) => {
                tracing::error!(
                    conversation_id = %message.conversation_id,
                    error = %e,
                    "Failed to open backend stream"
                );
                let frame = StreamFrame::error(format!(
                    "Failed to send message. {}",
                    e.user_message()
                ));
                RelayResponse {
                    set_cookies: Vec::new(),
                    body: single_frame(frame),
                }
            }
        }
    }
}

fn single_frame(frame: StreamFrame) -> RelayStream {
    Box::pin(stream::once(async move {
        Ok::<_, Infallible>(frame.to_bytes())
    }))
}

fn pass_through(conversation_id: ConversationId, mut body: ByteStream) -> RelayStream {
    Box::pin(async_stream::stream! {
        let mut watch = DisconnectWatch::new(conversation_id);
        let mut tail = [0u8; 2];

        while let Some(chunk) = body.next().await {
            match chunk {
                Ok(bytes) => {
                    watch.forwarded += bytes.len();
                    remember_tail(&mut tail, &bytes);
                    yield Ok::<_, Infallible>(bytes);
                }
                Err(e) => {
                    tracing::error!(
                        conversation_id = %conversation_id,
                        error = %e,
                        "Backend stream broke mid-response"
                    );
                    // A half-written frame would swallow the error event.
                    if watch.forwarded > 0 && tail != *FRAME_GROUP_END {
                        yield Ok(Bytes::from_static(FRAME_GROUP_END));
                    }
                    let frame = StreamFrame::error(format!("Stream interrupted. {}", e.user_message()));
                    yield Ok(frame.to_bytes());
                    break;
                }
            }
        }

        watch.finish();
    })
}

const FRAME_GROUP_END: &[u8; 2] = b"\n\n";

fn remember_tail(tail: &mut [u8; 2], bytes: &[u8]) {
    match bytes {
        [] => {}
        [only] => *tail = [tail[1], *only],
        [.., a, b] => *tail = [*a, *b],
    }
}

/// Logs when the browser side goes away before the backend stream ended.
///
/// Dropping the relay stream drops the backend body with it, which aborts the
/// outbound request.
struct DisconnectWatch {
    conversation_id: ConversationId,
    forwarded: usize,
    finished: bool,
}

impl DisconnectWatch {
    fn new(conversation_id: ConversationId) -> Self {
        Self {
            conversation_id,
            forwarded: 0,
            finished: false,
        }
    }

    fn finish(&mut self) {
        self.finished = true;
        tracing::debug!(
            conversation_id = %self.conversation_id,
            bytes = self.forwarded,
            "Relay stream completed"
        );
    }
}

impl Drop for DisconnectWatch {
    fn drop(&mut self) {
        if !self.finished {
            tracing::info!(
                conversation_id = %self.conversation_id,
                bytes = self.forwarded,
                "Client disconnected, aborting backend stream"
            );
        }
    }
}
