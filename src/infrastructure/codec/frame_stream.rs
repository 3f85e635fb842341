use std::fmt::Display;

use futures::stream::{Stream, StreamExt};

use crate::application::ports::{FrameStream, FrameStreamError};

use super::FrameDecoder;

/// Turns a raw byte stream into frames.
///
/// The sequence stops right after the first terminal frame, dropping the byte
/// stream even if the connection behind it is still open. A transport error or
/// an end of input without a terminal frame is reported as the last item.
pub fn decode_frames<S, B, E>(bytes: S) -> FrameStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut decoder = FrameDecoder::new();
        let mut bytes = Box::pin(bytes);

        while let Some(chunk) = bytes.next().await {
            match chunk {
                Ok(chunk) => {
                    for frame in decoder.feed(chunk.as_ref()) {
                        yield Ok(frame);
                    }
                    if decoder.is_finished() {
                        tracing::trace!("Terminal frame decoded, releasing stream");
                        return;
                    }
                }
                Err(e) => {
                    yield Err(FrameStreamError::Transport(e.to_string()));
                    return;
                }
            }
        }

        for frame in decoder.finish() {
            yield Ok(frame);
        }

        if !decoder.is_finished() {
            yield Err(FrameStreamError::UnexpectedEnd);
        }
    })
}
