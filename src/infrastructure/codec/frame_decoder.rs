use crate::domain::StreamFrame;

const UNKNOWN_STREAM_ERROR: &str = "Unknown streaming error";

/// Incremental decoder for the event-stream frame format.
///
/// Bytes may be fed in arbitrary pieces: only complete lines are decoded, so a
/// frame or a multi-byte character split across reads is reassembled before it
/// is interpreted. Once a terminal frame has been produced the decoder ignores
/// all further input.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
    pending_event: Option<String>,
    in_data: bool,
    finished: bool,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once `done` or `error` has been decoded.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn feed(&mut self, bytes: &[u8]) -> Vec<StreamFrame> {
        let mut frames = Vec::new();
        if self.finished {
            return frames;
        }

        self.buffer.extend_from_slice(bytes);

        let mut consumed = 0;
        while let Some(offset) = self.buffer[consumed..].iter().position(|b| *b == b'\n') {
            let end = consumed + offset;
            let line = String::from_utf8_lossy(&self.buffer[consumed..end]).into_owned();
            consumed = end + 1;

            if self.push_line(&line, &mut frames) {
                self.buffer.clear();
                return frames;
            }
        }

        self.buffer.drain(..consumed);
        frames
    }

    /// Decodes a trailing line left without its newline when the input ends.
    pub fn finish(&mut self) -> Vec<StreamFrame> {
        let mut frames = Vec::new();
        if self.finished || self.buffer.is_empty() {
            return frames;
        }

        let line = String::from_utf8_lossy(&self.buffer).into_owned();
        self.buffer.clear();
        self.push_line(&line, &mut frames);
        frames
    }

    /// Returns true when the line produced a terminal frame.
    fn push_line(&mut self, line: &str, frames: &mut Vec<StreamFrame>) -> bool {
        let line = line.strip_suffix('\r').unwrap_or(line);
        match self.decode_line(line) {
            Some(frame) => {
                let terminal = frame.is_terminal();
                frames.push(frame);
                if terminal {
                    self.finished = true;
                }
                terminal
            }
            None => false,
        }
    }

    fn decode_line(&mut self, line: &str) -> Option<StreamFrame> {
        if line.is_empty() {
            self.pending_event = None;
            self.in_data = false;
            return None;
        }

        // Comment lines, used for keep-alives.
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = line.split_once(':')?;
        let value = value.strip_prefix(' ').unwrap_or(value);

        match field {
            "event" => {
                let event = value.trim();
                if event == "done" {
                    return Some(StreamFrame::Done);
                }
                self.pending_event = Some(event.to_string());
                None
            }
            "data" => self.decode_data(value),
            _ => None,
        }
    }

    fn decode_data(&mut self, value: &str) -> Option<StreamFrame> {
        match self.pending_event.as_deref() {
            None | Some("") | Some("message") => {
                if self.in_data {
                    return Some(StreamFrame::Data(format!("\n{}", value)));
                }
                self.in_data = true;
                if value.is_empty() {
                    None
                } else {
                    Some(StreamFrame::Data(value.to_string()))
                }
            }
            Some("error") => {
                let message = if value.is_empty() {
                    UNKNOWN_STREAM_ERROR
                } else {
                    value
                };
                Some(StreamFrame::Error(message.to_string()))
            }
            Some(_) => None,
        }
    }
}
