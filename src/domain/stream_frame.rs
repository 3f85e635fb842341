use bytes::Bytes;

/// One unit of the event-stream wire format shared by every streaming hop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamFrame {
    /// A chunk of assistant text.
    Data(String),
    /// Terminal failure with a human-readable message.
    Error(String),
    /// Terminal, normal completion.
    Done,
}

impl StreamFrame {
    pub fn data(chunk: impl Into<String>) -> Self {
        StreamFrame::Data(chunk.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        StreamFrame::Error(message.into())
    }

    /// No frame may legally follow a terminal one.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamFrame::Error(_) | StreamFrame::Done)
    }

    pub fn encode(&self) -> String {
        match self {
            StreamFrame::Data(chunk) => {
                let mut encoded = String::with_capacity(chunk.len() + 8);
                for line in chunk.split('\n') {
                    encoded.push_str("data: ");
                    encoded.push_str(line);
                    encoded.push('\n');
                }
                encoded.push('\n');
                encoded
            }
            StreamFrame::Error(message) => {
                let flattened = message.replace(['\r', '\n'], " ");
                format!("event: error\ndata: {}\n\n", flattened)
            }
            StreamFrame::Done => "event: done\n\n".to_string(),
        }
    }

    pub fn to_bytes(&self) -> Bytes {
        Bytes::from(self.encode())
    }
}
